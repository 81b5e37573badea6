//! # Settings
//!
//! Transmitter behaviour that hosts may want to tune is managed by
//! [`confique`], which handles layered loading from TOML files and
//! environment variables.
//!
//! ## Resolution Order
//!
//! 1. **Environment variables**: `TRANSMITTER_LOCK_KEY`, `TRANSMITTER_LIVE_ADDRESS_EDITS`.
//! 2. **Settings file**: the TOML file passed to [`Settings::load`], if any.
//! 3. **Compiled defaults**: via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `lock_key` | `state` | Fragment key that carries a locked snapshot token |
//! | `live_address_edits` | `true` | Apply external fragment edits while unlocked |
//! | `sequence_equality` | `multiset` | List comparison used when diffing against defaults |

use crate::error::Result;
use crate::model::SequenceEquality;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for a transmitter, typically stored in `transmitter.toml`.
#[derive(confique::Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Fragment key whose value locks an address transmitter (`#state=<token>`).
    #[config(default = "state", env = "TRANSMITTER_LOCK_KEY")]
    pub lock_key: String,

    /// Whether fragment edits made by other code reach the widgets while unlocked.
    #[config(default = true, env = "TRANSMITTER_LIVE_ADDRESS_EDITS")]
    pub live_address_edits: bool,

    /// List comparison used by `serialize`. When absent, defaults to `multiset`.
    pub sequence_equality: Option<SequenceEquality>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lock_key: "state".to_string(),
            live_address_edits: true,
            sequence_equality: None,
        }
    }
}

impl Settings {
    /// Load settings from the environment, then `file` (if given), then defaults.
    ///
    /// A missing file is not an error; its layer is simply skipped.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = <Settings as confique::Config>::builder().env();
        if let Some(path) = file {
            builder = builder.file(path);
        }
        Ok(builder.load()?)
    }

    /// Get the list comparison rule, using the default if not configured.
    pub fn sequence_equality(&self) -> SequenceEquality {
        self.sequence_equality.unwrap_or_default()
    }
}
