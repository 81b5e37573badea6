//! Address-state backend: configuration read from a page's query and fragment.
//!
//! ```text
//! https://host/page?units=kg#year=2021&tags[]=a
//!                   └─ query ┘└──── fragment ────┘
//! ```
//!
//! Query parameters are decoded first and fragment parameters layered on top,
//! so the fragment wins on a shared key.
//!
//! ## Locked snapshots
//!
//! A fragment parameter `state=<token>` (the key is configurable, see
//! [`Settings::lock_key`]) marks a shared, bookmarked snapshot. The token runs
//! until the next `&`, `#` or `+`. When the initial address carries one:
//!
//! - the token is stored under the lock key and the transmitter is locked for
//!   its lifetime,
//! - updates are ignored and `serialize` yields exactly `state=<token>`,
//! - every pending navigation whose target drops the token is vetoed.
//!
//! Without a token, committed address changes that carry no lock marker are
//! re-read from the location and merged into the configuration.

use super::{Backend, External, ExternalSink};
use crate::broadcast::Transmitter;
use crate::codec::{Codec, FormCodec};
use crate::host::{Location, Verdict};
use crate::model::{Config, Value};
use crate::settings::Settings;
use log::{debug, trace, warn};
use std::fmt;
use std::rc::Rc;
use url::Url;

/// Lock carried by an address: `key=token`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lock {
    key: String,
    token: String,
}

impl Lock {
    pub fn new(key: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            token: token.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Whether navigating to `href` keeps this exact lock in place.
    pub fn is_carried_by(&self, href: &str) -> bool {
        let address = Address::parse(href);
        split_lock(&address.fragment, &self.key).0.as_deref() == Some(self.token.as_str())
    }
}

impl fmt::Display for Lock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.token)
    }
}

/// Query and fragment of an href, without their `?`/`#` prefixes.
#[derive(Debug, Default, PartialEq, Eq)]
struct Address {
    query: String,
    fragment: String,
}

impl Address {
    /// Unparseable hrefs are treated as carrying no configuration.
    fn parse(href: &str) -> Self {
        match Url::parse(href) {
            Ok(url) => Self {
                query: url.query().unwrap_or_default().to_string(),
                fragment: url.fragment().unwrap_or_default().to_string(),
            },
            Err(err) => {
                warn!("cannot read configuration from {href:?}: {err}");
                Self::default()
            }
        }
    }

    /// Query config overlaid by fragment config, with the lock segment removed.
    fn decode(&self, lock_key: &str, codec: &dyn Codec) -> (Config, Option<String>) {
        let (token, fragment) = split_lock(&self.fragment, lock_key);
        let config = codec
            .decode(&self.query)
            .merged_with(&codec.decode(&fragment));
        (config, token)
    }
}

/// Byte offset of the first `key=` that starts a fragment parameter.
fn find_marker(fragment: &str, key: &str) -> Option<usize> {
    let marker = format!("{key}=");
    fragment
        .match_indices(&marker)
        .map(|(pos, _)| pos)
        .find(|&pos| pos == 0 || fragment[..pos].ends_with('&'))
}

/// Split `fragment` into the lock token (if any) and the remaining text.
fn split_lock(fragment: &str, key: &str) -> (Option<String>, String) {
    let Some(pos) = find_marker(fragment, key) else {
        return (None, fragment.to_string());
    };

    let start = pos + key.len() + 1;
    let end = fragment[start..]
        .find(&['&', '#', '+'][..])
        .map_or(fragment.len(), |offset| start + offset);
    let token = &fragment[start..end];
    if token.is_empty() {
        return (None, fragment.to_string());
    }

    let tail = &fragment[end..];
    let rest = format!("{}{}", &fragment[..pos], tail.strip_prefix('+').unwrap_or(tail));
    (Some(token.to_string()), rest)
}

/// Backend reading a navigable [`Location`].
pub struct AddressBackend {
    location: Rc<dyn Location>,
    lock_key: String,
    live_edits: bool,
    lock: Option<Lock>,
}

impl AddressBackend {
    /// Reads the location once to decide whether it is locked.
    pub fn new(location: Rc<dyn Location>, settings: &Settings) -> Self {
        let address = Address::parse(&location.href());
        let lock = split_lock(&address.fragment, &settings.lock_key)
            .0
            .map(|token| Lock::new(settings.lock_key.as_str(), token));

        if let Some(lock) = &lock {
            debug!("address carries {lock}; configuration is locked");
        }

        Self {
            location,
            lock_key: settings.lock_key.clone(),
            live_edits: settings.live_address_edits,
            lock,
        }
    }

    pub fn location(&self) -> &Rc<dyn Location> {
        &self.location
    }
}

impl Backend for AddressBackend {
    fn load(&self, codec: &dyn Codec) -> Config {
        let (mut config, token) = Address::parse(&self.location.href()).decode(&self.lock_key, codec);
        if let Some(token) = token {
            config.insert(self.lock_key.as_str(), Value::Text(token));
        }
        config
    }

    fn lock(&self) -> Option<&Lock> {
        self.lock.as_ref()
    }

    fn watch(&self, codec: Rc<dyn Codec>, sink: ExternalSink) {
        if let Some(lock) = &self.lock {
            let lock = lock.clone();
            self.location.on_navigate(Box::new(move |target: &str| {
                if lock.is_carried_by(target) {
                    Verdict::Allow
                } else {
                    warn!("vetoing navigation to {target}: it would drop {lock}");
                    Verdict::Veto
                }
            }));
            return;
        }

        if !self.live_edits {
            debug!("live address edits disabled");
            return;
        }

        let location = Rc::downgrade(&self.location);
        let lock_key = self.lock_key.clone();
        self.location.on_changed(Box::new(move || {
            let Some(location) = location.upgrade() else {
                return;
            };
            let address = Address::parse(&location.href());
            if find_marker(&address.fragment, &lock_key).is_some() {
                debug!("address now carries a {lock_key} marker; ignored until reload");
                return;
            }
            let (config, _) = address.decode(&lock_key, codec.as_ref());
            trace!("address edited externally: {config:?}");
            sink(External::Edited(config));
        }));
    }
}

impl Transmitter<AddressBackend> {
    pub fn address(location: Rc<dyn Location>) -> Self {
        Self::address_with_settings(location, Settings::default())
    }

    pub fn address_with_settings(location: Rc<dyn Location>, settings: Settings) -> Self {
        let backend = AddressBackend::new(location, &settings);
        Transmitter::with_codec(backend, Rc::new(FormCodec), settings)
    }
}
