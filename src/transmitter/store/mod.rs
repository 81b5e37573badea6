//! # Persistence Layer
//!
//! This module defines the persistence capability a [`Transmitter`] is
//! parameterized over. The broadcaster algorithm (merging, fan-out,
//! default-diffing) lives in one place; a [`Backend`] only answers the
//! questions that differ between backing stores:
//!
//! - what explicit config to start from ([`Backend::load`]),
//! - whether the store froze the configuration ([`Backend::lock`]),
//! - whether updates are written to the store and come back through its
//!   notifications ([`Backend::writes_through`], [`Backend::persist`]),
//! - how out-of-band edits of the store reach the transmitter
//!   ([`Backend::watch`]).
//!
//! ## Implementations
//!
//! - [`memory::MemoryBackend`]: no store at all.
//! - [`address::AddressBackend`]: query + fragment of a navigable
//!   [`Location`](crate::host::Location), with the locked snapshot mode.
//! - [`attribute::AttributeBackend`]: one attribute of one host
//!   [`Element`](crate::host::Element), written only when its text changes.
//!
//! [`Transmitter`]: crate::broadcast::Transmitter

use crate::codec::Codec;
use crate::error::Result;
use crate::model::Config;
use std::rc::Rc;

pub mod address;
pub mod attribute;
pub mod memory;

pub use address::{AddressBackend, Lock};
pub use attribute::AttributeBackend;
pub use memory::{MemoryBackend, MemoryTransmitter};

/// A change that originated in the backing store rather than in a widget.
#[derive(Debug, Clone, PartialEq)]
pub enum External {
    /// The store now holds exactly this config; it replaces the explicit
    /// config and the merged snapshot is fanned out.
    Replaced(Config),
    /// The store was edited; the payload goes through the regular update
    /// path (merge, then fan-out).
    Edited(Config),
}

/// Where a backend delivers [`External`] changes.
pub type ExternalSink = Rc<dyn Fn(External)>;

/// Abstract interface for the store behind a transmitter.
///
/// Every method has a default matching "no store", which is exactly what the
/// memory backend needs.
pub trait Backend: 'static {
    /// Explicit config to seed the transmitter with, read once at construction.
    fn load(&self, _codec: &dyn Codec) -> Config {
        Config::new()
    }

    /// The lock this store carries, if any. A locked transmitter ignores
    /// updates for its whole lifetime.
    fn lock(&self) -> Option<&Lock> {
        None
    }

    /// Whether updates are written to the store and the store's own change
    /// notification drives the fan-out.
    fn writes_through(&self) -> bool {
        false
    }

    /// Write `explicit` to the store unless the stored text already matches.
    /// Returns whether a write happened.
    fn persist(&self, _explicit: &Config, _codec: &dyn Codec) -> Result<bool> {
        Ok(false)
    }

    /// Subscribe to the store's change notifications. Called once, right
    /// after construction.
    fn watch(&self, _codec: Rc<dyn Codec>, _sink: ExternalSink) {}
}
