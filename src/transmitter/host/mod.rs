//! # Host Capabilities
//!
//! Transmitters never touch a real page. Everything they need from the host
//! environment is injected through the traits in this module:
//!
//! - [`Location`]: the navigable address (href), a guard that can veto pending
//!   navigations, and a notification once a navigation committed.
//! - [`Document`] / [`Element`]: resolving a host element by selector, reading
//!   and writing one attribute, and observing mutations of that attribute.
//!
//! [`memory`] provides in-process implementations used by the tests and by
//! hosts that want a headless transmitter.

use crate::error::Result;
use std::rc::Rc;

pub mod memory;

pub use memory::{MemoryDocument, MemoryElement, MemoryLocation};

/// Answer of a navigation guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    /// Cancel the pending navigation; the current location stays in place.
    Veto,
}

/// Consulted before a navigation commits, with the target href.
pub type NavigationGuard = Box<dyn Fn(&str) -> Verdict>;

/// Notified after something changed. Carries no payload; listeners re-read
/// the source.
pub type Listener = Box<dyn Fn()>;

pub trait Location {
    /// The full current address, e.g. `https://host/page?a=1#b=2`.
    fn href(&self) -> String;

    fn on_navigate(&self, guard: NavigationGuard);

    fn on_changed(&self, listener: Listener);
}

pub trait Element {
    fn attribute(&self, name: &str) -> Option<String>;

    fn set_attribute(&self, name: &str, value: &str) -> Result<()>;

    /// Observe mutations of the attribute called `name` only.
    fn observe(&self, name: &str, observer: Listener);
}

pub trait Document {
    fn query_selector(&self, selector: &str) -> Option<Rc<dyn Element>>;
}
