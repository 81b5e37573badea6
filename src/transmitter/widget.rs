//! The minimal widget capability and the ordered registry of joined widgets.

use crate::model::Config;
use std::fmt;
use std::rc::Rc;

/// Callback a widget invokes when it wants to push a change upstream.
pub type ChangeCallback = Box<dyn Fn(Config)>;

/// Anything that can receive configuration snapshots and emit changes.
///
/// Both methods take `&self`; widgets are expected to use interior
/// mutability since everything runs on one thread.
///
/// A widget receives its own changes back in the next fan-out and must treat
/// that as idempotent. Emitting a change from `update` that is identical to
/// the snapshot just received never converges.
pub trait Widget {
    /// Receive the full merged configuration.
    fn update(&self, config: &Config);

    /// Register the callback to invoke for upstream changes.
    fn on_changed(&self, callback: ChangeCallback);
}

/// Handle returned by `join`, used to leave the registry later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(u64);

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "widget-{}", self.0)
    }
}

/// Joined widgets in join order. Duplicates are allowed.
#[derive(Default)]
pub struct Registry {
    entries: Vec<(WidgetId, Rc<dyn Widget>)>,
    next_id: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, widget: Rc<dyn Widget>) -> WidgetId {
        let id = WidgetId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, widget));
        id
    }

    /// Returns false if `id` was not (or no longer) registered.
    pub fn remove(&mut self, id: WidgetId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.entries.iter().any(|(entry, _)| *entry == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Widgets in fan-out order, detached from the registry so that callers
    /// can deliver without holding a borrow.
    pub fn snapshot(&self) -> Vec<Rc<dyn Widget>> {
        self.entries
            .iter()
            .map(|(_, widget)| Rc::clone(widget))
            .collect()
    }
}
