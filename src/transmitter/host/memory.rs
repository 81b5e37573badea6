use super::{Document, Element, Listener, Location, NavigationGuard, Verdict};
use crate::error::{Result, TransmitterError};
use log::debug;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// In-memory navigable location.
///
/// Uses `RefCell` for interior mutability since transmitters are
/// single-threaded. Guards and listeners are cloned out before they run so
/// that they may navigate again or register more callbacks.
pub struct MemoryLocation {
    href: RefCell<String>,
    guards: RefCell<Vec<Rc<dyn Fn(&str) -> Verdict>>>,
    listeners: RefCell<Vec<Rc<dyn Fn()>>>,
}

impl MemoryLocation {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: RefCell::new(href.into()),
            guards: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Attempt to move to `target`.
    ///
    /// Returns false if a guard vetoed; the href is then left untouched and
    /// no change listener runs.
    pub fn navigate(&self, target: &str) -> bool {
        let guards: Vec<_> = self.guards.borrow().iter().cloned().collect();
        if guards.iter().any(|guard| guard(target) == Verdict::Veto) {
            debug!("navigation to {target} vetoed");
            return false;
        }

        *self.href.borrow_mut() = target.to_string();

        let listeners: Vec<_> = self.listeners.borrow().iter().cloned().collect();
        for listener in listeners {
            listener();
        }
        true
    }

    /// Navigate to the current href with its fragment replaced.
    pub fn set_fragment(&self, fragment: &str) -> bool {
        let target = {
            let href = self.href.borrow();
            let base = href.split('#').next().unwrap_or_default();
            format!("{base}#{fragment}")
        };
        self.navigate(&target)
    }
}

impl Location for MemoryLocation {
    fn href(&self) -> String {
        self.href.borrow().clone()
    }

    fn on_navigate(&self, guard: NavigationGuard) {
        self.guards.borrow_mut().push(Rc::from(guard));
    }

    fn on_changed(&self, listener: Listener) {
        self.listeners.borrow_mut().push(Rc::from(listener));
    }
}

/// In-memory element with attribute observers.
///
/// Observers fire synchronously on every write, including writes that store
/// the value already present.
#[derive(Default)]
pub struct MemoryElement {
    attributes: RefCell<HashMap<String, String>>,
    observers: RefCell<Vec<(String, Rc<dyn Fn()>)>>,
    writes: Cell<usize>,
    simulate_write_error: Cell<bool>,
}

impl MemoryElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(self, name: &str, value: &str) -> Self {
        self.attributes
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
        self
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    /// Number of successful `set_attribute` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    pub fn remove_attribute(&self, name: &str) {
        self.attributes.borrow_mut().remove(name);
        self.notify(name);
    }

    fn notify(&self, name: &str) {
        let observers: Vec<_> = self
            .observers
            .borrow()
            .iter()
            .filter(|(watched, _)| watched == name)
            .map(|(_, observer)| Rc::clone(observer))
            .collect();
        for observer in observers {
            observer();
        }
    }
}

impl Element for MemoryElement {
    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow().get(name).cloned()
    }

    fn set_attribute(&self, name: &str, value: &str) -> Result<()> {
        if self.simulate_write_error.get() {
            return Err(TransmitterError::Store("Simulated write error".to_string()));
        }
        self.attributes
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        self.notify(name);
        Ok(())
    }

    fn observe(&self, name: &str, observer: Listener) {
        self.observers
            .borrow_mut()
            .push((name.to_string(), Rc::from(observer)));
    }
}

/// Selector → element table. Selectors are matched verbatim.
#[derive(Default)]
pub struct MemoryDocument {
    elements: RefCell<HashMap<String, Rc<MemoryElement>>>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, selector: &str, element: Rc<MemoryElement>) {
        self.elements
            .borrow_mut()
            .insert(selector.to_string(), element);
    }
}

impl Document for MemoryDocument {
    fn query_selector(&self, selector: &str) -> Option<Rc<dyn Element>> {
        let element = self.elements.borrow().get(selector).cloned()?;
        Some(element as Rc<dyn Element>)
    }
}
