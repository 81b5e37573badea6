//! # The Transmitter
//!
//! A [`Transmitter`] owns one logical configuration and keeps every joined
//! widget in sync with it:
//!
//! ```text
//!   widget ──on_changed──▶ update ──merge──▶ explicit ──fan-out──▶ every widget
//!                            │                  ▲
//!                            ▼ (write-through)  │ External::Replaced / Edited
//!                          Backend::persist ──▶ store ──notification──┘
//! ```
//!
//! ## State
//!
//! - **Defaults**: an optional, immutable overlay given once before widgets
//!   join. Never persisted.
//! - **Explicit**: everything set through `update` or by the store.
//! - **Registry**: joined widgets in join order, which is also fan-out order.
//!
//! [`Transmitter::get`] is always `defaults ⊕ explicit`, explicit winning.
//!
//! ## Reentrancy
//!
//! Everything runs synchronously on one thread. No internal borrow is held
//! while a widget or the store is called, so widgets may call back into the
//! transmitter from `update`. A widget that answers every snapshot with a
//! new change never converges; that is the widget's responsibility.
//!
//! ## Failure Policy
//!
//! Operations never fail towards the caller: empty input is a no-op, and a
//! store that refuses a write is logged while the snapshot is still fanned
//! out so that widgets stay consistent.

use crate::codec::{Codec, FormCodec};
use crate::model::Config;
use crate::settings::Settings;
use crate::store::{Backend, External, Lock};
use crate::widget::{Registry, Widget, WidgetId};
use log::{debug, trace, warn};
use std::cell::RefCell;
use std::rc::Rc;

/// Input accepted by `update`, `update_if_absent` and `with_defaults`: a
/// config or its encoded text form.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Config(Config),
    Encoded(String),
}

impl Change {
    fn into_config(self, codec: &dyn Codec) -> Config {
        match self {
            Change::Config(config) => config,
            Change::Encoded(text) => codec.decode(&text),
        }
    }
}

impl From<Config> for Change {
    fn from(config: Config) -> Self {
        Change::Config(config)
    }
}

impl From<&Config> for Change {
    fn from(config: &Config) -> Self {
        Change::Config(config.clone())
    }
}

impl From<&str> for Change {
    fn from(text: &str) -> Self {
        Change::Encoded(text.to_string())
    }
}

impl From<String> for Change {
    fn from(text: String) -> Self {
        Change::Encoded(text)
    }
}

#[derive(Default)]
struct State {
    defaults: Option<Config>,
    explicit: Config,
    registry: Registry,
}

impl State {
    fn snapshot(&self) -> Config {
        match &self.defaults {
            Some(defaults) => defaults.merged_with(&self.explicit),
            None => self.explicit.clone(),
        }
    }
}

struct Shared<B: Backend> {
    backend: B,
    codec: Rc<dyn Codec>,
    settings: Settings,
    state: RefCell<State>,
}

/// Broadcaster of one shared configuration, generic over its [`Backend`].
///
/// Cloning yields another handle to the same transmitter.
pub struct Transmitter<B: Backend> {
    shared: Rc<Shared<B>>,
}

impl<B: Backend> Clone for Transmitter<B> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<B: Backend> Transmitter<B> {
    pub fn new(backend: B) -> Self {
        Self::with_codec(backend, Rc::new(FormCodec), Settings::default())
    }

    /// Seed explicit config from the backend, then subscribe to it.
    pub fn with_codec(backend: B, codec: Rc<dyn Codec>, settings: Settings) -> Self {
        let explicit = backend.load(codec.as_ref());
        let shared = Rc::new(Shared {
            backend,
            codec: Rc::clone(&codec),
            settings,
            state: RefCell::new(State {
                explicit,
                ..State::default()
            }),
        });

        let weak = Rc::downgrade(&shared);
        shared.backend.watch(
            codec,
            Rc::new(move |event: External| match weak.upgrade() {
                Some(shared) => Transmitter { shared }.apply_external(event),
                None => trace!("transmitter dropped; ignoring store notification"),
            }),
        );

        Self { shared }
    }

    /// Defaults overlaid by explicit config.
    pub fn get(&self) -> Config {
        self.shared.state.borrow().snapshot()
    }

    /// Install the default overlay. Only the first non-empty overlay counts.
    pub fn with_defaults(&self, defaults: impl Into<Change>) {
        let defaults = defaults.into().into_config(self.codec());
        if defaults.is_empty() {
            return;
        }

        let mut state = self.shared.state.borrow_mut();
        if state.defaults.is_some() {
            warn!("default overlay already set; ignoring {defaults:?}");
            return;
        }
        if !state.registry.is_empty() {
            warn!(
                "defaults set after {} widget(s) joined; they will see them on the next change",
                state.registry.len()
            );
        }
        state.defaults = Some(defaults);
    }

    /// Register `widget`, hand it the current snapshot, and forward its
    /// changes into [`Transmitter::update`] until it leaves.
    pub fn join(&self, widget: Rc<dyn Widget>) -> WidgetId {
        let id = self
            .shared
            .state
            .borrow_mut()
            .registry
            .push(Rc::clone(&widget));
        debug!("{id} joined");

        widget.update(&self.get());

        let weak = Rc::downgrade(&self.shared);
        widget.on_changed(Box::new(move |change: Config| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            if !shared.state.borrow().registry.contains(id) {
                trace!("{id} left; ignoring its change");
                return;
            }
            Transmitter { shared }.update(change);
        }));

        id
    }

    /// Remove a widget. Returns false if it was not registered.
    pub fn leave(&self, id: WidgetId) -> bool {
        let removed = self.shared.state.borrow_mut().registry.remove(id);
        if removed {
            debug!("{id} left");
        }
        removed
    }

    /// Merge `change` into the configuration and fan the result out.
    pub fn update(&self, change: impl Into<Change>) {
        let change = change.into().into_config(self.codec());
        if change.is_empty() {
            return;
        }
        if let Some(lock) = self.shared.backend.lock() {
            debug!("locked to {lock}; ignoring update");
            return;
        }
        if self.shared.backend.writes_through() {
            self.write_through(&change);
            return;
        }

        let merged = self.get().merged_with(&change);
        self.shared.state.borrow_mut().explicit = merged.clone();
        self.broadcast(&merged);
    }

    /// Fill in only keys that are currently unset, with a single fan-out.
    pub fn update_if_absent(&self, change: impl Into<Change>) {
        let change = change.into().into_config(self.codec());
        let current = self.get();
        let mut working = current.clone();
        let mut staged = 0;

        for (key, value) in change {
            if !value.is_none() && current.is_unset(&key) {
                working.insert(key, value);
                staged += 1;
            }
        }

        if staged > 0 {
            trace!("filling {staged} absent key(s)");
            self.update(working);
        }
    }

    /// Encoded explicit config, minus values equal to their defaults.
    /// A locked transmitter serializes to its lock only.
    pub fn serialize(&self) -> String {
        if let Some(lock) = self.shared.backend.lock() {
            return lock.to_string();
        }

        let state = self.shared.state.borrow();
        match &state.defaults {
            None => self.codec().encode(&state.explicit),
            Some(defaults) => {
                let rule = self.shared.settings.sequence_equality();
                self.codec()
                    .encode(&state.explicit.diff_from_defaults(defaults, rule))
            }
        }
    }

    pub fn is_locked(&self) -> bool {
        self.shared.backend.lock().is_some()
    }

    pub fn lock(&self) -> Option<&Lock> {
        self.shared.backend.lock()
    }

    pub fn widget_count(&self) -> usize {
        self.shared.state.borrow().registry.len()
    }

    pub fn settings(&self) -> &Settings {
        &self.shared.settings
    }

    pub fn backend(&self) -> &B {
        &self.shared.backend
    }

    fn codec(&self) -> &dyn Codec {
        self.shared.codec.as_ref()
    }

    fn write_through(&self, change: &Config) {
        let explicit = {
            let mut state = self.shared.state.borrow_mut();
            state.explicit.extend_from(change);
            state.explicit.clone()
        };

        match self.shared.backend.persist(&explicit, self.codec()) {
            Ok(true) => trace!("store written"),
            Ok(false) => trace!("store unchanged"),
            Err(err) => {
                warn!("failed to persist configuration: {err}");
                self.broadcast(&self.get());
            }
        }
    }

    fn apply_external(&self, event: External) {
        match event {
            External::Replaced(config) => {
                self.shared.state.borrow_mut().explicit = config;
                self.broadcast(&self.get());
            }
            External::Edited(config) => self.update(config),
        }
    }

    fn broadcast(&self, config: &Config) {
        let widgets = self.shared.state.borrow().registry.snapshot();
        trace!("broadcasting to {} widget(s)", widgets.len());
        for widget in widgets {
            widget.update(config);
        }
    }
}
