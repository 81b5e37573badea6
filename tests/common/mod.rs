#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use transmitter::{ChangeCallback, Config, Widget};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Widget that records every snapshot it receives and can emit changes.
#[derive(Default)]
pub struct RecordingWidget {
    received: RefCell<Vec<Config>>,
    callback: RefCell<Option<ChangeCallback>>,
}

impl RecordingWidget {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Push a change upstream, as a user interaction would.
    pub fn emit(&self, change: Config) {
        if let Some(callback) = self.callback.borrow().as_ref() {
            callback(change);
        }
    }

    pub fn received(&self) -> Vec<Config> {
        self.received.borrow().clone()
    }

    pub fn count(&self) -> usize {
        self.received.borrow().len()
    }

    pub fn last(&self) -> Option<Config> {
        self.received.borrow().last().cloned()
    }
}

impl Widget for RecordingWidget {
    fn update(&self, config: &Config) {
        self.received.borrow_mut().push(config.clone());
    }

    fn on_changed(&self, callback: ChangeCallback) {
        *self.callback.borrow_mut() = Some(callback);
    }
}

/// Widget that caps a numeric key, answering out-of-range snapshots with a
/// corrective change from inside `update`.
pub struct ClampWidget {
    key: String,
    max: f64,
    pub inner: Rc<RecordingWidget>,
}

impl ClampWidget {
    pub fn new(key: &str, max: f64) -> Rc<Self> {
        Rc::new(Self {
            key: key.to_string(),
            max,
            inner: RecordingWidget::new(),
        })
    }
}

impl Widget for ClampWidget {
    fn update(&self, config: &Config) {
        self.inner.update(config);
        let over = config
            .get(&self.key)
            .and_then(|value| value.as_f64())
            .is_some_and(|value| value > self.max);
        if over {
            self.inner.emit(Config::new().with(self.key.as_str(), self.max));
        }
    }

    fn on_changed(&self, callback: ChangeCallback) {
        self.inner.on_changed(callback);
    }
}
