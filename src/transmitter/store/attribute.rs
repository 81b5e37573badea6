//! Attribute-state backend: the encoded configuration lives in one attribute
//! of one host element.
//!
//! The element is resolved once, at construction. If nothing matches the
//! selector the backend behaves like [`MemoryBackend`](super::MemoryBackend)
//! for its whole lifetime.
//!
//! Writing the attribute triggers the element's mutation notification, which
//! decodes the attribute and fans the result out. To keep that loop finite an
//! update only writes when the encoded text differs from what is stored.

use super::{Backend, External, ExternalSink};
use crate::broadcast::Transmitter;
use crate::codec::{Codec, FormCodec};
use crate::error::Result;
use crate::host::{Document, Element};
use crate::model::Config;
use crate::settings::Settings;
use log::{trace, warn};
use std::rc::Rc;

pub struct AttributeBackend {
    element: Option<Rc<dyn Element>>,
    attribute: String,
}

impl AttributeBackend {
    pub fn new(document: &dyn Document, selector: &str, attribute: &str) -> Self {
        let element = document.query_selector(selector);
        if element.is_none() {
            warn!("no element matches {selector:?}; {attribute} stays in memory");
        }
        Self {
            element,
            attribute: attribute.to_string(),
        }
    }

    /// Whether an element was found at construction.
    pub fn is_bound(&self) -> bool {
        self.element.is_some()
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    fn stored(&self) -> Option<String> {
        self.element
            .as_ref()
            .and_then(|element| element.attribute(&self.attribute))
    }
}

impl Backend for AttributeBackend {
    fn load(&self, codec: &dyn Codec) -> Config {
        codec.decode(&self.stored().unwrap_or_default())
    }

    fn writes_through(&self) -> bool {
        self.is_bound()
    }

    fn persist(&self, explicit: &Config, codec: &dyn Codec) -> Result<bool> {
        let Some(element) = &self.element else {
            return Ok(false);
        };

        let encoded = codec.encode(explicit);
        if self.stored().as_deref() == Some(encoded.as_str()) {
            trace!("{} already holds {encoded:?}; skipping write", self.attribute);
            return Ok(false);
        }

        element.set_attribute(&self.attribute, &encoded)?;
        Ok(true)
    }

    fn watch(&self, codec: Rc<dyn Codec>, sink: ExternalSink) {
        let Some(element) = &self.element else {
            return;
        };

        let weak = Rc::downgrade(element);
        let name = self.attribute.clone();
        element.observe(
            &self.attribute,
            Box::new(move || {
                let Some(element) = weak.upgrade() else {
                    return;
                };
                let stored = element.attribute(&name).unwrap_or_default();
                trace!("{name} mutated to {stored:?}");
                sink(External::Replaced(codec.decode(&stored)));
            }),
        );
    }
}

impl Transmitter<AttributeBackend> {
    pub fn attribute(document: &dyn Document, selector: &str, attribute: &str) -> Self {
        Self::attribute_with_settings(document, selector, attribute, Settings::default())
    }

    pub fn attribute_with_settings(
        document: &dyn Document,
        selector: &str,
        attribute: &str,
        settings: Settings,
    ) -> Self {
        let backend = AttributeBackend::new(document, selector, attribute);
        Transmitter::with_codec(backend, Rc::new(FormCodec), settings)
    }
}
