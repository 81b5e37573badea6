//! Flat text form of a [`Config`].
//!
//! Transmitters only rely on the [`Codec`] contract:
//!
//! - `decode` is total: empty or malformed input yields an empty (or partial)
//!   config, never an error.
//! - `encode` emits exactly the keys present in its input.
//! - `decode(encode(c))` is equivalent to `c` for every config the crate
//!   produces.
//!
//! [`FormCodec`] is the default grammar, a form-urlencoded pair list:
//!
//! ```text
//! units=kg&year=2020&label='2020&tags[]=a&tags[]=null&none=null&empty[]
//! ```
//!
//! | Value | Encoding |
//! |-------|----------|
//! | `Text("kg")` | `units=kg` |
//! | `Text("2020")` | quoted: `label='2020` |
//! | `Number(2020.0)` | `year=2020` |
//! | `Bool(true)` | `on=true` |
//! | `Null` | `none=null` (a bare `none` also decodes to `Null`) |
//! | `List([a, null])` | `tags[]=a&tags[]=null` |
//! | `List([])` | bare list key: `empty[]` |
//!
//! Decoding infers scalar types: `true`/`false` become booleans, `null`
//! becomes `Null`, and text that is the canonical rendering of an `f64`
//! becomes a number (`2020` does, `007` and `1.50` stay text). Text that
//! would otherwise be read as one of those, or that starts with the quote
//! `'`, is written with a leading `'` which decoding strips again.
//!
//! The empty key is a key like any other: `=x` decodes to `{"": "x"}`.
//! Lists hold scalars; a list nested in a list has no encoding and is dropped
//! with a warning.

use crate::model::{Config, Value};
use log::warn;
use url::form_urlencoded;

/// Reversible mapping between a [`Config`] and its text form.
pub trait Codec {
    fn decode(&self, text: &str) -> Config;
    fn encode(&self, config: &Config) -> String;
}

const LIST_SUFFIX: &str = "[]";
const QUOTE: char = '\'';
const NULL: &str = "null";

/// The default `k=v&...` codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormCodec;

impl FormCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Codec for FormCodec {
    fn decode(&self, text: &str) -> Config {
        let mut config = Config::new();

        for segment in text.split('&').filter(|s| !s.is_empty()) {
            let (raw_key, raw_value) = match segment.split_once('=') {
                Some((key, value)) => (key, Some(value)),
                None => (segment, None),
            };

            if let Some(raw_name) = raw_key.strip_suffix(LIST_SUFFIX) {
                let name = unescape(raw_name);
                let mut items = match config.remove(&name) {
                    Some(Value::List(items)) => items,
                    _ => Vec::new(),
                };
                if let Some(raw) = raw_value {
                    items.push(infer(&unescape(raw)));
                }
                config.insert(name, Value::List(items));
                continue;
            }

            let value = raw_value.map_or(Value::Null, |raw| infer(&unescape(raw)));
            config.insert(unescape(raw_key), value);
        }

        config
    }

    fn encode(&self, config: &Config) -> String {
        let mut pairs = Vec::with_capacity(config.len());

        for (key, value) in config {
            let name = escape(key);
            match value {
                Value::List(items) if items.is_empty() => {
                    pairs.push(format!("{name}{LIST_SUFFIX}"));
                }
                Value::List(items) => {
                    for item in items {
                        match scalar_text(item) {
                            Some(text) => {
                                pairs.push(format!("{name}{LIST_SUFFIX}={}", escape(&text)))
                            }
                            None => warn!("dropping nested list inside {key:?}"),
                        }
                    }
                }
                scalar => {
                    if let Some(text) = scalar_text(scalar) {
                        pairs.push(format!("{name}={}", escape(&text)));
                    }
                }
            }
        }

        pairs.join("&")
    }
}

/// Text form of a scalar, quoted where decoding would otherwise change its type.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(NULL.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Text(s) if needs_quote(s) => Some(format!("{QUOTE}{s}")),
        Value::Text(s) => Some(s.clone()),
        Value::List(_) => None,
    }
}

fn needs_quote(text: &str) -> bool {
    text.starts_with(QUOTE) || !matches!(infer(text), Value::Text(_))
}

fn infer(text: &str) -> Value {
    if let Some(quoted) = text.strip_prefix(QUOTE) {
        return Value::Text(quoted.to_string());
    }
    match text {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        NULL => Value::Null,
        _ => match text.parse::<f64>() {
            Ok(n) if n.to_string() == text => Value::Number(n),
            _ => Value::Text(text.to_string()),
        },
    }
}

fn escape(text: &str) -> String {
    form_urlencoded::byte_serialize(text.as_bytes()).collect()
}

fn unescape(raw: &str) -> String {
    // `parse` splits on '=' itself; a literal '=' inside a value must survive.
    let raw = raw.replace('=', "%3D");
    form_urlencoded::parse(raw.as_bytes())
        .next()
        .map(|(decoded, _)| decoded.into_owned())
        .unwrap_or_default()
}
