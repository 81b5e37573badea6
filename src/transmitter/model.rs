//! Configuration values and the merge/diff rules shared by every transmitter.
//!
//! A [`Config`] is a flat mapping from keys to [`Value`]s. Two rules matter
//! everywhere else in the crate:
//!
//! - **Merging** is a plain overlay: the right-hand side wins on key collision
//!   ([`Config::merged_with`]).
//! - **Diffing against defaults** drops every explicit value that matches its
//!   default ([`Config::diff_from_defaults`]), using [`Value::matches`] so that
//!   lists compare independently of element order.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};

/// Runtime representation of a configuration value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    /// Ordered sequence of scalars.
    List(Vec<Value>),
}

/// How two lists are compared when diffing explicit values against defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceEquality {
    /// Same length and every element occurs equally often in both lists.
    #[default]
    Multiset,
    /// Same length and every element of the first list appears in the second.
    /// `[a, a]` and `[a, b]` compare equal under this rule.
    Membership,
}

impl Value {
    /// `Null` and empty text count as unset when merging.
    pub fn is_none(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Equality used for default-diffing.
    ///
    /// Scalars compare by variant and value (`Number(2020.0)` never matches
    /// `Text("2020")`). Two lists compare according to `rule`. A list never
    /// matches a scalar.
    pub fn matches(&self, other: &Value, rule: SequenceEquality) -> bool {
        match (self, other) {
            (Value::List(a), Value::List(b)) => {
                if a.len() != b.len() {
                    return false;
                }
                match rule {
                    SequenceEquality::Membership => a.iter().all(|x| b.contains(x)),
                    SequenceEquality::Multiset => a
                        .iter()
                        .all(|x| occurrences(a, x) == occurrences(b, x)),
                }
            }
            (Value::List(_), _) | (_, Value::List(_)) => false,
            _ => self == other,
        }
    }
}

fn occurrences(items: &[Value], needle: &Value) -> usize {
    items.iter().filter(|item| *item == needle).count()
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// A mapping from unique keys to values.
///
/// Keys are kept sorted so that encoding is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config(BTreeMap<String, Value>);

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Parse a JSON object such as `{"units": "kg", "year": 2020}`.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, String, Value> {
        self.0.keys()
    }

    /// True when the key is absent or holds a "none" value.
    pub fn is_unset(&self, key: &str) -> bool {
        self.get(key).map_or(true, Value::is_none)
    }

    /// Overlay `other` on top of `self`; `other` wins on shared keys.
    pub fn merged_with(&self, other: &Config) -> Config {
        let mut merged = self.clone();
        merged.extend_from(other);
        merged
    }

    /// In-place form of [`Config::merged_with`].
    pub fn extend_from(&mut self, other: &Config) {
        for (key, value) in other.iter() {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// The subset of `self` whose values differ from `defaults`.
    ///
    /// Keys that only exist in `defaults` have no explicit value to emit and
    /// are therefore never part of the result.
    pub fn diff_from_defaults(&self, defaults: &Config, rule: SequenceEquality) -> Config {
        self.iter()
            .filter(|(key, value)| {
                !defaults
                    .get(key)
                    .is_some_and(|default| default.matches(value, rule))
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Config {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Config(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Config {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Config {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> Value {
        Value::from(items.to_vec())
    }

    #[test]
    fn test_merged_with_prefers_right_hand_side() {
        let defaults = Config::new().with("units", "kg").with("year", 2020);
        let explicit = Config::new().with("year", 2021).with("scope", "full");

        let merged = defaults.merged_with(&explicit);

        assert_eq!(merged.get("units"), Some(&Value::from("kg")));
        assert_eq!(merged.get("year"), Some(&Value::Number(2021.0)));
        assert_eq!(merged.get("scope"), Some(&Value::from("full")));
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_none_values_count_as_unset() {
        let config = Config::new()
            .with("empty", "")
            .with("null", Value::Null)
            .with("zero", 0)
            .with("off", false);

        assert!(config.is_unset("empty"));
        assert!(config.is_unset("null"));
        assert!(config.is_unset("missing"));
        assert!(!config.is_unset("zero"));
        assert!(!config.is_unset("off"));
    }

    #[test]
    fn test_diff_drops_values_equal_to_defaults() {
        let defaults = Config::new().with("units", "kg").with("year", 2020);
        let explicit = Config::new().with("year", 2020).with("scope", "full");

        let diff = explicit.diff_from_defaults(&defaults, SequenceEquality::Multiset);

        assert_eq!(diff, Config::new().with("scope", "full"));
    }

    #[test]
    fn test_diff_keeps_values_of_a_different_type() {
        let defaults = Config::new().with("year", 2020);
        let explicit = Config::new().with("year", "2020");

        let diff = explicit.diff_from_defaults(&defaults, SequenceEquality::Multiset);

        assert_eq!(diff.get("year"), Some(&Value::from("2020")));
    }

    #[test]
    fn test_lists_match_regardless_of_order() {
        let a = list(&["x", "y", "z"]);
        let b = list(&["z", "x", "y"]);
        assert!(a.matches(&b, SequenceEquality::Multiset));
        assert!(a.matches(&b, SequenceEquality::Membership));
    }

    #[test]
    fn test_lists_of_different_length_never_match() {
        let a = list(&["x", "y"]);
        let b = list(&["x", "y", "y"]);
        assert!(!a.matches(&b, SequenceEquality::Multiset));
        assert!(!a.matches(&b, SequenceEquality::Membership));
    }

    #[test]
    fn test_multiset_rule_counts_duplicates() {
        let a = list(&["a", "a"]);
        let b = list(&["a", "b"]);
        assert!(!a.matches(&b, SequenceEquality::Multiset));
        // The membership rule only checks that each element of `a` is in `b`.
        assert!(a.matches(&b, SequenceEquality::Membership));

        let c = list(&["a", "a", "b"]);
        let d = list(&["a", "b", "b"]);
        assert!(!c.matches(&d, SequenceEquality::Multiset));
    }

    #[test]
    fn test_list_never_matches_scalar() {
        assert!(!list(&["a"]).matches(&Value::from("a"), SequenceEquality::Multiset));
        assert!(!Value::from("a").matches(&list(&["a"]), SequenceEquality::Membership));
    }

    #[test]
    fn test_from_json_reads_mixed_values() {
        let config =
            Config::from_json(r#"{"units": "kg", "year": 2020, "tags": ["a", "b"], "on": true, "gone": null}"#)
                .unwrap();

        assert_eq!(config.get("units"), Some(&Value::from("kg")));
        assert_eq!(config.get("year").and_then(Value::as_f64), Some(2020.0));
        assert_eq!(config.get("tags"), Some(&list(&["a", "b"])));
        assert_eq!(config.get("on").and_then(Value::as_bool), Some(true));
        assert_eq!(config.get("gone"), Some(&Value::Null));
    }

    #[test]
    fn test_from_json_rejects_non_objects() {
        assert!(Config::from_json("[1, 2]").is_err());
        assert!(Config::from_json("not json").is_err());
    }
}
