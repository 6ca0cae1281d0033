//! Render context, the string-keyed map a template sees during execution.

use std::collections::btree_map::{self, BTreeMap};

use minijinja::value::{Value, ValueKind};
use serde::Serialize;

use crate::error::RenderError;

/// Per-request template variables.
///
/// Built from the handler's payload, then mutated in place by context
/// processors before the template executes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RenderContext(BTreeMap<String, Value>);

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert a handler payload into a context.
    ///
    /// The payload must serialize to a map with string keys (a struct, a
    /// `HashMap<String, _>`, a JSON object, ...). Only the top level is
    /// checked; nested values are passed through as-is.
    pub fn from_data<T: Serialize + ?Sized>(data: &T) -> Result<Self, RenderError> {
        // A failing `Serialize` impl yields an invalid value carrying the
        // serializer's message.
        let value = Value::from_serialize(data);
        if value.kind() == ValueKind::Invalid {
            return Err(minijinja::Error::new(
                minijinja::ErrorKind::BadSerialization,
                value.to_string(),
            )
            .into());
        }
        if value.kind() != ValueKind::Map {
            return Err(RenderError::DataFormat {
                found: value.kind().to_string(),
            });
        }

        let mut ctx = Self::new();
        for key in value.try_iter()? {
            let Some(name) = key.as_str() else {
                return Err(RenderError::DataFormat {
                    found: format!("map with {} key", key.kind()),
                });
            };
            let item = value.get_item(&key)?;
            ctx.0.insert(name.to_string(), item);
        }
        Ok(ctx)
    }

    /// Insert or overwrite `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
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

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for RenderContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for RenderContext {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a RenderContext {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;

    #[derive(Serialize)]
    struct Page {
        title: &'static str,
        count: u32,
    }

    #[test]
    fn json_object_becomes_context() {
        let ctx = RenderContext::from_data(&json!({ "homelink": "/", "n": 2 })).unwrap();
        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx.get("homelink").and_then(|v| v.as_str()), Some("/"));
        assert_eq!(ctx.get("n"), Some(&Value::from(2)));
    }

    #[test]
    fn struct_payload_is_a_string_keyed_map() {
        let ctx = RenderContext::from_data(&Page { title: "Home", count: 3 }).unwrap();
        assert_eq!(ctx.keys().collect::<Vec<_>>(), vec!["count", "title"]);
    }

    #[test]
    fn nested_values_are_not_inspected() {
        let mut inner = HashMap::new();
        inner.insert(1, "one");
        let mut outer = HashMap::new();
        outer.insert("numbers".to_string(), inner);

        let ctx = RenderContext::from_data(&outer).unwrap();
        assert!(ctx.contains_key("numbers"));
    }

    #[test]
    fn scalar_payloads_are_rejected() {
        for data in [json!("plain string"), json!(42), json!([1, 2]), json!(null)] {
            let err = RenderContext::from_data(&data).unwrap_err();
            assert!(matches!(err, RenderError::DataFormat { .. }), "got: {err}");
            assert!(err.to_string().starts_with("incorrect data format"), "got: {err}");
        }
    }

    #[test]
    fn non_string_keys_are_rejected() {
        let mut data = HashMap::new();
        data.insert(7, "seven");
        let err = RenderContext::from_data(&data).unwrap_err();
        assert!(matches!(err, RenderError::DataFormat { .. }), "got: {err}");
    }

    #[test]
    fn serializer_failure_keeps_its_message() {
        struct Exploding;

        impl Serialize for Exploding {
            fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("payload exploded"))
            }
        }

        let err = RenderContext::from_data(&Exploding).unwrap_err();
        assert!(matches!(err, RenderError::Engine(_)), "got: {err}");
        assert!(err.to_string().contains("payload exploded"), "got: {err}");
    }

    #[test]
    fn insert_overwrites_and_returns_previous() {
        let mut ctx = RenderContext::new();
        assert!(ctx.insert("x", 1).is_none());
        assert_eq!(ctx.insert("x", 2), Some(Value::from(1)));
        assert_eq!(ctx.remove("x"), Some(Value::from(2)));
        assert!(ctx.is_empty());
    }

    #[test]
    fn collects_from_pairs() {
        let ctx: RenderContext = [("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(ctx.iter().count(), 2);
    }
}
