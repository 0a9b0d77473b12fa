use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const EOF_KEY: &str = "EOF";

/// Flat output record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tuple(pub Map<String, Value>);

impl Tuple {
    pub fn new() -> Self { Self(Map::new()) }

    /// End-of-stream sentinel.
    pub fn eof() -> Self {
        let mut m = Map::new();
        m.insert(EOF_KEY.to_string(), Value::Bool(true));
        Self(m)
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.0.get(EOF_KEY), Some(Value::Bool(true)))
    }

    pub fn put(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> { self.0.get(key) }
    pub fn get_i64(&self, key: &str) -> Option<i64> { self.0.get(key).and_then(Value::as_i64) }
    pub fn get_f64(&self, key: &str) -> Option<f64> { self.0.get(key).and_then(Value::as_f64) }
    pub fn get_str(&self, key: &str) -> Option<&str> { self.0.get(key).and_then(Value::as_str) }

    pub fn keys(&self) -> impl Iterator<Item = &str> { self.0.keys().map(String::as_str) }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn into_value(self) -> Value { Value::Object(self.0) }
}
