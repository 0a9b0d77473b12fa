use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered, multi-valued request parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolrParams {
    values: IndexMap<String, Vec<String>>,
}

impl SolrParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every value of `name`.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.values.insert(name.to_string(), vec![value.into()]);
        self
    }

    /// Appends a value to `name`, keeping existing ones.
    pub fn add(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.values.entry(name.to_string()).or_default().push(value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(|v| v.first()).map(String::as_str)
    }

    pub fn get_all(&self, name: &str) -> &[String] {
        self.values.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.values.shift_remove(name)
    }

    /// Values from `other` replace same-named values here.
    pub fn set_all(&mut self, other: &SolrParams) -> &mut Self {
        for (name, values) in &other.values {
            self.values.insert(name.clone(), values.clone());
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// One `(name, value)` pair per value, for the query string.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.values
            .iter()
            .flat_map(|(k, vs)| vs.iter().map(move |v| (k.clone(), v.clone())))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SolrParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut params = SolrParams::new();
        for (k, v) in iter {
            let k: String = k.into();
            params.add(&k, v);
        }
        params
    }
}
