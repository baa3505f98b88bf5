//! Vector store row types, metadata values and filters.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A scalar metadata value.
///
/// Store metadata only holds scalars. Lists are encoded as JSON text by
/// [`Metadata::put_list`] and decoded by [`Metadata::list`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<bool> for MetadataValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for MetadataValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<u64> for MetadataValue {
    fn from(i: u64) -> Self {
        Self::Int(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

impl From<f64> for MetadataValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

/// Scalar-only metadata attached to a stored document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, MetadataValue>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a scalar value.
    pub fn put(&mut self, key: &str, value: impl Into<MetadataValue>) -> &mut Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Insert a list, encoded as JSON text.
    pub fn put_list(&mut self, key: &str, values: &[String]) -> &mut Self {
        let encoded = serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string());
        self.put(key, encoded)
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.0.get(key)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(MetadataValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// String value, or an empty string when absent.
    pub fn string(&self, key: &str) -> String {
        self.str(key).unwrap_or_default().to_string()
    }

    pub fn float(&self, key: &str) -> Option<f64> {
        match self.0.get(key) {
            Some(MetadataValue::Float(f)) => Some(*f),
            Some(MetadataValue::Int(i)) => Some(*i as f64),
            Some(MetadataValue::Str(s)) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        match self.0.get(key) {
            Some(MetadataValue::Int(i)) => Some(*i),
            Some(MetadataValue::Float(f)) => Some(*f as i64),
            Some(MetadataValue::Str(s)) => s.parse().ok(),
            _ => None,
        }
    }

    /// Non-negative counter value, zero when absent.
    pub fn count(&self, key: &str) -> u64 {
        self.int(key).map(|i| i.max(0) as u64).unwrap_or(0)
    }

    /// Boolean value. Accepts the `"true"`/`"false"` strings older
    /// collections used for flags.
    pub fn bool(&self, key: &str) -> Option<bool> {
        match self.0.get(key) {
            Some(MetadataValue::Bool(b)) => Some(*b),
            Some(MetadataValue::Str(s)) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            Some(MetadataValue::Int(i)) => Some(*i != 0),
            _ => None,
        }
    }

    /// Decode a list written by [`Metadata::put_list`]. Missing or
    /// undecodable values yield an empty list.
    pub fn list(&self, key: &str) -> Vec<String> {
        self.str(key)
            .and_then(|s| serde_json::from_str(s).ok())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Metadata filter for `get`, `query` and `count`.
#[derive(Debug, Clone, PartialEq)]
pub enum Where {
    /// Field equals value.
    Eq(String, MetadataValue),
    /// Field equals any of the values.
    In(String, Vec<MetadataValue>),
    /// All sub-filters hold.
    And(Vec<Where>),
}

impl Where {
    pub fn eq(field: &str, value: impl Into<MetadataValue>) -> Self {
        Self::Eq(field.to_string(), value.into())
    }

    pub fn is_in<V: Into<MetadataValue>>(field: &str, values: impl IntoIterator<Item = V>) -> Self {
        Self::In(field.to_string(), values.into_iter().map(Into::into).collect())
    }

    /// Combine with another filter.
    pub fn and(self, other: Where) -> Self {
        match self {
            Self::And(mut clauses) => {
                clauses.push(other);
                Self::And(clauses)
            }
            first => Self::And(vec![first, other]),
        }
    }
}

/// A document to be written to a collection.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub id: String,
    pub document: String,
    pub embedding: Option<Vec<f32>>,
    pub metadata: Metadata,
}

/// A stored document as returned by `get`.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub document: String,
    pub metadata: Metadata,
}

/// A similarity query match. `distance` is `1 - cosine similarity`.
#[derive(Debug, Clone)]
pub struct QueryHit {
    pub id: String,
    pub document: String,
    pub metadata: Metadata,
    pub distance: f32,
}

impl QueryHit {
    pub fn similarity(&self) -> f32 {
        1.0 - self.distance
    }
}
