//! Generic record returned by the API

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A flat mapping from field key to value, as deserialized from the API.
///
/// Records are never edited in place; a write is followed by a refetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new(values: Map<String, Value>) -> Self {
        Self(values)
    }

    /// Build a record from a JSON value, which must be an object
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// The value under `key` as a string; numbers are stringified
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// The record's `id`
    pub fn id(&self) -> Option<String> {
        self.get_str("id")
    }

    pub fn created_at(&self) -> Option<String> {
        self.get_str("createdAt")
    }

    pub fn updated_at(&self) -> Option<String> {
        self.get_str("updatedAt")
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(values: Map<String, Value>) -> Self {
        Self(values)
    }
}

/// Convert a JSON array into records, skipping anything that is not an object
pub fn records_from_value(value: Value) -> Vec<Record> {
    match value {
        Value::Array(items) => items.into_iter().filter_map(Record::from_value).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_ids_are_stringified() {
        let record = Record::from_value(json!({ "id": 42, "title": "A" })).unwrap();
        assert_eq!(record.id().as_deref(), Some("42"));
        assert_eq!(record.get_str("title").as_deref(), Some("A"));
        assert_eq!(record.get_str("missing"), None);
    }

    #[test]
    fn non_objects_are_dropped() {
        let records = records_from_value(json!([{ "id": "a" }, 3, "x", { "id": "b" }]));
        assert_eq!(records.len(), 2);
        assert!(records_from_value(json!({ "id": "a" })).is_empty());
    }
}
