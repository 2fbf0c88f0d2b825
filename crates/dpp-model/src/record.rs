//! Flat path-keyed records produced by connectors.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One parsed source unit — an XML element, a CSV row, an Excel row —
/// flattened into an ordered map of path-keyed scalar values.
///
/// Keys are flat strings that encode hierarchy: `/`-separated element paths
/// (`MaterialLot/ID`), `@`-prefixed attribute leaves (`MaterialLot/@status`),
/// and the predicate form `MaterialLot/Property[@ID='capacity']/Value` for
/// repeated ISA-95 property elements. Values are always scalar: string,
/// number, boolean, or null — never a nested container.
///
/// Records preserve the order in which fields were discovered in the source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataRecord {
    fields: IndexMap<String, Value>,
}

impl DataRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a scalar value under a path key, returning the previous value
    /// if the key was already present (repeated source fields overwrite).
    pub fn insert(&mut self, path: impl Into<String>, value: Value) -> Option<Value> {
        debug_assert!(
            !matches!(value, Value::Array(_) | Value::Object(_)),
            "DataRecord values must be scalar"
        );
        self.fields.insert(path.into(), value)
    }

    /// Looks up a field by its exact path key. `Some(&Value::Null)` means the
    /// source carried the field with an empty value; `None` means absent.
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.fields.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.fields.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Path keys in discovery order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Value)> for DataRecord {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (path, value) in iter {
            record.insert(path, value);
        }
        record
    }
}

impl<'a> IntoIterator for &'a DataRecord {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_and_get() {
        let mut record = DataRecord::new();
        record.insert("MaterialLot/ID", json!("BAT-001"));
        record.insert("MaterialLot/Quantity", json!(42));

        assert_eq!(record.get("MaterialLot/ID"), Some(&json!("BAT-001")));
        assert_eq!(record.get("MaterialLot/Quantity"), Some(&json!(42)));
        assert_eq!(record.get("MaterialLot/Missing"), None);
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn repeated_insert_overwrites_in_place() {
        let mut record = DataRecord::new();
        record.insert("a", json!("first"));
        record.insert("b", json!("keep"));
        let previous = record.insert("a", json!("second"));

        assert_eq!(previous, Some(json!("first")));
        assert_eq!(record.get("a"), Some(&json!("second")));
        // Overwriting does not change discovery order.
        let paths: Vec<_> = record.paths().collect();
        assert_eq!(paths, vec!["a", "b"]);
    }

    #[test]
    fn preserves_discovery_order() {
        let record: DataRecord = [
            ("zeta".to_string(), json!(1)),
            ("alpha".to_string(), json!(2)),
            ("mid".to_string(), json!(3)),
        ]
        .into_iter()
        .collect();

        let paths: Vec<_> = record.paths().collect();
        assert_eq!(paths, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn null_is_present_but_absent_is_none() {
        let mut record = DataRecord::new();
        record.insert("present", Value::Null);

        assert_eq!(record.get("present"), Some(&Value::Null));
        assert!(record.contains("present"));
        assert!(!record.contains("absent"));
    }

    #[test]
    fn serializes_as_plain_object() {
        let mut record = DataRecord::new();
        record.insert("MaterialLot/ID", json!("BAT-001"));
        let encoded = serde_json::to_value(&record).unwrap();
        assert_eq!(encoded, json!({"MaterialLot/ID": "BAT-001"}));
    }
}
