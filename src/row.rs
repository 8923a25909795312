//! Positional tokenizing of data lines against the active [`Schema`].
//!
//! A row is an ordered, case-insensitive mapping from column name to an
//! optional value. The same [`FieldMap`] type backs the open field map carried
//! by every [`LogRecord`](crate::LogRecord).

use crate::schema::Schema;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Token that stands for "no value" in a W3C data line.
pub const ABSENT_TOKEN: &str = "-";

/// Ordered map of column name to optional value with case-insensitive keys.
///
/// Insertion order is preserved and the original spelling of the first
/// insertion of a key is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: Vec<(String, Option<String>)>,
}

impl FieldMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Insert or replace the value for `key`; returns the previous value if the
    /// key was already present.
    pub fn insert<K: Into<String>>(
        &mut self,
        key: K,
        value: Option<String>,
    ) -> Option<Option<String>> {
        let key = key.into();
        if let Some(slot) = self.slot_mut(&key) {
            return Some(std::mem::replace(slot, value));
        }
        self.entries.push((key, value));
        None
    }

    /// Look up `key` ignoring ASCII case.
    ///
    /// The outer `Option` tells whether the column exists at all; the inner
    /// one whether it carried a value on this line.
    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_deref())
    }

    /// The value of `key`, flattening "missing" and "absent" together.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key).flatten()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k.eq_ignore_ascii_case(key))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    fn slot_mut(&mut self, key: &str) -> Option<&mut Option<String>> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }
}

impl IntoIterator for FieldMap {
    type Item = (String, Option<String>);
    type IntoIter = std::vec::IntoIter<(String, Option<String>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for FieldMap {
    fn from_iter<T: IntoIterator<Item = (K, Option<String>)>>(iter: T) -> Self {
        let mut map = FieldMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FieldMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldMapVisitor;

        impl<'de> Visitor<'de> for FieldMapVisitor {
            type Value = FieldMap;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of column names to optional strings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<FieldMap, A::Error> {
                let mut map = FieldMap::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((k, v)) = access.next_entry::<String, Option<String>>()? {
                    map.insert(k, v);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(FieldMapVisitor)
    }
}

/// Zip the space-delimited tokens of `line` with the columns of `schema`.
///
/// Every schema column is present in the result. Columns past the end of the
/// line and `-` tokens map to `None`; tokens past the end of the schema are
/// dropped.
pub fn tokenize(schema: &Schema, line: &str) -> FieldMap {
    let mut row = FieldMap::with_capacity(schema.len());
    let mut tokens = line.split(' ');
    for column in schema.columns() {
        let value = tokens.next().and_then(|t| {
            if t == ABSENT_TOKEN {
                None
            } else {
                Some(t.to_string())
            }
        });
        row.insert(column.as_str(), value);
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::new(["date", "time", "cs-uri-stem", "X-Custom"])
    }

    #[test]
    fn zips_tokens_in_order() {
        let row = tokenize(&schema(), "2024-01-01 00:00:00 /a.html v");
        let pairs: Vec<_> = row.iter().collect();
        assert_eq!(
            pairs,
            vec![
                ("date", Some("2024-01-01")),
                ("time", Some("00:00:00")),
                ("cs-uri-stem", Some("/a.html")),
                ("X-Custom", Some("v")),
            ]
        );
    }

    #[test]
    fn short_line_keeps_trailing_keys_as_none() {
        let row = tokenize(&schema(), "2024-01-01 00:00:00");
        assert_eq!(row.len(), 4);
        assert_eq!(row.get("cs-uri-stem"), Some(None));
        assert_eq!(row.get("x-custom"), Some(None));
    }

    #[test]
    fn dash_is_absent_and_extra_tokens_are_ignored() {
        let row = tokenize(&schema(), "2024-01-01 - /a.html v extra more");
        assert_eq!(row.get("time"), Some(None));
        assert_eq!(row.len(), 4);
        assert!(!row.contains_key("extra"));
    }

    #[test]
    fn lookups_ignore_case() {
        let row = tokenize(&schema(), "d t /p v");
        assert_eq!(row.value("CS-URI-STEM"), Some("/p"));
        assert_eq!(row.value("x-custom"), Some("v"));
        assert_eq!(row.get("nope"), None);
    }

    #[test]
    fn insert_replaces_case_insensitively() {
        let mut m = FieldMap::new();
        assert_eq!(m.insert("Key", Some("a".into())), None);
        assert_eq!(m.insert("KEY", Some("b".into())), Some(Some("a".into())));
        assert_eq!(m.len(), 1);
        assert_eq!(m.keys().collect::<Vec<_>>(), vec!["Key"]);
        assert_eq!(m.value("key"), Some("b"));
    }

    #[test]
    fn serializes_as_json_object_with_nulls() -> anyhow::Result<()> {
        let m: FieldMap = vec![("a", Some("1".to_string())), ("b", None)]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&m)?;
        assert_eq!(json, r#"{"a":"1","b":null}"#);
        let back: FieldMap = serde_json::from_str(&json)?;
        assert_eq!(back, m);
        Ok(())
    }
}
