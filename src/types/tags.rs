//! Ordered tag sets shared by elements, changesets and notes.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An insertion-ordered string-to-string map with unique keys.
///
/// This is the in-memory side of the tag codec: `from_entries` decodes the
/// wire's list-of-`(k, v)`-records shape (last record wins on duplicate
/// keys), and [`Tags::iter`] re-emits the ordered record list. Values are
/// stringified unconditionally at the insertion boundary, so a tag set
/// built from numbers still stores and emits strings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tags {
    entries: Vec<(String, String)>,
}

impl Tags {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Tags {
            entries: Vec::new(),
        }
    }

    /// Decode an ordered sequence of key/value records.
    ///
    /// Duplicate keys are not an error: the last record wins, so a
    /// removal-then-addition sequence upstream stays idempotent.
    pub fn from_entries<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: ToString,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut tags = Tags::new();
        for (key, value) in entries {
            tags.insert(key, value);
        }
        tags
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Set a tag, replacing any previous value for the key.
    ///
    /// The old record is removed before the new one is appended, so
    /// repeated sets never duplicate a key and the final order is
    /// "untouched tags first, then newly-set tags in call order".
    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        self.entries.retain(|(k, _)| *k != key);
        self.entries.push((key, value.to_string()));
    }

    /// Remove a tag, returning its previous value. Absent keys are a no-op.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Iterate the tags in wire order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Tags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Tags::from_entries(iter)
    }
}

impl<K: Into<String>, V: ToString> Extend<(K, V)> for Tags {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Into<String>, V: ToString, const N: usize> From<[(K, V); N]> for Tags {
    fn from(entries: [(K, V); N]) -> Self {
        Tags::from_entries(entries)
    }
}

impl Serialize for Tags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Tags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TagsVisitor;

        impl<'de> Visitor<'de> for TagsVisitor {
            type Value = Tags;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a map of tag keys to tag values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Tags, A::Error> {
                let mut tags = Tags::new();
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    tags.insert(key, value);
                }
                Ok(tags)
            }
        }

        deserializer.deserialize_map(TagsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_record_wins_on_decode() {
        let tags = Tags::from_entries([("highway", "primary"), ("highway", "secondary")]);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags.get("highway"), Some("secondary"));
    }

    #[test]
    fn test_insert_moves_key_to_end() {
        let mut tags = Tags::from_entries([("a", "1"), ("b", "2")]);
        tags.insert("a", "3");
        let order: Vec<_> = tags.iter().collect();
        assert_eq!(order, vec![("b", "2"), ("a", "3")]);
    }

    #[test]
    fn test_values_are_stringified() {
        let mut tags = Tags::new();
        tags.insert("lanes", 2);
        tags.insert("oneway", true);
        assert_eq!(tags.get("lanes"), Some("2"));
        assert_eq!(tags.get("oneway"), Some("true"));
    }

    #[test]
    fn test_remove_absent_key_is_noop() {
        let mut tags = Tags::from_entries([("name", "main street")]);
        assert_eq!(tags.remove("missing"), None);
        assert_eq!(tags.remove("name"), Some("main street".to_string()));
        assert_eq!(tags.remove("name"), None);
        assert!(tags.is_empty());
    }

    #[test]
    fn test_round_trip_through_entries() {
        let tags = Tags::from_entries([("aze", "rty"), ("name", "x")]);
        let decoded = Tags::from_entries(tags.iter());
        assert_eq!(decoded, tags);
    }

    #[test]
    fn test_serde_object_round_trip() {
        let tags = Tags::from_entries([("amenity", "cafe"), ("name", "Chez \"Momo\"")]);
        let json = serde_json::to_value(&tags).unwrap();
        assert_eq!(json["amenity"], "cafe");
        let back: Tags = serde_json::from_value(json).unwrap();
        assert_eq!(back.get("name"), Some("Chez \"Momo\""));
    }
}
