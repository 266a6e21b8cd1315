//! Flattened view of the attribute-wrapped JSON tree.

use serde_json::{Map, Value};

use crate::xml::parser::ATTR_KEY;

/// Collapse a converted node into a flat record.
///
/// Attributes move from the `"$"` slot to the top level, any
/// single-element list field is unwrapped to its sole member, and fields
/// that are null or empty lists are dropped. The transformation is
/// shallow: nested nodes keep their wrapped shape until a normalizer
/// flattens them in turn. Non-object input is returned unchanged.
#[must_use]
pub fn flatten(node: &Value) -> Value {
    let Some(map) = node.as_object() else {
        return node.clone();
    };
    let mut out = Map::new();
    if let Some(Value::Object(attrs)) = map.get(ATTR_KEY) {
        for (key, value) in attrs {
            out.insert(key.clone(), value.clone());
        }
    }
    for (key, value) in map {
        if key == ATTR_KEY {
            continue;
        }
        match value {
            Value::Null => {}
            Value::Array(items) if items.is_empty() => {}
            Value::Array(items) if items.len() == 1 => {
                out.insert(key.clone(), items[0].clone());
            }
            other => {
                out.insert(key.clone(), other.clone());
            }
        }
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attributes_merge_to_top_level() {
        let node = json!({"$": {"lon": "0.18", "lat": "44.48"}, "id": ["1270165"]});
        let flat = flatten(&node);
        assert_eq!(flat, json!({"lon": "0.18", "lat": "44.48", "id": "1270165"}));
    }

    #[test]
    fn test_single_element_lists_unwrap() {
        let node = json!({"status": ["closed"], "comments": [{"comment": [{"date": ["d"]}]}]});
        let flat = flatten(&node);
        assert_eq!(flat["status"], "closed");
        // Shallow: the unwrapped member keeps its own wrapped fields.
        assert_eq!(flat["comments"]["comment"][0]["date"][0], "d");
    }

    #[test]
    fn test_empty_and_null_fields_drop() {
        let node = json!({"roles": [], "home": null, "id": ["7"]});
        let flat = flatten(&node);
        assert_eq!(flat, json!({"id": "7"}));
    }

    #[test]
    fn test_multi_element_lists_are_kept() {
        let node = json!({"nd": [{"$": {"ref": "1"}}, {"$": {"ref": "2"}}]});
        let flat = flatten(&node);
        assert_eq!(flat["nd"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_non_object_passes_through() {
        assert_eq!(flatten(&json!("closed")), json!("closed"));
    }
}
