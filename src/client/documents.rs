//! Outbound XML document builders.

use serde_json::{Map, Value};

use crate::error::Result;
use crate::types::{Element, Geometry, Tags};
use crate::xml::{write_document, ATTR_KEY};

fn osm_document(entity: &str, body: Value) -> Result<String> {
    let mut root = Map::new();
    root.insert(entity.to_string(), Value::Array(vec![body]));
    let mut doc = Map::new();
    doc.insert("osm".to_string(), Value::Array(vec![Value::Object(root)]));
    write_document(&Value::Object(doc))
}

fn tag_entries(tags: &Tags) -> Value {
    let entries: Vec<Value> = tags
        .iter()
        .map(|(k, v)| {
            let mut attrs = Map::new();
            attrs.insert("k".to_string(), Value::String(k.to_string()));
            attrs.insert("v".to_string(), Value::String(v.to_string()));
            let mut entry = Map::new();
            entry.insert(ATTR_KEY.to_string(), Value::Object(attrs));
            Value::Object(entry)
        })
        .collect();
    Value::Array(entries)
}

/// Build the `<osm><changeset>...` document sent on changeset creation
/// and tag updates. `created_by` and `comment` come first; extra tags may
/// override either (last key wins).
pub(crate) fn changeset_xml(created_by: &str, comment: &str, extra_tags: &Tags) -> Result<String> {
    let mut tags = Tags::new();
    tags.insert("created_by", created_by);
    tags.insert("comment", comment);
    for (k, v) in extra_tags.iter() {
        tags.insert(k, v);
    }

    let mut changeset = Map::new();
    changeset.insert("tag".to_string(), tag_entries(&tags));
    osm_document("changeset", Value::Object(changeset))
}

/// Build the element document sent on create, update and delete.
pub(crate) fn element_xml(element: &Element, changeset_id: i64) -> Result<String> {
    let mut attrs = Map::new();
    if let Some(id) = element.id {
        attrs.insert("id".to_string(), Value::String(id.to_string()));
    }
    attrs.insert(
        "changeset".to_string(),
        Value::String(changeset_id.to_string()),
    );
    if let Some(version) = element.version {
        attrs.insert("version".to_string(), Value::String(version.to_string()));
    }
    if let Some(visible) = element.visible {
        attrs.insert("visible".to_string(), Value::String(visible.to_string()));
    }

    let mut body = Map::new();
    match &element.geometry {
        Geometry::Node { lat, lon } => {
            attrs.insert("lat".to_string(), Value::String(lat.to_string()));
            attrs.insert("lon".to_string(), Value::String(lon.to_string()));
        }
        Geometry::Way { nodes } => {
            let nds: Vec<Value> = nodes
                .iter()
                .map(|node| {
                    let mut nd_attrs = Map::new();
                    nd_attrs.insert("ref".to_string(), Value::String(node.id.to_string()));
                    let mut nd = Map::new();
                    nd.insert(ATTR_KEY.to_string(), Value::Object(nd_attrs));
                    Value::Object(nd)
                })
                .collect();
            body.insert("nd".to_string(), Value::Array(nds));
        }
        Geometry::Relation { members } => {
            let entries: Vec<Value> = members
                .iter()
                .map(|member| {
                    let mut member_attrs = Map::new();
                    member_attrs.insert(
                        "type".to_string(),
                        Value::String(member.kind.to_string()),
                    );
                    member_attrs.insert("ref".to_string(), Value::String(member.id.to_string()));
                    member_attrs.insert(
                        "role".to_string(),
                        Value::String(member.role.clone().unwrap_or_default()),
                    );
                    let mut entry = Map::new();
                    entry.insert(ATTR_KEY.to_string(), Value::Object(member_attrs));
                    Value::Object(entry)
                })
                .collect();
            body.insert("member".to_string(), Value::Array(entries));
        }
    }
    if !element.tags.is_empty() {
        body.insert("tag".to_string(), tag_entries(&element.tags));
    }
    body.insert(ATTR_KEY.to_string(), Value::Object(attrs));

    osm_document(element.kind().as_str(), Value::Object(body))
}
