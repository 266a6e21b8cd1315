//! XML document writer, the shape-wise inverse of the parser.

use serde_json::Value;

use crate::error::{OsmError, Result};
use crate::xml::parser::{ATTR_KEY, TEXT_KEY};

/// Serialize a JSON tree back to XML text.
///
/// Attribute and element structure is reproduced exactly; whitespace is
/// not. All text and attribute content is escaped, so
/// `parse_document(write_document(t)?) == t` holds for any tree whose
/// field names do not collide with the reserved slots.
pub fn write_document(tree: &Value) -> Result<String> {
    let root = tree
        .as_object()
        .ok_or_else(|| OsmError::InvalidDocument("document root must be an object".into()))?;
    let mut out = String::new();
    for (name, value) in root {
        write_entry(&mut out, name, value)?;
    }
    Ok(out)
}

fn write_entry(out: &mut String, name: &str, value: &Value) -> Result<()> {
    match value {
        Value::Array(items) => {
            for item in items {
                write_element(out, name, item)?;
            }
            Ok(())
        }
        other => write_element(out, name, other),
    }
}

fn write_element(out: &mut String, name: &str, value: &Value) -> Result<()> {
    match value {
        Value::Object(map) => {
            out.push('<');
            out.push_str(name);
            if let Some(attr_slot) = map.get(ATTR_KEY) {
                let attrs = attr_slot.as_object().ok_or_else(|| {
                    OsmError::InvalidDocument(format!("attribute slot of <{name}> must be an object"))
                })?;
                for (key, attr_value) in attrs {
                    let text = scalar_string(attr_value).ok_or_else(|| {
                        OsmError::InvalidDocument(format!(
                            "attribute {key} of <{name}> must be a scalar"
                        ))
                    })?;
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(&escape_xml(&text));
                    out.push('"');
                }
            }

            let children: Vec<(&String, &Value)> = map
                .iter()
                .filter(|(key, _)| key.as_str() != ATTR_KEY && key.as_str() != TEXT_KEY)
                .collect();
            let text = map.get(TEXT_KEY).and_then(Value::as_str);
            let has_children = children.iter().any(|(_, child)| match child {
                Value::Array(items) => !items.is_empty(),
                _ => true,
            });

            if !has_children && text.is_none() {
                out.push_str("/>");
                return Ok(());
            }
            out.push('>');
            if let Some(text) = text {
                out.push_str(&escape_xml(text));
            }
            for (child_name, child_value) in children {
                write_entry(out, child_name, child_value)?;
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
            Ok(())
        }
        Value::String(s) if s.is_empty() => {
            out.push('<');
            out.push_str(name);
            out.push_str("/>");
            Ok(())
        }
        Value::String(s) => {
            out.push('<');
            out.push_str(name);
            out.push('>');
            out.push_str(&escape_xml(s));
            out.push_str("</");
            out.push_str(name);
            out.push('>');
            Ok(())
        }
        Value::Null => {
            out.push('<');
            out.push_str(name);
            out.push_str("/>");
            Ok(())
        }
        Value::Number(_) | Value::Bool(_) => {
            let text = scalar_string(value).unwrap_or_default();
            out.push('<');
            out.push_str(name);
            out.push('>');
            out.push_str(&text);
            out.push_str("</");
            out.push_str(name);
            out.push('>');
            Ok(())
        }
        Value::Array(_) => Err(OsmError::InvalidDocument(format!(
            "field {name} holds a nested array"
        ))),
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Escape the five XML special characters.
#[must_use]
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}
