//! Response normalizers: parsed XML trees to the typed models.
//!
//! Each function is pure. Numeric and boolean attribute strings are
//! parsed here and nowhere else; a field the entity shape requires that
//! is missing or unparseable surfaces as
//! [`OsmError::UnexpectedResponse`].

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::{OsmError, Result};
use crate::types::{
    Bounds, Changeset, Element, ElementKind, ElementRef, Geometry, Member, Note, NoteComment,
    Tags, UserInfo,
};
use crate::xml::{flatten, ATTR_KEY};

fn unexpected(message: impl Into<String>) -> OsmError {
    OsmError::UnexpectedResponse(message.into())
}

fn parse_i64(raw: &str, what: &str) -> Result<i64> {
    raw.parse()
        .map_err(|_| unexpected(format!("{what} is not an integer: {raw:?}")))
}

fn parse_u64(raw: &str, what: &str) -> Result<u64> {
    raw.parse()
        .map_err(|_| unexpected(format!("{what} is not an integer: {raw:?}")))
}

fn parse_f64(raw: &str, what: &str) -> Result<f64> {
    raw.parse()
        .map_err(|_| unexpected(format!("{what} is not a number: {raw:?}")))
}

/// The first `name` entity under the `<osm>` root.
fn doc_entity<'a>(doc: &'a Value, name: &str) -> Option<&'a Value> {
    doc.get("osm")?.get(0)?.get(name)?.get(0)
}

fn tags_from_field(field: Option<&Value>) -> Result<Tags> {
    let mut entries = Vec::new();
    if let Some(items) = field.and_then(Value::as_array) {
        for item in items {
            let attrs = item
                .get(ATTR_KEY)
                .and_then(Value::as_object)
                .ok_or_else(|| unexpected("tag record without attributes"))?;
            let k = attrs
                .get("k")
                .and_then(Value::as_str)
                .ok_or_else(|| unexpected("tag record without k"))?;
            let v = attrs
                .get("v")
                .and_then(Value::as_str)
                .ok_or_else(|| unexpected("tag record without v"))?;
            entries.push((k, v));
        }
    }
    Ok(Tags::from_entries(entries))
}

/// Normalize one wrapped element value.
///
/// The `(kind, id)` identity comes from the request context when the
/// payload omits it, which is the case for freshly created elements.
pub fn element_from_value(
    kind: ElementKind,
    value: &Value,
    fallback_id: Option<i64>,
) -> Result<Element> {
    let obj = value
        .as_object()
        .ok_or_else(|| unexpected(format!("{kind} is not an object")))?;
    let attrs = obj.get(ATTR_KEY).and_then(Value::as_object);
    let attr = |name: &str| attrs.and_then(|a| a.get(name)).and_then(Value::as_str);

    let id = match attr("id") {
        Some(raw) => Some(parse_i64(raw, "element id")?),
        None => fallback_id,
    };
    let version = match attr("version") {
        Some(raw) => Some(parse_u64(raw, "element version")?),
        None => None,
    };
    let changeset = match attr("changeset") {
        Some(raw) => Some(parse_i64(raw, "element changeset")?),
        None => None,
    };
    let uid = match attr("uid") {
        Some(raw) => Some(parse_i64(raw, "element uid")?),
        None => None,
    };

    let geometry = match kind {
        ElementKind::Node => Geometry::Node {
            lat: parse_f64(
                attr("lat").ok_or_else(|| unexpected("node without lat"))?,
                "node lat",
            )?,
            lon: parse_f64(
                attr("lon").ok_or_else(|| unexpected("node without lon"))?,
                "node lon",
            )?,
        },
        ElementKind::Way => {
            let mut nodes = Vec::new();
            if let Some(items) = obj.get("nd").and_then(Value::as_array) {
                for item in items {
                    let node_ref = item
                        .get(ATTR_KEY)
                        .and_then(|a| a.get("ref"))
                        .and_then(Value::as_str)
                        .ok_or_else(|| unexpected("nd record without ref"))?;
                    nodes.push(ElementRef::node(parse_i64(node_ref, "nd ref")?));
                }
            }
            Geometry::Way { nodes }
        }
        ElementKind::Relation => {
            let mut members = Vec::new();
            if let Some(items) = obj.get("member").and_then(Value::as_array) {
                for item in items {
                    let member_attrs = item
                        .get(ATTR_KEY)
                        .and_then(Value::as_object)
                        .ok_or_else(|| unexpected("member record without attributes"))?;
                    let member_kind = member_attrs
                        .get("type")
                        .and_then(Value::as_str)
                        .ok_or_else(|| unexpected("member record without type"))?
                        .parse::<ElementKind>()
                        .map_err(|_| unexpected("member record with unknown type"))?;
                    let member_id = parse_i64(
                        member_attrs
                            .get("ref")
                            .and_then(Value::as_str)
                            .ok_or_else(|| unexpected("member record without ref"))?,
                        "member ref",
                    )?;
                    let role = member_attrs
                        .get("role")
                        .and_then(Value::as_str)
                        .filter(|role| !role.is_empty())
                        .map(str::to_string);
                    members.push(Member {
                        kind: member_kind,
                        id: member_id,
                        role,
                    });
                }
            }
            Geometry::Relation { members }
        }
    };

    Ok(Element {
        id,
        visible: attr("visible").map(|v| v == "true"),
        version,
        changeset,
        user: attr("user").map(str::to_string),
        uid,
        timestamp: attr("timestamp").map(str::to_string),
        geometry,
        tags: tags_from_field(obj.get("tag"))?,
    })
}

/// Normalize a single-element fetch response.
pub fn element_from_doc(
    doc: &Value,
    kind: ElementKind,
    fallback_id: Option<i64>,
) -> Result<Element> {
    let value = doc_entity(doc, kind.as_str())
        .ok_or_else(|| unexpected(format!("response has no {kind} element")))?;
    element_from_value(kind, value, fallback_id)
}

/// Normalize a collection response (multi-fetch, ways-for-node,
/// relations-for-element, map-by-bbox).
///
/// The source XML groups elements only by tag name; every returned
/// element carries its own kind and id. The bounds record is kept when
/// the source included one and dropped otherwise.
pub fn elements_from_doc(doc: &Value) -> Result<(Vec<Element>, Option<Bounds>)> {
    let root = doc
        .get("osm")
        .and_then(|v| v.get(0))
        .ok_or_else(|| unexpected("response has no osm root"))?;

    let mut elements = Vec::new();
    for kind in [ElementKind::Node, ElementKind::Way, ElementKind::Relation] {
        if let Some(items) = root.get(kind.as_str()).and_then(Value::as_array) {
            for item in items {
                elements.push(element_from_value(kind, item, None)?);
            }
        }
    }

    let bounds = root
        .get("bounds")
        .and_then(|v| v.get(0))
        .map(bounds_from_value)
        .transpose()?;
    Ok((elements, bounds))
}

fn bounds_from_value(value: &Value) -> Result<Bounds> {
    let attrs = value
        .get(ATTR_KEY)
        .and_then(Value::as_object)
        .ok_or_else(|| unexpected("bounds without attributes"))?;
    let coord = |name: &str| -> Result<f64> {
        parse_f64(
            attrs
                .get(name)
                .and_then(Value::as_str)
                .ok_or_else(|| unexpected(format!("bounds without {name}")))?,
            name,
        )
    };
    Ok(Bounds::new(
        coord("minlat")?,
        coord("minlon")?,
        coord("maxlat")?,
        coord("maxlon")?,
    ))
}

/// Normalize a changeset fetch/update response.
///
/// This is the only changeset normalization path; the openness check goes
/// through it as well, via [`changeset_is_open`].
pub fn changeset_from_doc(doc: &Value) -> Result<Changeset> {
    let value =
        doc_entity(doc, "changeset").ok_or_else(|| unexpected("response has no changeset"))?;
    let obj = value
        .as_object()
        .ok_or_else(|| unexpected("changeset is not an object"))?;
    let attrs = obj
        .get(ATTR_KEY)
        .and_then(Value::as_object)
        .ok_or_else(|| unexpected("changeset without attributes"))?;
    let attr = |name: &str| attrs.get(name).and_then(Value::as_str);

    let id = parse_i64(
        attr("id").ok_or_else(|| unexpected("changeset without id"))?,
        "changeset id",
    )?;
    let open = match attr("open") {
        Some("true") => true,
        Some("false") => false,
        other => return Err(unexpected(format!("changeset open flag is {other:?}"))),
    };
    let bounds = match (
        attr("min_lat"),
        attr("min_lon"),
        attr("max_lat"),
        attr("max_lon"),
    ) {
        (Some(min_lat), Some(min_lon), Some(max_lat), Some(max_lon)) => Some(Bounds::new(
            parse_f64(min_lat, "changeset min_lat")?,
            parse_f64(min_lon, "changeset min_lon")?,
            parse_f64(max_lat, "changeset max_lat")?,
            parse_f64(max_lon, "changeset max_lon")?,
        )),
        _ => None,
    };
    let comments_count = match attr("comments_count") {
        Some(raw) => parse_u64(raw, "changeset comments_count")?,
        None => 0,
    };
    let changes_count = match attr("changes_count") {
        Some(raw) => parse_u64(raw, "changeset changes_count")?,
        None => 0,
    };
    let uid = match attr("uid") {
        Some(raw) => Some(parse_i64(raw, "changeset uid")?),
        None => None,
    };

    Ok(Changeset {
        id,
        open,
        created_at: attr("created_at").map(str::to_string),
        closed_at: attr("closed_at").map(str::to_string),
        user: attr("user").map(str::to_string),
        uid,
        bounds,
        comments_count,
        changes_count,
        tags: tags_from_field(obj.get("tag"))?,
    })
}

/// Whether a fetched changeset document says the changeset is open.
///
/// Other agents may close a changeset at any time, and a partial fetch
/// may yield a mangled body; any shape that does not positively say
/// `open="true"` reads as closed.
#[must_use]
pub fn changeset_is_open(doc: &Value) -> bool {
    changeset_from_doc(doc).map(|changeset| changeset.open).unwrap_or(false)
}

fn comment_from_value(value: &Value) -> Result<NoteComment> {
    let flat = flatten(value);
    let obj = flat
        .as_object()
        .ok_or_else(|| unexpected("note comment is not an object"))?;
    let field = |name: &str| obj.get(name).and_then(Value::as_str);

    Ok(NoteComment {
        date: field("date")
            .ok_or_else(|| unexpected("note comment without date"))?
            .to_string(),
        action: field("action")
            .ok_or_else(|| unexpected("note comment without action"))?
            .parse()?,
        text: field("text").map(str::to_string),
        html: field("html").map(str::to_string),
        user: field("user").map(str::to_string),
        uid: match field("uid") {
            Some(raw) => Some(parse_i64(raw, "note comment uid")?),
            None => None,
        },
    })
}

/// Normalize one wrapped note value: the note flattens, and so does each
/// embedded comment.
pub fn note_from_value(value: &Value) -> Result<Note> {
    let flat = flatten(value);
    let obj = flat
        .as_object()
        .ok_or_else(|| unexpected("note is not an object"))?;
    let field = |name: &str| obj.get(name).and_then(Value::as_str);

    let mut comments = Vec::new();
    if let Some(container) = obj.get("comments").and_then(Value::as_object) {
        if let Some(items) = container.get("comment").and_then(Value::as_array) {
            for item in items {
                comments.push(comment_from_value(item)?);
            }
        }
    }

    Ok(Note {
        id: parse_i64(
            field("id").ok_or_else(|| unexpected("note without id"))?,
            "note id",
        )?,
        lat: parse_f64(
            field("lat").ok_or_else(|| unexpected("note without lat"))?,
            "note lat",
        )?,
        lon: parse_f64(
            field("lon").ok_or_else(|| unexpected("note without lon"))?,
            "note lon",
        )?,
        url: field("url").map(str::to_string),
        status: field("status")
            .ok_or_else(|| unexpected("note without status"))?
            .parse()?,
        date_created: field("date_created").map(str::to_string),
        date_closed: field("date_closed").map(str::to_string),
        comments,
    })
}

/// Normalize a note list response.
pub fn notes_from_doc(doc: &Value) -> Result<Vec<Note>> {
    let root = doc
        .get("osm")
        .and_then(|v| v.get(0))
        .ok_or_else(|| unexpected("response has no osm root"))?;
    let mut notes = Vec::new();
    if let Some(items) = root.get("note").and_then(Value::as_array) {
        for item in items {
            notes.push(note_from_value(item)?);
        }
    }
    Ok(notes)
}

fn counter_block(obj: &Map<String, Value>, name: &str) -> Result<u64> {
    match obj.get(name).map(flatten) {
        Some(block) => count_field(&block, "count"),
        None => Ok(0),
    }
}

fn count_field(block: &Value, name: &str) -> Result<u64> {
    match block.get(name).and_then(Value::as_str) {
        Some(raw) => parse_u64(raw, name),
        None => Ok(0),
    }
}

/// Normalize a user fetch response, flattening the nested
/// single-occurrence blocks (counters, block records, contributor-terms).
pub fn user_from_doc(doc: &Value) -> Result<UserInfo> {
    let value = doc_entity(doc, "user").ok_or_else(|| unexpected("response has no user"))?;
    let flat = flatten(value);
    let obj = flat
        .as_object()
        .ok_or_else(|| unexpected("user is not an object"))?;
    let field = |name: &str| obj.get(name).and_then(Value::as_str);

    let (blocks_received, blocks_active) = match obj.get("blocks").map(flatten) {
        Some(blocks) => match blocks.get("received").map(flatten) {
            Some(received) => (
                count_field(&received, "count")?,
                count_field(&received, "active")?,
            ),
            None => (0, 0),
        },
        None => (0, 0),
    };

    Ok(UserInfo {
        id: parse_i64(
            field("id").ok_or_else(|| unexpected("user without id"))?,
            "user id",
        )?,
        display_name: field("display_name")
            .ok_or_else(|| unexpected("user without display_name"))?
            .to_string(),
        account_created: field("account_created").unwrap_or_default().to_string(),
        description: field("description")
            .filter(|description| !description.is_empty())
            .map(str::to_string),
        image_url: obj
            .get("img")
            .map(flatten)
            .and_then(|img| img.get("href").and_then(Value::as_str).map(str::to_string)),
        contributor_terms_agreed: obj.get("contributor-terms").map(flatten).and_then(|terms| {
            terms
                .get("agreed")
                .and_then(Value::as_str)
                .map(|agreed| agreed == "true")
        }),
        changesets_count: counter_block(obj, "changesets")?,
        traces_count: counter_block(obj, "traces")?,
        blocks_received,
        blocks_active,
    })
}

/// Normalize the full preference set.
pub fn preferences_from_doc(doc: &Value) -> Result<BTreeMap<String, String>> {
    let container =
        doc_entity(doc, "preferences").ok_or_else(|| unexpected("response has no preferences"))?;
    let mut preferences = BTreeMap::new();
    if let Some(items) = container.get("preference").and_then(Value::as_array) {
        for item in items {
            let attrs = item
                .get(ATTR_KEY)
                .and_then(Value::as_object)
                .ok_or_else(|| unexpected("preference without attributes"))?;
            let k = attrs
                .get("k")
                .and_then(Value::as_str)
                .ok_or_else(|| unexpected("preference without k"))?;
            let v = attrs
                .get("v")
                .and_then(Value::as_str)
                .ok_or_else(|| unexpected("preference without v"))?;
            preferences.insert(k.to_string(), v.to_string());
        }
    }
    Ok(preferences)
}
