//! Map element model: nodes, ways, relations and their pure mutators.

use std::fmt;
use std::str::FromStr;

use chrono::{SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{OsmError, Result};
use crate::types::Tags;

static REF_KIND_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\w+)/").unwrap());
static REF_ID_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"/(-?\d+)$").unwrap());

/// The three element kinds of the OSM data model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Node,
    Way,
    Relation,
}

impl ElementKind {
    /// The wire name, used as XML tag and URL path segment.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Node => "node",
            ElementKind::Way => "way",
            ElementKind::Relation => "relation",
        }
    }

    /// The plural form used by the multi-fetch endpoints.
    #[inline]
    #[must_use]
    pub fn plural(&self) -> &'static str {
        match self {
            ElementKind::Node => "nodes",
            ElementKind::Way => "ways",
            ElementKind::Relation => "relations",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementKind {
    type Err = OsmError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "node" => Ok(ElementKind::Node),
            "way" => Ok(ElementKind::Way),
            "relation" => Ok(ElementKind::Relation),
            other => Err(OsmError::InvalidRef(format!(
                "unknown element kind: {other}"
            ))),
        }
    }
}

/// A `(kind, id)` reference to an element.
///
/// The canonical interchange form is the `"kind/id"` string, e.g.
/// `"node/12345"`. Negative ids refer to local-only elements that have not
/// been created remotely yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    pub kind: ElementKind,
    pub id: i64,
}

impl ElementRef {
    #[inline]
    #[must_use]
    pub fn new(kind: ElementKind, id: i64) -> Self {
        ElementRef { kind, id }
    }

    #[inline]
    #[must_use]
    pub fn node(id: i64) -> Self {
        ElementRef::new(ElementKind::Node, id)
    }

    #[inline]
    #[must_use]
    pub fn way(id: i64) -> Self {
        ElementRef::new(ElementKind::Way, id)
    }

    #[inline]
    #[must_use]
    pub fn relation(id: i64) -> Self {
        ElementRef::new(ElementKind::Relation, id)
    }

    #[inline]
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.id < 0
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

impl FromStr for ElementRef {
    type Err = OsmError;

    /// Parse a `"kind/id"` reference: the kind is the leading word up to
    /// the first `/`, the id is the trailing digit run (optionally
    /// preceded by `-`).
    fn from_str(s: &str) -> Result<Self> {
        let kind = REF_KIND_REGEX
            .captures(s)
            .and_then(|c| c.get(1))
            .ok_or_else(|| OsmError::InvalidRef(s.to_string()))?
            .as_str()
            .parse::<ElementKind>()
            .map_err(|_| OsmError::InvalidRef(s.to_string()))?;
        let id = REF_ID_REGEX
            .captures(s)
            .and_then(|c| c.get(1))
            .ok_or_else(|| OsmError::InvalidRef(s.to_string()))?
            .as_str()
            .parse::<i64>()
            .map_err(|_| OsmError::InvalidRef(s.to_string()))?;
        Ok(ElementRef { kind, id })
    }
}

/// A relation member: an element reference annotated with a free-text role.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub kind: ElementKind,
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Member {
    #[must_use]
    pub fn new(kind: ElementKind, id: i64) -> Self {
        Member {
            kind,
            id,
            role: None,
        }
    }

    #[must_use]
    pub fn from_ref(reference: ElementRef, role: Option<String>) -> Self {
        Member {
            kind: reference.kind,
            id: reference.id,
            role,
        }
    }

    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn element_ref(&self) -> ElementRef {
        ElementRef::new(self.kind, self.id)
    }
}

/// The kind-specific payload of an element.
///
/// A tagged union instead of property lookup by kind string: every
/// kind-guarded operation matches exhaustively, so the wrong shape can
/// never be accessed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Geometry {
    Node {
        lat: f64,
        lon: f64,
    },
    /// Ordered node references; order defines the path and duplicates are
    /// allowed (closed loops repeat their first node).
    Way {
        nodes: Vec<ElementRef>,
    },
    Relation {
        members: Vec<Member>,
    },
}

impl Geometry {
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self {
            Geometry::Node { .. } => ElementKind::Node,
            Geometry::Way { .. } => ElementKind::Way,
            Geometry::Relation { .. } => ElementKind::Relation,
        }
    }
}

/// A single editable map object.
///
/// An absent id means the element has not been created remotely. All
/// mutators return a brand-new element and leave the receiver untouched;
/// there is no way to modify an `Element` in place through this API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changeset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub geometry: Geometry,
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
}

impl Element {
    fn with_geometry(geometry: Geometry) -> Self {
        Element {
            id: None,
            visible: None,
            version: None,
            changeset: None,
            user: None,
            uid: None,
            timestamp: None,
            geometry,
            tags: Tags::new(),
        }
    }

    /// Create a local node. Coordinates are passed through unvalidated;
    /// range checking is a caller concern.
    #[must_use]
    pub fn node(lat: f64, lon: f64) -> Self {
        Element::with_geometry(Geometry::Node { lat, lon })
    }

    /// Create a local way from ordered node references.
    #[must_use]
    pub fn way(nodes: Vec<ElementRef>) -> Self {
        Element::with_geometry(Geometry::Way { nodes })
    }

    /// Create a local relation from ordered members.
    #[must_use]
    pub fn relation(members: Vec<Member>) -> Self {
        Element::with_geometry(Geometry::Relation { members })
    }

    #[must_use]
    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    #[must_use]
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.geometry.kind()
    }

    /// The `(kind, id)` reference of this element, if it has an id.
    #[must_use]
    pub fn element_ref(&self) -> Option<ElementRef> {
        self.id.map(|id| ElementRef::new(self.kind(), id))
    }

    /// The element's tag set. Always total: an element without tags has an
    /// empty set.
    #[inline]
    #[must_use]
    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// Return a copy with the tag set.
    #[must_use]
    pub fn set_tag(&self, key: impl Into<String>, value: impl ToString) -> Element {
        let mut next = self.clone();
        next.tags.insert(key, value);
        next
    }

    /// Return a copy with every given tag set, in call order.
    #[must_use]
    pub fn set_tags<K, V, I>(&self, entries: I) -> Element
    where
        K: Into<String>,
        V: ToString,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut next = self.clone();
        next.tags.extend(entries);
        next
    }

    /// Return a copy without the tag. Removing an absent key yields an
    /// equivalent copy, not an error.
    #[must_use]
    pub fn remove_tag(&self, key: &str) -> Element {
        let mut next = self.clone();
        next.tags.remove(key);
        next
    }

    /// Return a copy whose tag set is replaced entirely.
    #[must_use]
    pub fn replace_tags(&self, tags: Tags) -> Element {
        let mut next = self.clone();
        next.tags = tags;
        next
    }

    /// The node's coordinates, if this is a node.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match self.geometry {
            Geometry::Node { lat, lon } => Some((lat, lon)),
            _ => None,
        }
    }

    /// Return a copy with new coordinates. Only valid for nodes.
    pub fn set_coordinates(&self, lat: f64, lon: f64) -> Result<Element> {
        match self.geometry {
            Geometry::Node { .. } => {
                let mut next = self.clone();
                next.geometry = Geometry::Node { lat, lon };
                Ok(next)
            }
            _ => Err(OsmError::KindMismatch {
                operation: "set_coordinates",
                expected: ElementKind::Node,
                actual: self.kind(),
            }),
        }
    }

    /// The way's ordered node references. Only valid for ways.
    pub fn node_refs(&self) -> Result<&[ElementRef]> {
        match &self.geometry {
            Geometry::Way { nodes } => Ok(nodes),
            _ => Err(OsmError::KindMismatch {
                operation: "node_refs",
                expected: ElementKind::Way,
                actual: self.kind(),
            }),
        }
    }

    /// Return a copy with a replaced node-reference sequence. Only valid
    /// for ways.
    pub fn set_node_refs(&self, nodes: Vec<ElementRef>) -> Result<Element> {
        match self.geometry {
            Geometry::Way { .. } => {
                let mut next = self.clone();
                next.geometry = Geometry::Way { nodes };
                Ok(next)
            }
            _ => Err(OsmError::KindMismatch {
                operation: "set_node_refs",
                expected: ElementKind::Way,
                actual: self.kind(),
            }),
        }
    }

    /// The relation's ordered members. Only valid for relations.
    pub fn members(&self) -> Result<&[Member]> {
        match &self.geometry {
            Geometry::Relation { members } => Ok(members),
            _ => Err(OsmError::KindMismatch {
                operation: "members",
                expected: ElementKind::Relation,
                actual: self.kind(),
            }),
        }
    }

    /// Return a copy with a replaced member sequence. Only valid for
    /// relations.
    pub fn set_members(&self, members: Vec<Member>) -> Result<Element> {
        match self.geometry {
            Geometry::Relation { .. } => {
                let mut next = self.clone();
                next.geometry = Geometry::Relation { members };
                Ok(next)
            }
            _ => Err(OsmError::KindMismatch {
                operation: "set_members",
                expected: ElementKind::Relation,
                actual: self.kind(),
            }),
        }
    }

    /// Return a copy with the given version. No monotonicity check is
    /// performed locally; the remote service is the authority.
    #[must_use]
    pub fn set_version(&self, version: u64) -> Element {
        let mut next = self.clone();
        next.version = Some(version);
        next
    }

    /// Return a copy with the version bumped by one. An absent version
    /// reads as 0.
    #[must_use]
    pub fn increment_version(&self) -> Element {
        let mut next = self.clone();
        next.version = Some(self.version.unwrap_or(0) + 1);
        next
    }

    /// Return a copy stamped with the current instant, ISO-8601 with
    /// millisecond precision and a trailing `Z`.
    #[must_use]
    pub fn set_timestamp_to_now(&self) -> Element {
        let mut next = self.clone();
        next.timestamp = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_sets_no_identity() {
        let node = Element::node(1.234, -0.456).set_tag("aze", "rty");
        let updated = node.set_tag("aze", "updated");
        assert_eq!(updated.tags().get("aze"), Some("updated"));
        assert_eq!(updated.tags().len(), 1);
        assert_eq!(updated.id, None);
        assert_eq!(updated.version, None);
    }

    #[test]
    fn test_mutators_never_touch_receiver() {
        let original = Element::node(48.85, 2.35).set_tag("name", "before");
        let copy = original.clone();

        let _ = original.set_tag("name", "after");
        let _ = original.remove_tag("name");
        let _ = original.set_coordinates(0.0, 0.0).unwrap();
        let _ = original.set_version(9);
        let _ = original.increment_version();
        let _ = original.set_timestamp_to_now();

        assert_eq!(original, copy);
    }

    #[test]
    fn test_merge_precedence() {
        let element = Element::node(0.0, 0.0)
            .set_tags([("a", "1")])
            .set_tags([("a", "2")]);
        assert_eq!(element.tags().get("a"), Some("2"));
        assert_eq!(element.tags().len(), 1);
    }

    #[test]
    fn test_remove_tag_is_idempotent() {
        let element = Element::node(0.0, 0.0).set_tags([("a", "1"), ("b", "2")]);
        let once = element.remove_tag("a");
        let twice = once.remove_tag("a");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_set_coordinates_on_way_is_kind_mismatch() {
        let way = Element::way(vec![ElementRef::node(1), ElementRef::node(2)]);
        match way.set_coordinates(1.0, 2.0) {
            Err(OsmError::KindMismatch {
                expected, actual, ..
            }) => {
                assert_eq!(expected, ElementKind::Node);
                assert_eq!(actual, ElementKind::Way);
            }
            other => panic!("expected KindMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_set_node_refs_on_node_is_kind_mismatch() {
        let node = Element::node(1.0, 2.0);
        assert!(matches!(
            node.set_node_refs(vec![ElementRef::node(1)]),
            Err(OsmError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_way_allows_duplicate_refs() {
        let loop_way = Element::way(vec![
            ElementRef::node(1),
            ElementRef::node(2),
            ElementRef::node(1),
        ]);
        assert_eq!(loop_way.node_refs().unwrap().len(), 3);
    }

    #[test]
    fn test_increment_version_from_absent() {
        let element = Element::node(0.0, 0.0);
        assert_eq!(element.increment_version().version, Some(1));
        assert_eq!(element.set_version(6).increment_version().version, Some(7));
    }

    #[test]
    fn test_out_of_range_coordinates_pass_through() {
        let element = Element::node(1234.5, -999.0);
        assert_eq!(element.coordinates(), Some((1234.5, -999.0)));
    }

    #[test]
    fn test_ref_parsing() {
        let r: ElementRef = "node/12345".parse().unwrap();
        assert_eq!(r, ElementRef::node(12345));
        assert_eq!(r.to_string(), "node/12345");

        let local: ElementRef = "way/-7".parse().unwrap();
        assert_eq!(local.id, -7);
        assert!(local.is_local());

        assert!("teapot/1".parse::<ElementRef>().is_err());
        assert!("node/abc".parse::<ElementRef>().is_err());
        assert!("node".parse::<ElementRef>().is_err());
    }

    #[test]
    fn test_timestamp_shape() {
        let element = Element::node(0.0, 0.0).set_timestamp_to_now();
        let stamp = element.timestamp.unwrap();
        assert!(stamp.ends_with('Z'));
        // 2026-08-05T12:34:56.789Z
        assert_eq!(stamp.len(), 24);
        assert_eq!(&stamp[4..5], "-");
        assert_eq!(&stamp[10..11], "T");
        assert_eq!(&stamp[19..20], ".");
    }

    #[test]
    fn test_relation_members_keep_order_and_roles() {
        let relation = Element::relation(vec![
            Member::new(ElementKind::Node, 1).with_role("stop"),
            Member::new(ElementKind::Way, 2),
        ]);
        let members = relation.members().unwrap();
        assert_eq!(members[0].role.as_deref(), Some("stop"));
        assert_eq!(members[1].role, None);
        assert_eq!(members[1].element_ref().to_string(), "way/2");
    }
}
