//! Changeset and bounding-box models.

use serde::{Deserialize, Serialize};

use crate::types::Tags;

/// A geographic bounding box, `min_*`/`max_*` in WGS84 degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl Bounds {
    #[must_use]
    pub fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Bounds {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }
    }

    /// The `left,bottom,right,top` form the bbox query parameters expect.
    #[must_use]
    pub fn to_bbox_string(&self) -> String {
        format!(
            "{},{},{},{}",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

/// One authenticated session of related edits.
///
/// Bounds and the two counters are server-assigned and read-only from this
/// crate's perspective. The `open` flag reflects remote state as of the
/// last fetch; other agents may close a changeset at any time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Changeset {
    pub id: i64,
    pub open: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    pub comments_count: u64,
    pub changes_count: u64,
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_string_is_left_bottom_right_top() {
        let bounds = Bounds::new(44.0, -0.5, 44.5, 0.25);
        assert_eq!(bounds.to_bbox_string(), "-0.5,44,0.25,44.5");
    }
}
