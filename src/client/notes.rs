//! Note operations. Notes are read/append-only: comments accumulate and
//! are never edited or removed through this API.

use http::Method;

use crate::client::normalize::notes_from_doc;
use crate::client::utils::build_query_string;
use crate::client::OsmClient;
use crate::error::{OsmError, Result};
use crate::types::{Bounds, Note};
use crate::xml::parse_document;

impl OsmClient {
    /// Fetch the notes inside a bounding box.
    ///
    /// `limit` caps the result count; `closed_days` controls how long a
    /// closed note stays listed (0 excludes closed notes, negative keeps
    /// them forever), both server defaults when absent.
    pub async fn fetch_notes(
        &self,
        bounds: &Bounds,
        limit: Option<u32>,
        closed_days: Option<i64>,
    ) -> Result<Vec<Note>> {
        let bbox = bounds.to_bbox_string();
        let limit = limit.map(|limit| limit.to_string());
        let closed = closed_days.map(|days| days.to_string());
        let mut params = vec![("bbox", bbox.as_str())];
        if let Some(limit) = limit.as_deref() {
            params.push(("limit", limit));
        }
        if let Some(closed) = closed.as_deref() {
            params.push(("closed", closed));
        }
        let doc = self
            .get_doc(&format!("notes{}", build_query_string(&params)))
            .await?;
        notes_from_doc(&doc)
    }

    /// Search notes by free text.
    pub async fn search_notes(
        &self,
        query: &str,
        limit: Option<u32>,
        closed_days: Option<i64>,
    ) -> Result<Vec<Note>> {
        let limit = limit.map(|limit| limit.to_string());
        let closed = closed_days.map(|days| days.to_string());
        let mut params = vec![("q", query)];
        if let Some(limit) = limit.as_deref() {
            params.push(("limit", limit));
        }
        if let Some(closed) = closed.as_deref() {
            params.push(("closed", closed));
        }
        let doc = self
            .get_doc(&format!("notes/search{}", build_query_string(&params)))
            .await?;
        notes_from_doc(&doc)
    }

    /// Fetch a single note.
    pub async fn fetch_note(&self, id: i64) -> Result<Note> {
        let doc = self.get_doc(&format!("notes/{id}")).await?;
        notes_from_doc(&doc)?
            .into_iter()
            .next()
            .ok_or_else(|| OsmError::UnexpectedResponse(format!("response has no note {id}")))
    }

    /// Open a new note at a coordinate.
    pub async fn create_note(&self, lat: f64, lon: f64, text: &str) -> Result<Note> {
        let lat = lat.to_string();
        let lon = lon.to_string();
        let query = build_query_string(&[
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
            ("text", text),
        ]);
        let response = self
            .send_xml(Method::POST, &format!("notes{query}"), None)
            .await?;
        notes_from_doc(&parse_document(&response)?)
            .and_then(|notes| {
                notes.into_iter().next().ok_or_else(|| {
                    OsmError::UnexpectedResponse("note creation returned no note".into())
                })
            })
    }
}
