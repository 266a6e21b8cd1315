//! Changeset lifecycle operations.
//!
//! The state machine is created → open-with-updated-tags → closed, and
//! closed is terminal. None of these operations retries or suppresses a
//! remote error: closing an already-closed changeset, or updating tags on
//! one, propagates the server's rejection.

use http::Method;

use crate::client::documents::changeset_xml;
use crate::client::normalize::{changeset_from_doc, changeset_is_open};
use crate::client::OsmClient;
use crate::error::{OsmError, Result};
use crate::types::{Changeset, Tags};
use crate::xml::parse_document;

impl OsmClient {
    /// Open a changeset and return its server-assigned id.
    pub async fn create_changeset(
        &self,
        created_by: &str,
        comment: &str,
        extra_tags: &Tags,
    ) -> Result<i64> {
        let body = changeset_xml(created_by, comment, extra_tags)?;
        let text = self
            .send_xml(Method::PUT, "changeset/create", Some(body))
            .await?;
        let id = text.trim().parse::<i64>().map_err(|_| {
            OsmError::UnexpectedResponse(format!("changeset id is not an integer: {text:?}"))
        })?;
        tracing::info!(changeset = id, "opened changeset");
        Ok(id)
    }

    /// Fetch a changeset's current remote state.
    pub async fn fetch_changeset(&self, id: i64) -> Result<Changeset> {
        let doc = self.get_doc(&format!("changeset/{id}")).await?;
        changeset_from_doc(&doc)
    }

    /// Check that a changeset is still open, re-fetching remote state.
    ///
    /// Local knowledge is never trusted here: another agent may have
    /// closed the changeset since it was opened. Resolves with the id
    /// when it is open; rejects with
    /// [`OsmError::ChangesetClosed`] when it is closed or the body shape
    /// is unexpected, and with the transport error when the fetch fails.
    /// Every rejection means "do not upload into this changeset".
    pub async fn is_changeset_still_open(&self, id: i64) -> Result<i64> {
        let text = self.get_auth_text(&format!("changeset/{id}")).await?;
        match parse_document(&text) {
            Ok(doc) if changeset_is_open(&doc) => Ok(id),
            _ => Err(OsmError::ChangesetClosed(id)),
        }
    }

    /// Replace a changeset's tag set. Only valid while it is open; the
    /// server's 4xx rejection propagates otherwise.
    pub async fn update_changeset_tags(
        &self,
        id: i64,
        created_by: &str,
        comment: &str,
        extra_tags: &Tags,
    ) -> Result<Changeset> {
        let body = changeset_xml(created_by, comment, extra_tags)?;
        let text = self
            .send_xml(Method::PUT, &format!("changeset/{id}"), Some(body))
            .await?;
        changeset_from_doc(&parse_document(&text)?)
    }

    /// Close a changeset. Terminal: closing one that is already closed is
    /// a remote-reported error, not locally suppressed.
    pub async fn close_changeset(&self, id: i64) -> Result<()> {
        self.send_xml(Method::PUT, &format!("changeset/{id}/close"), None)
            .await?;
        tracing::info!(changeset = id, "closed changeset");
        Ok(())
    }

    /// Submit a pre-built diff document for the changeset. Passthrough:
    /// the document is not parsed locally, and neither is the response.
    pub async fn upload_changeset(&self, id: i64, change_document: &str) -> Result<String> {
        self.send_xml(
            Method::POST,
            &format!("changeset/{id}/upload"),
            Some(change_document.to_string()),
        )
        .await
    }
}
