//! Element fetch and write operations.

use http::Method;

use crate::client::documents::element_xml;
use crate::client::normalize::{element_from_doc, elements_from_doc};
use crate::client::utils::build_query_string;
use crate::client::OsmClient;
use crate::error::{OsmError, Result};
use crate::types::{Bounds, Element, ElementKind, ElementRef};

impl OsmClient {
    /// Fetch the current version of an element.
    pub async fn fetch_element(&self, reference: &ElementRef) -> Result<Element> {
        let doc = self
            .get_doc(&format!("{}/{}", reference.kind, reference.id))
            .await?;
        element_from_doc(&doc, reference.kind, Some(reference.id))
    }

    /// Fetch a specific historical version of an element.
    pub async fn fetch_element_at_version(
        &self,
        reference: &ElementRef,
        version: u64,
    ) -> Result<Element> {
        let doc = self
            .get_doc(&format!("{}/{}/{}", reference.kind, reference.id, version))
            .await?;
        element_from_doc(&doc, reference.kind, Some(reference.id))
    }

    /// Fetch several elements of one kind in a single request.
    pub async fn fetch_elements(&self, kind: ElementKind, ids: &[i64]) -> Result<Vec<Element>> {
        let list = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let query = build_query_string(&[(kind.plural(), list.as_str())]);
        let doc = self.get_doc(&format!("{}{}", kind.plural(), query)).await?;
        Ok(elements_from_doc(&doc)?.0)
    }

    /// Fetch every way that references the node.
    pub async fn fetch_ways_for_node(&self, node_id: i64) -> Result<Vec<Element>> {
        let doc = self.get_doc(&format!("node/{node_id}/ways")).await?;
        Ok(elements_from_doc(&doc)?.0)
    }

    /// Fetch every relation the element is a member of.
    pub async fn fetch_relations_for_element(
        &self,
        reference: &ElementRef,
    ) -> Result<Vec<Element>> {
        let doc = self
            .get_doc(&format!("{}/{}/relations", reference.kind, reference.id))
            .await?;
        Ok(elements_from_doc(&doc)?.0)
    }

    /// Fetch all elements inside a bounding box, plus the echoed bounds
    /// when the server includes them.
    pub async fn fetch_map_by_bbox(
        &self,
        bounds: &Bounds,
    ) -> Result<(Vec<Element>, Option<Bounds>)> {
        let bbox = bounds.to_bbox_string();
        let query = build_query_string(&[("bbox", bbox.as_str())]);
        let doc = self.get_doc(&format!("map{query}")).await?;
        elements_from_doc(&doc)
    }

    /// Create or update an element inside an open changeset.
    ///
    /// An element without an id is created (`PUT {kind}/create`, response
    /// body is the assigned id); one with an id is updated
    /// (`PUT {kind}/{id}`, response body is the new version). Returns a
    /// new element carrying the assigned identity; the input is left
    /// untouched.
    pub async fn send_element(&self, element: &Element, changeset_id: i64) -> Result<Element> {
        let body = element_xml(element, changeset_id)?;
        let mut next = element.clone();
        match element.id {
            None => {
                let text = self
                    .send_xml(
                        Method::PUT,
                        &format!("{}/create", element.kind()),
                        Some(body),
                    )
                    .await?;
                next.id = Some(parse_id_body(&text, "created element id")?);
                next.version = Some(1);
            }
            Some(id) => {
                let text = self
                    .send_xml(Method::PUT, &format!("{}/{}", element.kind(), id), Some(body))
                    .await?;
                next.version = Some(parse_version_body(&text, "updated element version")?);
            }
        }
        next.changeset = Some(changeset_id);
        Ok(next)
    }

    /// Delete an element inside an open changeset.
    ///
    /// Returns a new element marked invisible at the version the server
    /// assigned to the deletion.
    pub async fn delete_element(&self, element: &Element, changeset_id: i64) -> Result<Element> {
        let id = element.id.ok_or_else(|| {
            OsmError::InvalidRef("cannot delete an element that has no id".into())
        })?;
        let body = element_xml(element, changeset_id)?;
        let text = self
            .send_xml(
                Method::DELETE,
                &format!("{}/{}", element.kind(), id),
                Some(body),
            )
            .await?;
        let mut next = element.clone();
        next.visible = Some(false);
        next.version = Some(parse_version_body(&text, "deleted element version")?);
        next.changeset = Some(changeset_id);
        Ok(next)
    }
}

fn parse_id_body(text: &str, what: &str) -> Result<i64> {
    text.trim()
        .parse()
        .map_err(|_| OsmError::UnexpectedResponse(format!("{what} is not an integer: {text:?}")))
}

fn parse_version_body(text: &str, what: &str) -> Result<u64> {
    text.trim()
        .parse()
        .map_err(|_| OsmError::UnexpectedResponse(format!("{what} is not an integer: {text:?}")))
}
