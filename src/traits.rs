//! Transport abstraction for the OSM API.

use async_trait::async_trait;
use http::Method;

use crate::error::Result;

/// The network seam consumed by [`OsmClient`](crate::client::OsmClient).
///
/// Implementations resolve with the response body as text and reject any
/// non-2xx response with [`OsmError::Http`](crate::error::OsmError::Http),
/// carrying the uniform `{message, status, status_text}` record. No
/// retries happen at this layer; timeouts are the implementation's
/// concern.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Anonymous GET.
    async fn get(&self, url: &str) -> Result<String>;

    /// GET under the authenticated identity.
    async fn get_auth(&self, url: &str) -> Result<String>;

    /// Authenticated request with an optional body.
    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<String>,
        content_type: Option<&str>,
    ) -> Result<String>;
}
