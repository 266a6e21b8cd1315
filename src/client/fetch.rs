//! Main OSM API client.

use std::sync::Arc;

use http::Method;
use serde_json::Value;
use url::Url;

use crate::client::config::ClientConfig;
use crate::client::native_transport::NativeTransport;
use crate::client::utils::trim_trailing_slashes;
use crate::error::{OsmError, Result};
use crate::traits::Transport;
use crate::xml::parse_document;

/// The main OSM API client.
///
/// Cheap to clone; the transport and config are shared.
#[derive(Clone)]
pub struct OsmClient {
    transport: Arc<dyn Transport>,
    config: Arc<ClientConfig>,
}

impl OsmClient {
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let config = normalize_config(config)?;
        let transport = Arc::new(NativeTransport::new(&config)?);
        Ok(OsmClient {
            transport,
            config: Arc::new(config),
        })
    }

    /// Build a client over a caller-supplied transport. This is the seam
    /// tests use to run against a scripted network.
    pub fn with_transport(transport: Arc<dyn Transport>, config: ClientConfig) -> Result<Self> {
        let config = normalize_config(config)?;
        Ok(OsmClient {
            transport,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.config.endpoint, path)
    }

    pub(crate) async fn get_doc(&self, path: &str) -> Result<Value> {
        let text = self.transport.get(&self.api_url(path)).await?;
        parse_document(&text)
    }

    pub(crate) async fn get_auth_text(&self, path: &str) -> Result<String> {
        self.transport.get_auth(&self.api_url(path)).await
    }

    pub(crate) async fn send_xml(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<String> {
        self.transport
            .send(method, &self.api_url(path), body, Some("text/xml"))
            .await
    }

    pub(crate) async fn send_plain(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<String> {
        self.transport
            .send(method, &self.api_url(path), body, Some("text/plain"))
            .await
    }
}

fn normalize_config(mut config: ClientConfig) -> Result<ClientConfig> {
    config.endpoint = trim_trailing_slashes(&config.endpoint).to_string();
    Url::parse(&config.endpoint)
        .map_err(|e| OsmError::Config(format!("invalid endpoint {:?}: {e}", config.endpoint)))?;
    Ok(config)
}
