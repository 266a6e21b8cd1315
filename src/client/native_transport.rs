//! reqwest-backed [`Transport`] implementation.

use std::time::Duration;

use async_trait::async_trait;
use http::Method;
use reqwest::Client;

use crate::client::config::{ClientConfig, Credentials};
use crate::error::{OsmError, Result};
use crate::traits::Transport;

pub struct NativeTransport {
    client: Client,
    credentials: Credentials,
}

impl NativeTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| OsmError::Config(e.to_string()))?;
        Ok(NativeTransport {
            client,
            credentials: config.credentials.clone(),
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<String>,
        content_type: Option<&str>,
        authenticated: bool,
    ) -> Result<String> {
        let req_method = match method.as_str() {
            "PUT" => reqwest::Method::PUT,
            "POST" => reqwest::Method::POST,
            "DELETE" => reqwest::Method::DELETE,
            _ => reqwest::Method::GET,
        };

        let mut req_builder = self.client.request(req_method, url);

        if authenticated {
            req_builder = match &self.credentials {
                Credentials::Anonymous => req_builder,
                Credentials::Basic { username, password } => {
                    req_builder.basic_auth(username, Some(password))
                }
                Credentials::Bearer { token } => req_builder.bearer_auth(token),
            };
        }

        if let Some(body) = body {
            req_builder = req_builder.header(
                reqwest::header::CONTENT_TYPE,
                content_type.unwrap_or("text/xml"),
            );
            req_builder = req_builder.body(body);
        }

        tracing::debug!("[osm-out] {} {}", method, url);

        // Connection-level failures have no status; 0 marks them in the
        // uniform error record.
        let response = req_builder.send().await.map_err(|e| OsmError::Http {
            message: e.to_string(),
            status: 0,
            status_text: String::new(),
        })?;

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or("").to_string();
        let text = response.text().await.map_err(|e| OsmError::Http {
            message: e.to_string(),
            status: status.as_u16(),
            status_text: status_text.clone(),
        })?;

        tracing::debug!("[osm-in] {} {} -> {}", method, url, status.as_u16());

        if !status.is_success() {
            return Err(OsmError::Http {
                message: text,
                status: status.as_u16(),
                status_text,
            });
        }
        Ok(text)
    }
}

#[async_trait]
impl Transport for NativeTransport {
    async fn get(&self, url: &str) -> Result<String> {
        self.execute(Method::GET, url, None, None, false).await
    }

    async fn get_auth(&self, url: &str) -> Result<String> {
        self.execute(Method::GET, url, None, None, true).await
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<String>,
        content_type: Option<&str>,
    ) -> Result<String> {
        self.execute(method, url, body, content_type, true).await
    }
}
