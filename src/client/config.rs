//! Configuration for the OSM API client.

use crate::client::utils::trim_trailing_slashes;

/// Default endpoint, API version path included.
pub const DEFAULT_ENDPOINT: &str = "https://www.openstreetmap.org/api/0.6";

/// Identity handed to the transport, fully formed. Token negotiation is
/// out of scope; whoever builds the config has already authenticated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credentials {
    Anonymous,
    Basic { username: String, password: String },
    Bearer { token: String },
}

impl Default for Credentials {
    fn default() -> Self {
        Credentials::Anonymous
    }
}

/// Configuration for the OSM API client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// API endpoint, without a trailing slash.
    pub endpoint: String,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Identity used by authenticated operations.
    pub credentials: Credentials,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: concat!("osm-client/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_ms: 30_000,
            credentials: Credentials::Anonymous,
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = trim_trailing_slashes(&endpoint.into()).to_string();
        self
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    #[must_use]
    pub fn with_basic_auth(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.with_credentials(Credentials::Basic {
            username: username.into(),
            password: password.into(),
        })
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
