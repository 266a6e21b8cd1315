//! User preference operations, scoped to the authenticated identity.

use std::collections::BTreeMap;

use http::Method;

use crate::client::normalize::preferences_from_doc;
use crate::client::utils::encode_component;
use crate::client::OsmClient;
use crate::error::Result;
use crate::xml::parse_document;

impl OsmClient {
    /// Fetch the full preference set.
    pub async fn get_user_preferences(&self) -> Result<BTreeMap<String, String>> {
        let text = self.get_auth_text("user/preferences").await?;
        preferences_from_doc(&parse_document(&text)?)
    }

    /// Fetch a single preference value. The body is the raw value text.
    pub async fn get_user_preference(&self, key: &str) -> Result<String> {
        self.get_auth_text(&format!("user/preferences/{}", encode_component(key)))
            .await
    }

    /// Set a single preference.
    pub async fn set_user_preference(&self, key: &str, value: &str) -> Result<()> {
        self.send_plain(
            Method::PUT,
            &format!("user/preferences/{}", encode_component(key)),
            Some(value.to_string()),
        )
        .await?;
        Ok(())
    }

    /// Delete a single preference.
    pub async fn delete_user_preference(&self, key: &str) -> Result<()> {
        self.send_plain(
            Method::DELETE,
            &format!("user/preferences/{}", encode_component(key)),
            None,
        )
        .await?;
        Ok(())
    }
}
