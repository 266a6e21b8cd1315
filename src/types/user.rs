//! Account metadata for a map contributor.

use serde::{Deserialize, Serialize};

/// Public account details as returned by the user endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub display_name: String,
    pub account_created: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contributor_terms_agreed: Option<bool>,
    pub changesets_count: u64,
    pub traces_count: u64,
    pub blocks_received: u64,
    pub blocks_active: u64,
}
