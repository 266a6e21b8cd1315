//! User account operations.

use crate::client::normalize::user_from_doc;
use crate::client::OsmClient;
use crate::error::Result;
use crate::types::UserInfo;

impl OsmClient {
    /// Fetch a user's public account details.
    pub async fn fetch_user(&self, uid: i64) -> Result<UserInfo> {
        let doc = self.get_doc(&format!("user/{uid}")).await?;
        user_from_doc(&doc)
    }
}
