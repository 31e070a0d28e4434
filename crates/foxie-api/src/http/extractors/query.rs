//! Query parameter extractors.
//!
//! Clients identify themselves with a `userId` query parameter on reads and
//! deletes (bodies carry it on writes).

use serde::Deserialize;

/// `?userId=` on single-resource reads and deletes.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    #[serde(default)]
    pub user_id: String,
}

/// `?userId=&limit=` on the session listing.
///
/// No `limit` means every session. Sidebar clients pass `limit=10`.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SessionListQuery {
    #[serde(default)]
    pub user_id: String,
    pub limit: Option<usize>,
}
