//! HTTP API response DTOs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Online users (GET /api/presence)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceDto {
    pub online_user_ids: Vec<String>,
    pub count: usize,
}

/// Unseen message counts of one user (GET /api/users/{user_id}/unseen-counts)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnseenCountsDto {
    pub user_id: String,
    pub counts: BTreeMap<String, usize>,
    pub total: usize,
}
