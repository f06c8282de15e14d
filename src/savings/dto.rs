use serde::{Deserialize, Serialize};

use super::services::ComparisonSnapshot;

#[derive(Debug, Serialize)]
pub struct SaveSnapshotResponse {
    pub duplicate: bool,
    pub snapshot: ComparisonSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    pub comparison_hash: String,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub exists: bool,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 {
    20
}
