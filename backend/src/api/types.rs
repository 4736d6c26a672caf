//! REST API payloads.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::clean::FileSummary;
use crate::dashboard::DashboardSnapshot;
use crate::session::UploadOutcome;

/// Response to `POST /api/upload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub session_id: String,
    /// "ready", or "warning" when some files were ignored
    pub status: String,
    pub files: Vec<FileSummary>,
    pub ignored: Vec<String>,
    pub snapshot: DashboardSnapshot,
}

impl UploadResponse {
    pub fn new(session_id: String, outcome: UploadOutcome) -> Self {
        let status = if outcome.ignored.is_empty() {
            "ready"
        } else {
            "warning"
        };
        Self {
            session_id,
            status: status.to_string(),
            files: outcome.files,
            ignored: outcome.ignored,
            snapshot: (*outcome.snapshot).clone(),
        }
    }
}

/// Response to snapshot reads and filter changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotResponse {
    pub session_id: String,
    pub snapshot: DashboardSnapshot,
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "status": "error",
        "error": error,
    })
}
