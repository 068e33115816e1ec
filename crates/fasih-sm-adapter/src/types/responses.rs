/*
[INPUT]:  Backend JSON schema definitions and serde requirements
[OUTPUT]: Typed Rust response structs with serialization support
[POS]:    Data layer - type definitions for backend communication
[UPDATE]: When backend schema changes or new types added
*/

use serde::{Deserialize, Serialize};

use super::models::HistoryItem;

/// `{success, message, ...payload}` wrapper used by every JSON endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub payload: T,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPayload<T> {
    pub data: T,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthStatusResponse {
    pub is_logged_in: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleResponse {
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WilayahStatusResponse {
    pub exists: bool,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WilayahFetchPayload {
    #[serde(default)]
    pub count: u64,
}

/// Successful wilayah fetch with the backend's summary line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WilayahFetchResponse {
    pub count: u64,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchPayload {
    #[serde(rename = "taskId")]
    pub task_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnsPayload {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(rename = "fromFile", default)]
    pub from_file: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Ordered column list and the file it was read from, when known
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnCatalog {
    pub columns: Vec<String>,
    pub source_file: Option<String>,
}

impl From<ColumnsPayload> for ColumnCatalog {
    fn from(payload: ColumnsPayload) -> Self {
        Self {
            columns: payload.columns,
            source_file: payload.from_file.or(payload.filename),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportResult {
    pub filename: String,
    #[serde(default)]
    pub columns_count: u64,
    #[serde(default)]
    pub rows_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPayload {
    #[serde(default)]
    pub history: Vec<HistoryItem>,
}
