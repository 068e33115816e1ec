/*
[INPUT]:  Backend JSON schema definitions and serde requirements
[OUTPUT]: Typed Rust request structs with serialization support
[POS]:    Data layer - type definitions for backend communication
[UPDATE]: When backend schema changes or new types added
*/

use serde::{Deserialize, Serialize};

/// Fully resolved context sent with every action dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub survey_id: String,
    pub period_id: String,
    pub template_id: String,
    pub group_id: String,
    pub kab_id: String,
    pub kab_name: String,
    pub survey_name: String,
    pub period_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_columns: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WilayahFetchRequest {
    pub survey_id: String,
    pub period_id: String,
    pub kab_id: String,
    pub group_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportFilteredRequest {
    #[serde(rename = "selectedColumns")]
    pub selected_columns: Vec<String>,
}
