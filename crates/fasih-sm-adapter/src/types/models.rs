/*
[INPUT]:  Backend JSON schema definitions and serde requirements
[OUTPUT]: Typed Rust structs with serialization support
[POS]:    Data layer - type definitions for backend communication
[UPDATE]: When backend schema changes or new types added
[UPDATE]: 2026-10-13 Accept progress payloads written before the task thread starts
[UPDATE]: 2026-10-20 Treat explicit nulls in optional display fields as empty
*/

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use super::enums::{HistoryKind, TaskStatus};

/// Upstream rows are forwarded as-is, so a present key may still hold `null`
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Survey {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "surveyType", default, deserialize_with = "null_as_default")]
    pub survey_type: String,
    #[serde(rename = "regionGroupId", default, deserialize_with = "null_as_default")]
    pub region_group_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "startDate", default)]
    pub start_date: Option<String>,
    #[serde(rename = "endDate", default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyDetail {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "regionGroupId", default)]
    pub region_group_id: Option<String>,
    #[serde(rename = "templateId", default)]
    pub template_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub periods: Vec<Period>,
}

/// Province or kabupaten entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionOption {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: String,
    #[serde(rename = "fullCode")]
    pub full_code: String,
}

/// Key triple of a wilayah cache entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WilayahKey {
    #[serde(rename = "surveyId")]
    pub survey_id: String,
    #[serde(rename = "periodId")]
    pub period_id: String,
    #[serde(rename = "kabId")]
    pub kab_id: String,
}

impl WilayahKey {
    pub fn new(
        survey_id: impl Into<String>,
        period_id: impl Into<String>,
        kab_id: impl Into<String>,
    ) -> Self {
        Self {
            survey_id: survey_id.into(),
            period_id: period_id.into(),
            kab_id: kab_id.into(),
        }
    }
}

/// Progress snapshot of a backend task
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskProgress {
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub logs: Vec<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub total_assignments: Option<u64>,
    #[serde(default)]
    pub success_count: Option<u64>,
    #[serde(default)]
    pub fail_count: Option<u64>,
    #[serde(default)]
    pub skip_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub filename: String,
    #[serde(rename = "type")]
    pub kind: HistoryKind,
    pub timestamp: NaiveDateTime,
    pub size: u64,
}
