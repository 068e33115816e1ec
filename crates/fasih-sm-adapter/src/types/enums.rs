/*
[INPUT]:  Backend JSON schema definitions and serde requirements
[OUTPUT]: Typed Rust enums with serialization support
[POS]:    Data layer - type definitions for backend communication
[UPDATE]: When backend schema changes or new types added
*/

use serde::{Deserialize, Serialize};
use std::fmt;

/// Long-running backend actions that produce a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    DownloadRaw,
    Approve,
    Revoke,
    Reject,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        ActionKind::DownloadRaw,
        ActionKind::Approve,
        ActionKind::Revoke,
        ActionKind::Reject,
    ];

    /// Path segment under `/action`
    pub fn as_path(self) -> &'static str {
        match self {
            ActionKind::DownloadRaw => "download-raw",
            ActionKind::Approve => "approve",
            ActionKind::Revoke => "revoke",
            ActionKind::Reject => "reject",
        }
    }

    /// Parse from the path form (`download-raw`, `approve`, ...)
    pub fn from_path(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_path() == value)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Initializing,
    Running,
    Completed,
    Error,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryKind {
    RawData,
    Log,
}

impl fmt::Display for HistoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryKind::RawData => f.write_str("Raw Data"),
            HistoryKind::Log => f.write_str("Log"),
        }
    }
}
