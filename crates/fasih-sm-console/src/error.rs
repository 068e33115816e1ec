/*
[INPUT]:  Validation failures, task exclusivity, adapter errors
[OUTPUT]: ConsoleError with a user-facing classification
[POS]:    Error layer - boundary between engine and presentation
[UPDATE]: When adding new failure classes
*/

use fasih_sm_adapter::FasihError;
use thiserror::Error;

/// How a failure should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before any network call
    Validation,
    /// Network or service fault, retry later
    TransientRemote,
    /// Round-trip succeeded with a negative result
    BackendFailure,
}

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("{0} is required before dispatching an action")]
    MissingField(&'static str),

    #[error("select at least one column to export")]
    NoColumnsSelected,

    #[error("wilayah cache for the selected kabupaten is not ready")]
    WilayahNotReady,

    #[error("task {task_id} is still active")]
    TaskActive { task_id: String },

    #[error("backend session is not logged in")]
    NotLoggedIn,

    #[error(transparent)]
    Remote(#[from] FasihError),
}

impl ConsoleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConsoleError::MissingField(_)
            | ConsoleError::NoColumnsSelected
            | ConsoleError::WilayahNotReady
            | ConsoleError::TaskActive { .. } => ErrorKind::Validation,
            ConsoleError::NotLoggedIn => ErrorKind::BackendFailure,
            ConsoleError::Remote(err) if err.is_backend_failure() => ErrorKind::BackendFailure,
            ConsoleError::Remote(_) => ErrorKind::TransientRemote,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
