/*
[INPUT]:  (survey, period, kabupaten) key plus the survey's region group
[OUTPUT]: WilayahStatus transitions: checking -> ready | fetching -> ready | error
[POS]:    Engine layer - check-then-fetch protocol for the per-kabupaten cache
[UPDATE]: When the cache protocol gains steps
*/

use std::fmt;
use std::sync::Arc;

use fasih_sm_adapter::{FasihError, WilayahFetchRequest, WilayahKey};
use tracing::{info, warn};

use crate::backend::ConsoleBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WilayahPhase {
    #[default]
    Idle,
    Checking,
    Fetching,
    Ready,
    Error,
}

impl fmt::Display for WilayahPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WilayahPhase::Idle => "idle",
            WilayahPhase::Checking => "checking",
            WilayahPhase::Fetching => "fetching",
            WilayahPhase::Ready => "ready",
            WilayahPhase::Error => "error",
        };
        f.write_str(label)
    }
}

/// Cache state of the currently selected kabupaten
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WilayahStatus {
    pub phase: WilayahPhase,
    /// Cached smallcode count, meaningful only when `Ready`
    pub count: u64,
    pub error: Option<WilayahFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WilayahFailure {
    pub message: String,
    /// Backend answered with a failure rather than the call failing in transit
    pub reported: bool,
}

impl WilayahStatus {
    pub fn idle() -> Self {
        Self::default()
    }

    fn phase(phase: WilayahPhase) -> Self {
        Self {
            phase,
            ..Self::default()
        }
    }

    pub fn ready(count: u64) -> Self {
        Self {
            phase: WilayahPhase::Ready,
            count,
            error: None,
        }
    }

    fn failed(err: &FasihError) -> Self {
        Self {
            phase: WilayahPhase::Error,
            count: 0,
            error: Some(WilayahFailure {
                message: err.user_message(),
                reported: err.is_backend_failure(),
            }),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.phase == WilayahPhase::Ready
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.phase, WilayahPhase::Checking | WilayahPhase::Fetching)
    }
}

#[derive(Clone)]
pub struct WilayahOrchestrator {
    backend: Arc<dyn ConsoleBackend>,
}

impl WilayahOrchestrator {
    pub fn new(backend: Arc<dyn ConsoleBackend>) -> Self {
        Self { backend }
    }

    /// Check the cache for `key` and populate it when missing.
    ///
    /// Every transition is handed to `observer` in order; the final one is also returned.
    /// Calling again after `Error` restarts from the check.
    pub async fn ensure_ready<F>(&self, key: &WilayahKey, group_id: &str, mut observer: F) -> WilayahStatus
    where
        F: FnMut(&WilayahStatus),
    {
        let mut emit = |status: WilayahStatus| {
            observer(&status);
            status
        };

        emit(WilayahStatus::phase(WilayahPhase::Checking));
        let cached = match self.backend.wilayah_status(key).await {
            Ok(cached) => cached,
            Err(err) => {
                warn!(kab_id = %key.kab_id, "wilayah status check failed: {err}");
                return emit(WilayahStatus::failed(&err));
            }
        };
        if cached.exists {
            info!(kab_id = %key.kab_id, count = cached.count, "wilayah cache hit");
            return emit(WilayahStatus::ready(cached.count));
        }

        emit(WilayahStatus::phase(WilayahPhase::Fetching));
        let request = WilayahFetchRequest {
            survey_id: key.survey_id.clone(),
            period_id: key.period_id.clone(),
            kab_id: key.kab_id.clone(),
            group_id: group_id.to_string(),
        };
        match self.backend.fetch_wilayah(&request).await {
            Ok(fetched) => {
                info!(
                    kab_id = %key.kab_id,
                    count = fetched.count,
                    message = fetched.message.as_deref().unwrap_or(""),
                    "wilayah cache populated"
                );
                emit(WilayahStatus::ready(fetched.count))
            }
            Err(err) => {
                warn!(kab_id = %key.kab_id, "wilayah fetch failed: {err}");
                emit(WilayahStatus::failed(&err))
            }
        }
    }
}
