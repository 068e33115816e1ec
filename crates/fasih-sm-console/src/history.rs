/*
[INPUT]:  Backend artifact history
[OUTPUT]: Live history list via `watch`, size formatting for display
[POS]:    Engine layer - artifact history panel model
[UPDATE]: When history gains filtering or paging
*/

use std::sync::Arc;

use fasih_sm_adapter::HistoryItem;
use tokio::sync::watch;
use tracing::debug;

use crate::backend::ConsoleBackend;
use crate::notice::NoticeBoard;

const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Human-readable size: 1024-based, at most two decimals, trailing zeros dropped
pub fn format_size(bytes: u64) -> String {
    let mut exponent = 0;
    let mut scaled = bytes;
    while scaled >= 1024 && exponent < UNITS.len() - 1 {
        scaled /= 1024;
        exponent += 1;
    }
    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[exponent])
}

/// Always replaced wholesale by `refresh`, never patched
pub struct HistoryLog {
    backend: Arc<dyn ConsoleBackend>,
    notices: Arc<NoticeBoard>,
    items: watch::Sender<Vec<HistoryItem>>,
}

impl HistoryLog {
    pub fn new(backend: Arc<dyn ConsoleBackend>, notices: Arc<NoticeBoard>) -> Self {
        let (items, _rx) = watch::channel(Vec::new());
        Self {
            backend,
            notices,
            items,
        }
    }

    /// Reload from the backend. On failure the previous list stays and a notice is raised.
    pub async fn refresh(&self) -> bool {
        match self.backend.history().await {
            Ok(items) => {
                debug!(count = items.len(), "history refreshed");
                self.items.send_replace(items);
                true
            }
            Err(err) => {
                self.notices.push_error("Failed to load history", &err);
                false
            }
        }
    }

    pub fn snapshot(&self) -> Vec<HistoryItem> {
        self.items.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<HistoryItem>> {
        self.items.subscribe()
    }
}
