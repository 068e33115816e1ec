/*
[INPUT]:  Failures from any engine component
[OUTPUT]: Live list of dismissible notices for the presentation layer
[POS]:    Shared state - transient banner area
[UPDATE]: When notice kinds or lifetime rules change
*/

use std::sync::atomic::{AtomicU64, Ordering};

use fasih_sm_adapter::FasihError;
use tokio::sync::watch;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Transient,
    Backend,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Debug)]
pub struct NoticeBoard {
    notices: watch::Sender<Vec<Notice>>,
    next_id: AtomicU64,
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl NoticeBoard {
    pub fn new() -> Self {
        let (notices, _rx) = watch::channel(Vec::new());
        Self {
            notices,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn push(&self, kind: NoticeKind, message: impl Into<String>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let message = message.into();
        warn!(notice_id = id, ?kind, %message, "notice raised");
        self.notices.send_modify(|notices| {
            notices.push(Notice { id, kind, message });
        });
        id
    }

    /// Record a failed remote call under `context` ("Failed to load regions: ...")
    pub fn push_error(&self, context: &str, err: &FasihError) -> u64 {
        let kind = if err.is_backend_failure() {
            NoticeKind::Backend
        } else {
            NoticeKind::Transient
        };
        self.push(kind, format!("{context}: {}", err.user_message()))
    }

    pub fn dismiss(&self, id: u64) -> bool {
        self.notices.send_if_modified(|notices| {
            let before = notices.len();
            notices.retain(|notice| notice.id != id);
            notices.len() != before
        })
    }

    pub fn snapshot(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Notice>> {
        self.notices.subscribe()
    }
}
