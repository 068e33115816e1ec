/*
[INPUT]:  Public API exports for fasih-sm-console crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod backend;
pub mod columns;
pub mod config;
pub mod error;
pub mod export;
pub mod history;
pub mod notice;
pub mod region;
pub mod selection;
pub mod session;
pub mod task;
pub mod wilayah;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types for convenience
pub use backend::ConsoleBackend;
pub use columns::ColumnSelection;
pub use self::config::ConsoleConfig;
pub use error::{ConsoleError, ErrorKind};
pub use history::format_size;
pub use notice::{Notice, NoticeBoard, NoticeKind};
pub use selection::SelectionState;
pub use session::ConsoleSession;
pub use task::{ArtifactHandle, TaskCounters, TaskView, wait_for_terminal};
pub use wilayah::{WilayahPhase, WilayahStatus};
