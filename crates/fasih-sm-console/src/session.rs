/*
[INPUT]:  One ConsoleBackend and the configured poll interval
[OUTPUT]: Session-scoped facade over selection, tasks, history, exports and notices
[POS]:    Engine root - what the presentation layer talks to
[UPDATE]: When adding operator-facing operations
*/

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use fasih_sm_adapter::{ActionKind, ExportResult, HistoryItem};
use tokio::sync::{Mutex, watch};
use tracing::info;

use crate::backend::ConsoleBackend;
use crate::columns::{ColumnCatalogResolver, ColumnSelection};
use crate::error::{ConsoleError, Result};
use crate::export::ExportWorkflow;
use crate::history::HistoryLog;
use crate::notice::NoticeBoard;
use crate::selection::{SelectionMachine, SelectionState};
use crate::task::{TaskHandle, TaskOrchestrator, TaskView};

pub struct ConsoleSession {
    backend: Arc<dyn ConsoleBackend>,
    notices: Arc<NoticeBoard>,
    selection: SelectionMachine,
    tasks: TaskOrchestrator,
    current_task: Mutex<Option<TaskHandle>>,
    columns: ColumnCatalogResolver,
    history: Arc<HistoryLog>,
    export: ExportWorkflow,
}

impl ConsoleSession {
    pub fn new(backend: Arc<dyn ConsoleBackend>, poll_interval: Duration) -> Self {
        let notices = Arc::new(NoticeBoard::new());
        let history = Arc::new(HistoryLog::new(backend.clone(), notices.clone()));
        Self {
            selection: SelectionMachine::new(backend.clone(), notices.clone()),
            tasks: TaskOrchestrator::new(backend.clone(), poll_interval),
            current_task: Mutex::new(None),
            columns: ColumnCatalogResolver::new(backend.clone()),
            export: ExportWorkflow::new(backend.clone(), history.clone()),
            history,
            notices,
            backend,
        }
    }

    /// Confirm the backend session, then load surveys and history
    pub async fn start(&self) -> Result<()> {
        if !self.backend.session_status().await? {
            return Err(ConsoleError::NotLoggedIn);
        }
        let surveys = self.backend.list_surveys().await?;
        info!(count = surveys.len(), "surveys loaded");
        self.selection.set_surveys(surveys);
        self.history.refresh().await;
        Ok(())
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn selection(&self) -> SelectionState {
        self.selection.snapshot()
    }

    pub fn subscribe_selection(&self) -> watch::Receiver<SelectionState> {
        self.selection.subscribe()
    }

    pub async fn select_survey(&self, survey_id: &str) {
        self.selection.select_survey(survey_id).await;
    }

    pub async fn select_period(&self, period_id: &str) {
        self.selection.select_period(period_id).await;
    }

    pub async fn select_province(&self, province_code: &str) {
        self.selection.select_province(province_code).await;
    }

    pub async fn select_kabupaten(&self, kabupaten_id: &str) {
        self.selection.select_kabupaten(kabupaten_id).await;
    }

    pub async fn refresh_wilayah(&self) {
        self.selection.refresh_wilayah().await;
    }

    pub fn can_dispatch(&self) -> bool {
        self.selection.snapshot().is_dispatch_ready() && !self.tasks.is_active()
    }

    pub fn active_task_id(&self) -> Option<String> {
        self.tasks.active_task_id()
    }

    pub async fn dispatch(&self, kind: ActionKind) -> Result<watch::Receiver<TaskView>> {
        self.dispatch_with(kind, None).await
    }

    /// Column picker for a raw download, or `None` to download every column
    pub async fn download_catalog(&self) -> Option<ColumnSelection> {
        let survey_name = self.selection.snapshot().survey_name;
        if survey_name.is_empty() {
            return None;
        }
        match self.columns.for_survey(&survey_name).await {
            Ok(catalog) => Some(ColumnSelection::from(catalog)),
            Err(err) => {
                self.notices
                    .push_error("Failed to load columns, downloading all columns", &err);
                None
            }
        }
    }

    /// Raw download; a picker with no catalog behind it downloads everything
    pub async fn dispatch_download(
        &self,
        selection: Option<&ColumnSelection>,
    ) -> Result<watch::Receiver<TaskView>> {
        let columns = match selection {
            Some(selection) if selection.is_unavailable() => None,
            Some(selection) if selection.is_empty() => return Err(ConsoleError::NoColumnsSelected),
            Some(selection) => Some(selection.ordered()),
            None => None,
        };
        self.dispatch_with(ActionKind::DownloadRaw, columns).await
    }

    async fn dispatch_with(
        &self,
        kind: ActionKind,
        columns: Option<Vec<String>>,
    ) -> Result<watch::Receiver<TaskView>> {
        let state = self.selection.snapshot();
        let context = state.action_context();
        context.validate()?;
        if !state.wilayah.is_ready() {
            return Err(ConsoleError::WilayahNotReady);
        }

        let handle = self.tasks.dispatch(kind, &context, columns).await?;
        let view = handle.subscribe();
        let previous = self.current_task.lock().await.replace(handle);
        if let Some(previous) = previous {
            previous.close();
        }
        Ok(view)
    }

    pub async fn task_view(&self) -> Option<TaskView> {
        self.current_task.lock().await.as_ref().map(TaskHandle::view)
    }

    /// Stop tracking the current task and pick up whatever it produced
    pub async fn close_task(&self) -> Option<TaskView> {
        let handle = self.current_task.lock().await.take();
        let view = handle.map(TaskHandle::close);
        self.history.refresh().await;
        view
    }

    pub fn history(&self) -> Vec<HistoryItem> {
        self.history.snapshot()
    }

    pub fn subscribe_history(&self) -> watch::Receiver<Vec<HistoryItem>> {
        self.history.subscribe()
    }

    pub async fn refresh_history(&self) -> bool {
        self.history.refresh().await
    }

    pub async fn open_export(&self, filename: &str) -> Result<ColumnSelection> {
        self.export.open(filename).await
    }

    pub async fn export(&self, filename: &str, selection: &ColumnSelection) -> Result<ExportResult> {
        self.export.export(filename, selection).await
    }

    pub async fn download(&self, filename: &str, dest: &Path) -> Result<u64> {
        Ok(self.backend.download_artifact(filename, dest).await?)
    }

    pub fn artifact_url(&self, filename: &str) -> Result<String> {
        Ok(self.backend.artifact_url(filename)?)
    }

    /// Drop the current task and end the backend session
    pub async fn logout(&self) -> Result<()> {
        if let Some(handle) = self.current_task.lock().await.take() {
            handle.close();
        }
        self.backend.logout().await?;
        info!("logged out");
        Ok(())
    }
}
