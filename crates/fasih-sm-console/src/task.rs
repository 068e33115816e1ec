/*
[INPUT]:  Action kind + resolved ActionContext (+ optional column subset), poll interval
[OUTPUT]: TaskHandle owning a live TaskView fed by a cancellable poller
[POS]:    Execution layer - single active backend task lifecycle
[UPDATE]: When changing dispatch gating or polling semantics
[UPDATE]: 2026-10-15 Bind the poller to the handle with a drop guard
[UPDATE]: 2026-10-16 Treat backend-reported poll failures as final
*/

use std::sync::Arc;
use std::time::Duration;

use fasih_sm_adapter::{ActionKind, ActionRequest, TaskProgress, TaskStatus};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

use crate::backend::ConsoleBackend;
use crate::error::{ConsoleError, Result};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

const LOG_TAIL: usize = 5;

/// Everything the backend needs to run an action against one kabupaten
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionContext {
    pub survey_id: String,
    pub period_id: String,
    pub template_id: String,
    pub group_id: String,
    pub kab_id: String,
    pub kab_name: String,
    pub survey_name: String,
    pub period_name: String,
}

impl ActionContext {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("survey", &self.survey_id),
            ("period", &self.period_id),
            ("template", &self.template_id),
            ("region group", &self.group_id),
            ("kabupaten", &self.kab_id),
            ("kabupaten name", &self.kab_name),
            ("survey name", &self.survey_name),
            ("period name", &self.period_name),
        ];
        match fields.into_iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(ConsoleError::MissingField(name)),
            None => Ok(()),
        }
    }

    /// Column subsets only apply to raw downloads and are dropped when empty
    pub fn to_request(&self, kind: ActionKind, columns: Option<Vec<String>>) -> ActionRequest {
        let selected_columns = columns
            .filter(|columns| kind == ActionKind::DownloadRaw && !columns.is_empty());
        ActionRequest {
            survey_id: self.survey_id.clone(),
            period_id: self.period_id.clone(),
            template_id: self.template_id.clone(),
            group_id: self.group_id.clone(),
            kab_id: self.kab_id.clone(),
            kab_name: self.kab_name.clone(),
            survey_name: self.survey_name.clone(),
            period_name: self.period_name.clone(),
            selected_columns,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskCounters {
    pub total_assignments: Option<u64>,
    pub success: Option<u64>,
    pub fail: Option<u64>,
    pub skip: Option<u64>,
}

impl TaskCounters {
    fn from_progress(progress: &TaskProgress) -> Option<Self> {
        let counters = Self {
            total_assignments: progress.total_assignments,
            success: progress.success_count,
            fail: progress.fail_count,
            skip: progress.skip_count,
        };
        (counters != Self::default()).then_some(counters)
    }
}

/// Result file of a completed task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactHandle {
    pub filename: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskView {
    pub task_id: String,
    pub kind: ActionKind,
    pub status: TaskStatus,
    pub progress: u32,
    pub message: String,
    pub logs: Vec<String>,
    pub counters: Option<TaskCounters>,
    pub artifact: Option<ArtifactHandle>,
    /// Last transport fault while polling; cleared by the next good read
    pub last_poll_error: Option<String>,
}

impl TaskView {
    fn new(task_id: String, kind: ActionKind) -> Self {
        Self {
            task_id,
            kind,
            status: TaskStatus::Initializing,
            progress: 0,
            message: "Task dispatched".to_string(),
            logs: Vec::new(),
            counters: None,
            artifact: None,
            last_poll_error: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Backend message plus the log tail, for failed tasks
    pub fn failure_detail(&self) -> Option<String> {
        if self.status != TaskStatus::Error {
            return None;
        }
        let tail_start = self.logs.len().saturating_sub(LOG_TAIL);
        let mut detail = self.message.clone();
        for line in &self.logs[tail_start..] {
            detail.push('\n');
            detail.push_str(line);
        }
        Some(detail)
    }

    fn apply(&mut self, progress: TaskProgress, artifact: Option<ArtifactHandle>) {
        self.counters = TaskCounters::from_progress(&progress);
        self.status = progress.status;
        self.progress = progress.progress.min(100);
        self.message = progress.message;
        // logs only grow
        if progress.logs.len() >= self.logs.len() {
            self.logs = progress.logs;
        }
        self.artifact = artifact;
        self.last_poll_error = None;
    }

    fn fail(&mut self, message: String) {
        self.status = TaskStatus::Error;
        self.message = message;
        self.artifact = None;
    }
}

/// Wait until the view reaches `completed` or `error` (or the poller goes away)
pub async fn wait_for_terminal(view: &mut watch::Receiver<TaskView>) -> TaskView {
    loop {
        {
            let current = view.borrow_and_update();
            if current.is_terminal() {
                return current.clone();
            }
        }
        if view.changed().await.is_err() {
            return view.borrow().clone();
        }
    }
}

#[derive(Debug, Clone, Default)]
enum TaskSlot {
    #[default]
    Idle,
    /// Dispatch request in flight, no task id yet
    Dispatching,
    Active {
        task_id: String,
        view: watch::Receiver<TaskView>,
        cancel: CancellationToken,
    },
}

impl TaskSlot {
    fn active_id(&self) -> Option<String> {
        match self {
            TaskSlot::Idle => None,
            TaskSlot::Dispatching => Some("pending".to_string()),
            TaskSlot::Active { task_id, view, cancel } => {
                (!cancel.is_cancelled() && !view.borrow().is_terminal()).then(|| task_id.clone())
            }
        }
    }
}

/// Resets the slot if dispatch is abandoned before a task id arrives
struct DispatchClaim {
    slot: Arc<watch::Sender<TaskSlot>>,
    armed: bool,
}

impl Drop for DispatchClaim {
    fn drop(&mut self) {
        if self.armed {
            self.slot.send_if_modified(|slot| {
                if matches!(slot, TaskSlot::Dispatching) {
                    *slot = TaskSlot::Idle;
                    return true;
                }
                false
            });
        }
    }
}

/// Owns the single active task slot and spawns pollers.
#[derive(Clone)]
pub struct TaskOrchestrator {
    backend: Arc<dyn ConsoleBackend>,
    poll_interval: Duration,
    slot: Arc<watch::Sender<TaskSlot>>,
}

impl TaskOrchestrator {
    pub fn new(backend: Arc<dyn ConsoleBackend>, poll_interval: Duration) -> Self {
        let (slot, _rx) = watch::channel(TaskSlot::Idle);
        Self {
            backend,
            poll_interval,
            slot: Arc::new(slot),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// True while a dispatch is in flight or a task is neither terminal nor cancelled
    pub fn is_active(&self) -> bool {
        self.slot.borrow().active_id().is_some()
    }

    pub fn active_task_id(&self) -> Option<String> {
        self.slot.borrow().active_id()
    }

    pub async fn dispatch(
        &self,
        kind: ActionKind,
        context: &ActionContext,
        columns: Option<Vec<String>>,
    ) -> Result<TaskHandle> {
        context.validate()?;

        let mut busy = None;
        self.slot.send_if_modified(|slot| {
            if let Some(task_id) = slot.active_id() {
                busy = Some(task_id);
                return false;
            }
            *slot = TaskSlot::Dispatching;
            true
        });
        if let Some(task_id) = busy {
            return Err(ConsoleError::TaskActive { task_id });
        }
        let mut claim = DispatchClaim {
            slot: self.slot.clone(),
            armed: true,
        };

        let request = context.to_request(kind, columns);
        let task_id = self.backend.dispatch_action(kind, &request).await?;
        info!(
            task_id = %task_id,
            action = %kind,
            kab_id = %context.kab_id,
            columns = request.selected_columns.as_ref().map_or(0, Vec::len),
            "task dispatched"
        );

        let (view_tx, view_rx) = watch::channel(TaskView::new(task_id.clone(), kind));
        let cancel = CancellationToken::new();
        let poller = tokio::spawn(poll_task(
            self.backend.clone(),
            task_id.clone(),
            self.poll_interval,
            view_tx,
            cancel.clone(),
        ));

        claim.armed = false;
        self.slot.send_replace(TaskSlot::Active {
            task_id: task_id.clone(),
            view: view_rx.clone(),
            cancel: cancel.clone(),
        });

        Ok(TaskHandle {
            task_id,
            kind,
            view: view_rx,
            poller,
            slot: self.slot.clone(),
            _guard: cancel.drop_guard(),
        })
    }
}

/// Owning view of a dispatched task. Dropping it stops polling.
#[derive(Debug)]
pub struct TaskHandle {
    task_id: String,
    kind: ActionKind,
    view: watch::Receiver<TaskView>,
    poller: JoinHandle<()>,
    slot: Arc<watch::Sender<TaskSlot>>,
    _guard: DropGuard,
}

impl TaskHandle {
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn view(&self) -> TaskView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TaskView> {
        self.view.clone()
    }

    pub fn is_polling(&self) -> bool {
        !self.poller.is_finished()
    }

    pub async fn wait_terminal(&mut self) -> TaskView {
        wait_for_terminal(&mut self.view).await
    }

    /// Stop polling, free the slot, and return the last view
    pub fn close(self) -> TaskView {
        let view = self.view();
        self.slot.send_if_modified(|slot| match slot {
            TaskSlot::Active { task_id, .. } if *task_id == self.task_id => {
                *slot = TaskSlot::Idle;
                true
            }
            _ => false,
        });
        info!(task_id = %self.task_id, status = ?view.status, "task closed");
        view
    }
}

async fn poll_task(
    backend: Arc<dyn ConsoleBackend>,
    task_id: String,
    interval: Duration,
    view: watch::Sender<TaskView>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // first tick fires immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = backend.task_progress(&task_id) => result,
        };

        match result {
            Ok(progress) => {
                let status = progress.status;
                debug!(task_id = %task_id, ?status, progress = progress.progress, "task polled");
                let artifact = match (&status, &progress.filename) {
                    (TaskStatus::Completed, Some(filename)) => Some(ArtifactHandle {
                        filename: filename.clone(),
                        url: backend.artifact_url(filename).ok(),
                    }),
                    _ => None,
                };
                view.send_modify(|current| current.apply(progress, artifact));
                if status.is_terminal() {
                    info!(task_id = %task_id, ?status, "task finished");
                    return;
                }
            }
            Err(err) if err.is_backend_failure() => {
                warn!(task_id = %task_id, "task poll rejected: {err}");
                view.send_modify(|current| current.fail(err.user_message()));
                return;
            }
            Err(err) => {
                debug!(task_id = %task_id, "task poll failed, retrying: {err}");
                view.send_modify(|current| current.last_poll_error = Some(err.to_string()));
            }
        }
    }
    debug!(task_id = %task_id, "task polling cancelled");
}
