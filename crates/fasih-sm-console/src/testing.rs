/*
[INPUT]:  Scripted surveys, regions, cache entries, task progress and failures
[OUTPUT]: MockBackend implementing ConsoleBackend for engine tests
[POS]:    Test support - in-memory stand-in for the automation backend
[UPDATE]: When ConsoleBackend gains operations
*/

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use fasih_sm_adapter::{
    ActionKind, ActionRequest, ColumnCatalog, ExportResult, FasihError, HistoryItem, HistoryKind,
    Period, RegionOption, Result, Survey, SurveyDetail, TaskProgress, TaskStatus,
    WilayahFetchRequest, WilayahFetchResponse, WilayahKey, WilayahStatusResponse,
};

use crate::backend::ConsoleBackend;

#[derive(Debug, Clone)]
pub enum Failure {
    Transient,
    Backend(String),
}

#[derive(Debug, Default)]
pub struct MockState {
    pub logged_in: bool,
    pub surveys: Vec<Survey>,
    pub details: HashMap<String, SurveyDetail>,
    pub roles: HashMap<(String, String), String>,
    pub provinces: HashMap<String, Vec<RegionOption>>,
    pub kabupaten: HashMap<(String, String), Vec<RegionOption>>,
    pub cached: HashMap<WilayahKey, u64>,
    /// Fetch outcome per key; missing keys fail as backend-reported
    pub fetchable: HashMap<WilayahKey, u64>,
    pub progress: HashMap<String, VecDeque<TaskProgress>>,
    pub next_task_id: u64,
    pub survey_columns: HashMap<String, Vec<String>>,
    pub file_columns: HashMap<String, Vec<String>>,
    pub history: Vec<HistoryItem>,
    /// Keyed by `op` or `op:arg`
    pub delays: HashMap<String, Duration>,
    /// Keyed by `op` or `op:arg`
    pub failures: HashMap<String, Failure>,
    pub calls: Vec<String>,
    pub dispatched: Vec<(ActionKind, ActionRequest)>,
    pub exported: Vec<(String, Vec<String>)>,
}

#[derive(Debug, Default)]
pub struct MockBackend {
    state: Mutex<MockState>,
}

pub fn region(id: &str, full_code: &str, name: &str) -> RegionOption {
    RegionOption {
        id: id.to_string(),
        name: name.to_string(),
        code: full_code.chars().rev().take(2).collect::<String>().chars().rev().collect(),
        full_code: full_code.to_string(),
    }
}

fn period(id: &str, name: &str) -> Period {
    Period {
        id: id.to_string(),
        name: name.to_string(),
        start_date: None,
        end_date: None,
    }
}

pub fn progress(status: TaskStatus, percent: u32, message: &str, logs: &[&str]) -> TaskProgress {
    TaskProgress {
        status,
        progress: percent,
        message: message.to_string(),
        logs: logs.iter().map(|line| line.to_string()).collect(),
        ..TaskProgress::default()
    }
}

impl MockBackend {
    /// Two surveys, two periods on S1, one province with two kabupaten.
    ///
    /// (S1, P1, K1) is cached with 42 entries; (S1, P1, K2) fetches 311.
    pub fn fixture() -> Self {
        let backend = Self::default();
        {
            let mut state = backend.state();
            state.logged_in = true;
            state.surveys = vec![
                Survey {
                    id: "S1".to_string(),
                    name: "SUSENAS 2026".to_string(),
                    survey_type: "Pencacahan".to_string(),
                    region_group_id: "G1".to_string(),
                },
                Survey {
                    id: "S2".to_string(),
                    name: "SAKERNAS 2026".to_string(),
                    survey_type: "Pencacahan".to_string(),
                    region_group_id: "G2".to_string(),
                },
            ];
            state.details.insert(
                "S1".to_string(),
                SurveyDetail {
                    id: "S1".to_string(),
                    name: "SUSENAS 2026".to_string(),
                    region_group_id: Some("G1".to_string()),
                    template_id: Some("T1".to_string()),
                    periods: vec![period("P1", "Maret"), period("P2", "September")],
                },
            );
            state.details.insert(
                "S2".to_string(),
                SurveyDetail {
                    id: "S2".to_string(),
                    name: "SAKERNAS 2026".to_string(),
                    region_group_id: Some("G2".to_string()),
                    template_id: Some("T2".to_string()),
                    periods: vec![period("P9", "Agustus")],
                },
            );
            state
                .roles
                .insert(("S1".to_string(), "P1".to_string()), "Pengawas".to_string());
            state
                .roles
                .insert(("S1".to_string(), "P2".to_string()), "Admin Kabupaten".to_string());
            state
                .provinces
                .insert("G1".to_string(), vec![region("PR35", "35", "JAWA TIMUR"), region("PR36", "36", "BANTEN")]);
            state
                .provinces
                .insert("G2".to_string(), vec![region("PR51", "51", "BALI")]);
            state.kabupaten.insert(
                ("G1".to_string(), "35".to_string()),
                vec![region("K1", "3573", "KOTA MALANG"), region("K2", "3507", "MALANG")],
            );
            state.kabupaten.insert(
                ("G1".to_string(), "36".to_string()),
                vec![region("K3", "3671", "KOTA TANGERANG")],
            );
            state.kabupaten.insert(
                ("G2".to_string(), "51".to_string()),
                vec![region("K9", "5171", "KOTA DENPASAR")],
            );
            state.cached.insert(WilayahKey::new("S1", "P1", "K1"), 42);
            state.fetchable.insert(WilayahKey::new("S1", "P1", "K2"), 311);
        }
        backend
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_delay(&self, key: &str, delay: Duration) {
        self.state().delays.insert(key.to_string(), delay);
    }

    pub fn set_failure(&self, key: &str, failure: Failure) {
        self.state().failures.insert(key.to_string(), failure);
    }

    pub fn clear_failure(&self, key: &str) {
        self.state().failures.remove(key);
    }

    pub fn script_progress(&self, task_id: &str, steps: Vec<TaskProgress>) {
        self.state()
            .progress
            .insert(task_id.to_string(), steps.into_iter().collect());
    }

    pub fn calls(&self, op: &str) -> usize {
        let prefix = format!("{op}:");
        self.state()
            .calls
            .iter()
            .filter(|call| call.starts_with(&prefix))
            .count()
    }

    async fn enter(&self, op: &str, arg: &str) -> Result<()> {
        let (delay, failure) = {
            let mut state = self.state();
            let keyed = format!("{op}:{arg}");
            state.calls.push(keyed.clone());
            let delay = state
                .delays
                .get(&keyed)
                .or_else(|| state.delays.get(op))
                .copied();
            let failure = state
                .failures
                .get(&keyed)
                .or_else(|| state.failures.get(op))
                .cloned();
            (delay, failure)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match failure {
            Some(Failure::Transient) => Err(FasihError::Timeout { duration: 30 }),
            Some(Failure::Backend(message)) => Err(FasihError::Api { code: 500, message }),
            None => Ok(()),
        }
    }
}

fn not_found(what: &str) -> FasihError {
    FasihError::Api {
        code: 404,
        message: format!("{what} not found"),
    }
}

#[async_trait]
impl ConsoleBackend for MockBackend {
    async fn session_status(&self) -> Result<bool> {
        self.enter("session_status", "").await?;
        Ok(self.state().logged_in)
    }

    async fn logout(&self) -> Result<()> {
        self.enter("logout", "").await?;
        self.state().logged_in = false;
        Ok(())
    }

    async fn list_surveys(&self) -> Result<Vec<Survey>> {
        self.enter("list_surveys", "").await?;
        Ok(self.state().surveys.clone())
    }

    async fn survey_detail(&self, survey_id: &str) -> Result<SurveyDetail> {
        self.enter("survey_detail", survey_id).await?;
        self.state()
            .details
            .get(survey_id)
            .cloned()
            .ok_or_else(|| not_found("Survey"))
    }

    async fn user_role(&self, survey_id: &str, period_id: &str) -> Result<String> {
        self.enter("user_role", &format!("{survey_id}/{period_id}")).await?;
        Ok(self
            .state()
            .roles
            .get(&(survey_id.to_string(), period_id.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn provinces(&self, group_id: &str) -> Result<Vec<RegionOption>> {
        self.enter("provinces", group_id).await?;
        Ok(self.state().provinces.get(group_id).cloned().unwrap_or_default())
    }

    async fn kabupaten(&self, group_id: &str, province_code: &str) -> Result<Vec<RegionOption>> {
        self.enter("kabupaten", province_code).await?;
        Ok(self
            .state()
            .kabupaten
            .get(&(group_id.to_string(), province_code.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn wilayah_status(&self, key: &WilayahKey) -> Result<WilayahStatusResponse> {
        self.enter("wilayah_status", &key.kab_id).await?;
        let count = self.state().cached.get(key).copied();
        Ok(WilayahStatusResponse {
            exists: count.is_some(),
            count: count.unwrap_or(0),
        })
    }

    async fn fetch_wilayah(&self, request: &WilayahFetchRequest) -> Result<WilayahFetchResponse> {
        self.enter("fetch_wilayah", &request.kab_id).await?;
        let key = WilayahKey::new(&request.survey_id, &request.period_id, &request.kab_id);
        let mut state = self.state();
        let Some(count) = state.fetchable.get(&key).copied() else {
            return Err(FasihError::Api {
                code: 500,
                message: "region metadata unavailable".to_string(),
            });
        };
        state.cached.insert(key, count);
        Ok(WilayahFetchResponse {
            count,
            message: Some(format!("Fetched and cached {count} smallcodes")),
        })
    }

    async fn dispatch_action(&self, kind: ActionKind, request: &ActionRequest) -> Result<String> {
        self.enter("dispatch_action", kind.as_path()).await?;
        let mut state = self.state();
        state.next_task_id += 1;
        let task_id = format!("task-{}", state.next_task_id);
        state.dispatched.push((kind, request.clone()));
        Ok(task_id)
    }

    async fn task_progress(&self, task_id: &str) -> Result<TaskProgress> {
        self.enter("task_progress", task_id).await?;
        let mut state = self.state();
        let steps = state.progress.get_mut(task_id).ok_or_else(|| not_found("Task"))?;
        let step = if steps.len() > 1 {
            steps.pop_front()
        } else {
            steps.front().cloned()
        };
        step.ok_or_else(|| not_found("Task"))
    }

    async fn columns_for_survey(&self, survey_name: &str) -> Result<ColumnCatalog> {
        self.enter("columns_for_survey", survey_name).await?;
        Ok(ColumnCatalog {
            columns: self
                .state()
                .survey_columns
                .get(survey_name)
                .cloned()
                .unwrap_or_default(),
            source_file: None,
        })
    }

    async fn columns_for_file(&self, filename: &str) -> Result<ColumnCatalog> {
        self.enter("columns_for_file", filename).await?;
        let columns = self
            .state()
            .file_columns
            .get(filename)
            .cloned()
            .ok_or_else(|| not_found("File"))?;
        Ok(ColumnCatalog {
            columns,
            source_file: Some(filename.to_string()),
        })
    }

    async fn export_filtered(&self, filename: &str, columns: &[String]) -> Result<ExportResult> {
        self.enter("export_filtered", filename).await?;
        let stem = filename.trim_end_matches(".xlsx");
        let new_filename = format!("{stem}_filtered.xlsx");
        let mut state = self.state();
        state.exported.push((filename.to_string(), columns.to_vec()));
        state.history.insert(
            0,
            HistoryItem {
                filename: new_filename.clone(),
                kind: HistoryKind::RawData,
                timestamp: chrono::NaiveDate::from_ymd_opt(2026, 10, 19)
                    .and_then(|date| date.and_hms_opt(10, 0, 0))
                    .unwrap_or_default(),
                size: 1024,
            },
        );
        Ok(ExportResult {
            filename: new_filename,
            columns_count: columns.len() as u64,
            rows_count: 10,
        })
    }

    async fn history(&self) -> Result<Vec<HistoryItem>> {
        self.enter("history", "").await?;
        Ok(self.state().history.clone())
    }

    async fn download_artifact(&self, filename: &str, dest: &Path) -> Result<u64> {
        self.enter("download_artifact", filename).await?;
        let body = format!("artifact:{filename}");
        tokio::fs::write(dest, body.as_bytes()).await?;
        Ok(body.len() as u64)
    }

    fn artifact_url(&self, filename: &str) -> Result<String> {
        Ok(format!("mock://download/{filename}"))
    }
}
