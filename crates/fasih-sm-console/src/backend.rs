/*
[INPUT]:  FasihClient or any other implementation of the backend contract
[OUTPUT]: Object-safe async seam used by every engine component
[POS]:    Integration layer - boundary to the automation backend
[UPDATE]: When the engine needs a new backend operation
*/

use std::path::Path;

use async_trait::async_trait;
use fasih_sm_adapter::{
    ActionKind, ActionRequest, ColumnCatalog, ExportResult, FasihClient, HistoryItem,
    RegionOption, Result, Survey, SurveyDetail, TaskProgress, WilayahFetchRequest,
    WilayahFetchResponse, WilayahKey, WilayahStatusResponse,
};

/// Everything the console needs from the automation backend.
#[async_trait]
pub trait ConsoleBackend: Send + Sync {
    async fn session_status(&self) -> Result<bool>;
    async fn logout(&self) -> Result<()>;

    async fn list_surveys(&self) -> Result<Vec<Survey>>;
    async fn survey_detail(&self, survey_id: &str) -> Result<SurveyDetail>;
    async fn user_role(&self, survey_id: &str, period_id: &str) -> Result<String>;

    async fn provinces(&self, group_id: &str) -> Result<Vec<RegionOption>>;
    async fn kabupaten(&self, group_id: &str, province_code: &str) -> Result<Vec<RegionOption>>;

    async fn wilayah_status(&self, key: &WilayahKey) -> Result<WilayahStatusResponse>;
    async fn fetch_wilayah(&self, request: &WilayahFetchRequest) -> Result<WilayahFetchResponse>;

    async fn dispatch_action(&self, kind: ActionKind, request: &ActionRequest) -> Result<String>;
    async fn task_progress(&self, task_id: &str) -> Result<TaskProgress>;

    async fn columns_for_survey(&self, survey_name: &str) -> Result<ColumnCatalog>;
    async fn columns_for_file(&self, filename: &str) -> Result<ColumnCatalog>;
    async fn export_filtered(&self, filename: &str, columns: &[String]) -> Result<ExportResult>;

    async fn history(&self) -> Result<Vec<HistoryItem>>;
    async fn download_artifact(&self, filename: &str, dest: &Path) -> Result<u64>;
    fn artifact_url(&self, filename: &str) -> Result<String>;
}

#[async_trait]
impl ConsoleBackend for FasihClient {
    async fn session_status(&self) -> Result<bool> {
        FasihClient::session_status(self).await
    }

    async fn logout(&self) -> Result<()> {
        FasihClient::logout(self).await
    }

    async fn list_surveys(&self) -> Result<Vec<Survey>> {
        FasihClient::list_surveys(self).await
    }

    async fn survey_detail(&self, survey_id: &str) -> Result<SurveyDetail> {
        FasihClient::survey_detail(self, survey_id).await
    }

    async fn user_role(&self, survey_id: &str, period_id: &str) -> Result<String> {
        FasihClient::user_role(self, survey_id, period_id).await
    }

    async fn provinces(&self, group_id: &str) -> Result<Vec<RegionOption>> {
        FasihClient::provinces(self, group_id).await
    }

    async fn kabupaten(&self, group_id: &str, province_code: &str) -> Result<Vec<RegionOption>> {
        FasihClient::kabupaten(self, group_id, province_code).await
    }

    async fn wilayah_status(&self, key: &WilayahKey) -> Result<WilayahStatusResponse> {
        FasihClient::wilayah_status(self, key).await
    }

    async fn fetch_wilayah(&self, request: &WilayahFetchRequest) -> Result<WilayahFetchResponse> {
        FasihClient::fetch_wilayah(self, request).await
    }

    async fn dispatch_action(&self, kind: ActionKind, request: &ActionRequest) -> Result<String> {
        FasihClient::dispatch_action(self, kind, request).await
    }

    async fn task_progress(&self, task_id: &str) -> Result<TaskProgress> {
        FasihClient::task_progress(self, task_id).await
    }

    async fn columns_for_survey(&self, survey_name: &str) -> Result<ColumnCatalog> {
        FasihClient::columns_for_survey(self, survey_name).await
    }

    async fn columns_for_file(&self, filename: &str) -> Result<ColumnCatalog> {
        FasihClient::columns_for_file(self, filename).await
    }

    async fn export_filtered(&self, filename: &str, columns: &[String]) -> Result<ExportResult> {
        FasihClient::export_filtered(self, filename, columns).await
    }

    async fn history(&self) -> Result<Vec<HistoryItem>> {
        FasihClient::history(self).await
    }

    async fn download_artifact(&self, filename: &str, dest: &Path) -> Result<u64> {
        FasihClient::download_artifact(self, filename, dest).await
    }

    fn artifact_url(&self, filename: &str) -> Result<String> {
        FasihClient::artifact_url(self, filename)
    }
}
