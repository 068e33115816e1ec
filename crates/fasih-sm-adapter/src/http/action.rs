/*
[INPUT]:  Action kind with resolved context, task ids, artifact filenames
[OUTPUT]: Task ids, progress snapshots, column catalogs, export results, history, file bytes
[POS]:    HTTP layer - action/task/artifact endpoints
[UPDATE]: When adding new action endpoints or changing task payloads
[UPDATE]: 2026-10-14 Stream artifact downloads to disk instead of buffering
[UPDATE]: 2026-10-20 Download into a .part file and rename once complete
*/

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::{Method, Response};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::http::{FasihClient, Result};
use crate::types::{
    ActionKind, ActionRequest, ColumnCatalog, ColumnsPayload, DataPayload, DispatchPayload,
    Envelope, ExportFilteredRequest, ExportResult, HistoryItem, HistoryPayload, TaskProgress,
};

impl FasihClient {
    /// Start a background action and return its task id
    ///
    /// POST /action/{download-raw|approve|revoke|reject}
    pub async fn dispatch_action(&self, kind: ActionKind, request: &ActionRequest) -> Result<String> {
        let builder = self
            .request(Method::POST, &["action", kind.as_path()], &[])?
            .json(request);
        let envelope: Envelope<DispatchPayload> = self.send_envelope(builder).await?;
        Ok(envelope.payload.task_id)
    }

    /// GET /action/progress/{task_id}
    pub async fn task_progress(&self, task_id: &str) -> Result<TaskProgress> {
        let builder = self.request(Method::GET, &["action", "progress", task_id], &[])?;
        let envelope = self.send_envelope::<DataPayload<TaskProgress>>(builder).await?;
        Ok(envelope.payload.data)
    }

    /// Ordered columns of the latest raw download for a survey
    ///
    /// GET /action/get-columns?surveyName={survey_name}
    pub async fn columns_for_survey(&self, survey_name: &str) -> Result<ColumnCatalog> {
        let builder = self.request(
            Method::GET,
            &["action", "get-columns"],
            &[("surveyName", survey_name)],
        )?;
        let envelope: Envelope<ColumnsPayload> = self.send_envelope(builder).await?;
        Ok(envelope.payload.into())
    }

    /// GET /action/get-file-columns/{filename}
    pub async fn columns_for_file(&self, filename: &str) -> Result<ColumnCatalog> {
        let builder = self.request(Method::GET, &["action", "get-file-columns", filename], &[])?;
        let envelope: Envelope<ColumnsPayload> = self.send_envelope(builder).await?;
        Ok(envelope.payload.into())
    }

    /// Write a new artifact holding only `columns` of an existing one
    ///
    /// POST /action/export-filtered/{filename}
    pub async fn export_filtered(&self, filename: &str, columns: &[String]) -> Result<ExportResult> {
        let body = ExportFilteredRequest {
            selected_columns: columns.to_vec(),
        };
        let builder = self
            .request(Method::POST, &["action", "export-filtered", filename], &[])?
            .json(&body);
        let envelope: Envelope<ExportResult> = self.send_envelope(builder).await?;
        Ok(envelope.payload)
    }

    /// GET /action/history
    pub async fn history(&self) -> Result<Vec<HistoryItem>> {
        let builder = self.request(Method::GET, &["action", "history"], &[])?;
        let envelope: Envelope<HistoryPayload> = self.send_envelope(builder).await?;
        Ok(envelope.payload.history)
    }

    /// Direct download URL of an artifact
    pub fn artifact_url(&self, filename: &str) -> Result<String> {
        Ok(self
            .endpoint_url(&["action", "download-file", filename], &[])?
            .to_string())
    }

    /// Stream an artifact to `dest`, returning the number of bytes written.
    ///
    /// Bytes land in a sibling `.part` file that is renamed over `dest` only once the
    /// body is complete, so a broken transfer never leaves a file under the final name.
    ///
    /// GET /action/download-file/{filename}
    pub async fn download_artifact(&self, filename: &str, dest: &Path) -> Result<u64> {
        let builder = self.request(Method::GET, &["action", "download-file", filename], &[])?;
        let response = self.send_raw(builder).await?;

        let partial = partial_path(dest);
        let written = match stream_to_file(response, &partial).await {
            Ok(written) => written,
            Err(err) => {
                if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                    warn!(path = %partial.display(), "failed to remove partial download: {cleanup}");
                }
                return Err(err);
            }
        };
        tokio::fs::rename(&partial, dest).await?;

        info!(filename, dest = %dest.display(), bytes = written, "artifact downloaded");
        Ok(written)
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

async fn stream_to_file(response: Response, path: &Path) -> Result<u64> {
    let mut file = File::create(path).await?;
    let mut stream = response.bytes_stream();
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}
