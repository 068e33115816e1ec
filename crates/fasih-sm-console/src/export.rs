/*
[INPUT]:  Downloaded artifact filename + operator column selection
[OUTPUT]: Filtered artifact on the backend, history refreshed to show it
[POS]:    Engine layer - export filter sub-workflow
[UPDATE]: When export gains options beyond column subsets
*/

use std::sync::Arc;

use fasih_sm_adapter::ExportResult;
use tracing::info;

use crate::backend::ConsoleBackend;
use crate::columns::{ColumnCatalogResolver, ColumnSelection};
use crate::error::{ConsoleError, Result};
use crate::history::HistoryLog;

pub struct ExportWorkflow {
    backend: Arc<dyn ConsoleBackend>,
    columns: ColumnCatalogResolver,
    history: Arc<HistoryLog>,
}

impl ExportWorkflow {
    pub fn new(backend: Arc<dyn ConsoleBackend>, history: Arc<HistoryLog>) -> Self {
        Self {
            columns: ColumnCatalogResolver::new(backend.clone()),
            backend,
            history,
        }
    }

    /// Load the artifact's columns into a picker, all selected
    pub async fn open(&self, filename: &str) -> Result<ColumnSelection> {
        let catalog = self.columns.for_file(filename).await?;
        Ok(ColumnSelection::from(catalog))
    }

    pub async fn export(&self, filename: &str, selection: &ColumnSelection) -> Result<ExportResult> {
        if selection.is_empty() {
            return Err(ConsoleError::NoColumnsSelected);
        }
        let columns = selection.ordered();
        let result = self.backend.export_filtered(filename, &columns).await?;
        info!(
            source = filename,
            filename = %result.filename,
            columns = result.columns_count,
            rows = result.rows_count,
            "filtered export written"
        );
        self.history.refresh().await;
        Ok(result)
    }
}
