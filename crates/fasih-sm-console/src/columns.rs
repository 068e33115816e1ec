/*
[INPUT]:  Survey name or artifact filename; operator column clicks
[OUTPUT]: Authoritative column catalogs and the picker model built on them
[POS]:    Engine layer - column catalog and selection
[UPDATE]: When the picker gains new bulk operations
*/

use std::collections::HashSet;
use std::sync::Arc;

use fasih_sm_adapter::{ColumnCatalog, Result};
use tracing::debug;

use crate::backend::ConsoleBackend;

#[derive(Clone)]
pub struct ColumnCatalogResolver {
    backend: Arc<dyn ConsoleBackend>,
}

impl ColumnCatalogResolver {
    pub fn new(backend: Arc<dyn ConsoleBackend>) -> Self {
        Self { backend }
    }

    /// Columns of the most recent raw download for `survey_name`
    pub async fn for_survey(&self, survey_name: &str) -> Result<ColumnCatalog> {
        let catalog = self.backend.columns_for_survey(survey_name).await?;
        debug!(
            survey = survey_name,
            count = catalog.columns.len(),
            source = catalog.source_file.as_deref().unwrap_or("-"),
            "survey columns resolved"
        );
        Ok(catalog)
    }

    pub async fn for_file(&self, filename: &str) -> Result<ColumnCatalog> {
        let catalog = self.backend.columns_for_file(filename).await?;
        debug!(filename, count = catalog.columns.len(), "file columns resolved");
        Ok(catalog)
    }
}

/// Picker state over a catalog. Output order is always the catalog's.
///
/// Columns are addressed by name, so a repeated name in the source catalog is kept
/// once, at its first position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSelection {
    catalog: Vec<String>,
    selected: HashSet<String>,
}

impl ColumnSelection {
    /// Starts with every column selected
    pub fn new(catalog: Vec<String>) -> Self {
        let catalog = unique_in_order(catalog);
        let selected = catalog.iter().cloned().collect();
        Self { catalog, selected }
    }

    /// Starts with nothing selected
    pub fn empty(catalog: Vec<String>) -> Self {
        Self {
            catalog: unique_in_order(catalog),
            selected: HashSet::new(),
        }
    }

    pub fn catalog(&self) -> &[String] {
        &self.catalog
    }

    /// "no columns available" is a state, not an error
    pub fn is_unavailable(&self) -> bool {
        self.catalog.is_empty()
    }

    pub fn is_selected(&self, column: &str) -> bool {
        self.selected.contains(column)
    }

    /// Flip one column; unknown names are ignored. Returns the new state.
    pub fn toggle(&mut self, column: &str) -> bool {
        if !self.catalog.iter().any(|c| c == column) {
            return false;
        }
        if !self.selected.remove(column) {
            self.selected.insert(column.to_string());
            return true;
        }
        false
    }

    pub fn select_all(&mut self) {
        self.selected = self.catalog.iter().cloned().collect();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Case-insensitive substring filter, catalog order preserved
    pub fn matching<'a>(&'a self, query: &str) -> Vec<&'a str> {
        let needle = query.trim().to_lowercase();
        self.catalog
            .iter()
            .filter(|column| needle.is_empty() || column.to_lowercase().contains(&needle))
            .map(String::as_str)
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn total_count(&self) -> usize {
        self.catalog.len()
    }

    pub fn all_selected(&self) -> bool {
        !self.catalog.is_empty() && self.selected.len() == self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn ordered(&self) -> Vec<String> {
        self.catalog
            .iter()
            .filter(|column| self.selected.contains(column.as_str()))
            .cloned()
            .collect()
    }
}

fn unique_in_order(columns: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    columns
        .into_iter()
        .filter(|column| seen.insert(column.clone()))
        .collect()
}

impl From<ColumnCatalog> for ColumnSelection {
    fn from(catalog: ColumnCatalog) -> Self {
        Self::new(catalog.columns)
    }
}
