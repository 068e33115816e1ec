/*
[INPUT]:  Region group id and province full code
[OUTPUT]: Ordered province / kabupaten option lists, straight from the backend
[POS]:    Engine layer - region hierarchy lookups
[UPDATE]: When region lookups need caching or new levels
*/

use std::sync::Arc;

use fasih_sm_adapter::{RegionOption, Result};
use tracing::debug;

use crate::backend::ConsoleBackend;

/// Read-through resolver; nothing is cached between calls.
#[derive(Clone)]
pub struct RegionResolver {
    backend: Arc<dyn ConsoleBackend>,
}

impl RegionResolver {
    pub fn new(backend: Arc<dyn ConsoleBackend>) -> Self {
        Self { backend }
    }

    pub async fn provinces(&self, group_id: &str) -> Result<Vec<RegionOption>> {
        let provinces = self.backend.provinces(group_id).await?;
        debug!(group_id, count = provinces.len(), "provinces resolved");
        Ok(provinces)
    }

    /// Kabupaten under a province, addressed by the province's `full_code`
    pub async fn kabupaten(&self, group_id: &str, province_full_code: &str) -> Result<Vec<RegionOption>> {
        let kabupaten = self.backend.kabupaten(group_id, province_full_code).await?;
        debug!(
            group_id,
            province = province_full_code,
            count = kabupaten.len(),
            "kabupaten resolved"
        );
        Ok(kabupaten)
    }
}
