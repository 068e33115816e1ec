/*
[INPUT]:  Region group identifier and province full code
[OUTPUT]: Ordered province and kabupaten option lists
[POS]:    HTTP layer - region hierarchy endpoints
[UPDATE]: When region endpoints change
*/

use crate::http::{FasihClient, Result};
use crate::types::{DataPayload, RegionOption};
use reqwest::Method;

impl FasihClient {
    /// GET /regions/provinsi?groupId={group_id}
    pub async fn provinces(&self, group_id: &str) -> Result<Vec<RegionOption>> {
        let builder = self.request(Method::GET, &["regions", "provinsi"], &[("groupId", group_id)])?;
        let envelope = self.send_envelope::<DataPayload<Vec<RegionOption>>>(builder).await?;
        Ok(envelope.payload.data)
    }

    /// GET /regions/kabupaten?groupId={group_id}&provFullCode={province_code}
    pub async fn kabupaten(&self, group_id: &str, province_code: &str) -> Result<Vec<RegionOption>> {
        let builder = self.request(
            Method::GET,
            &["regions", "kabupaten"],
            &[("groupId", group_id), ("provFullCode", province_code)],
        )?;
        let envelope = self.send_envelope::<DataPayload<Vec<RegionOption>>>(builder).await?;
        Ok(envelope.payload.data)
    }
}
