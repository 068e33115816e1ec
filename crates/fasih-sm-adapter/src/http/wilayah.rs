/*
[INPUT]:  Wilayah key triple and region group
[OUTPUT]: Cache existence/count and fetch results
[POS]:    HTTP layer - wilayah cache endpoints
[UPDATE]: When wilayah cache endpoints change
*/

use crate::http::{FasihClient, Result};
use crate::types::{
    Envelope, WilayahFetchPayload, WilayahFetchRequest, WilayahFetchResponse, WilayahKey,
    WilayahStatusResponse,
};
use reqwest::Method;

impl FasihClient {
    /// Check whether a cache entry exists for the key triple
    ///
    /// GET /wilayah/status?surveyId=&periodId=&kabId=
    pub async fn wilayah_status(&self, key: &WilayahKey) -> Result<WilayahStatusResponse> {
        let builder = self.request(
            Method::GET,
            &["wilayah", "status"],
            &[
                ("surveyId", key.survey_id.as_str()),
                ("periodId", key.period_id.as_str()),
                ("kabId", key.kab_id.as_str()),
            ],
        )?;
        let envelope = self.send_envelope::<WilayahStatusResponse>(builder).await?;
        Ok(envelope.payload)
    }

    /// Pull the working-area list live from upstream and cache it
    ///
    /// POST /wilayah/fetch
    pub async fn fetch_wilayah(&self, request: &WilayahFetchRequest) -> Result<WilayahFetchResponse> {
        let builder = self.request(Method::POST, &["wilayah", "fetch"], &[])?.json(request);
        let envelope: Envelope<WilayahFetchPayload> = self.send_envelope(builder).await?;
        Ok(WilayahFetchResponse {
            count: envelope.payload.count,
            message: envelope.message,
        })
    }
}
