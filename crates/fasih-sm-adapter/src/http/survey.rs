/*
[INPUT]:  Survey and period identifiers
[OUTPUT]: Survey list, survey detail with periods, caller role
[POS]:    HTTP layer - survey endpoints
[UPDATE]: When adding new survey endpoints or changing response format
*/

use crate::http::{FasihClient, Result};
use crate::types::{DataPayload, RoleResponse, Survey, SurveyDetail};
use reqwest::Method;

impl FasihClient {
    /// List surveys visible to the logged-in user
    ///
    /// GET /surveys
    pub async fn list_surveys(&self) -> Result<Vec<Survey>> {
        let builder = self.request(Method::GET, &["surveys"], &[])?;
        let envelope = self.send_envelope::<DataPayload<Vec<Survey>>>(builder).await?;
        Ok(envelope.payload.data)
    }

    /// Survey detail including periods, region group and latest template
    ///
    /// GET /surveys/{survey_id}
    pub async fn survey_detail(&self, survey_id: &str) -> Result<SurveyDetail> {
        let builder = self.request(Method::GET, &["surveys", survey_id], &[])?;
        let envelope = self.send_envelope::<DataPayload<SurveyDetail>>(builder).await?;
        Ok(envelope.payload.data)
    }

    /// Role label of the caller for a survey period (empty when unassigned)
    ///
    /// GET /surveys/{survey_id}/role/{period_id}
    pub async fn user_role(&self, survey_id: &str, period_id: &str) -> Result<String> {
        let builder = self.request(Method::GET, &["surveys", survey_id, "role", period_id], &[])?;
        let envelope = self.send_envelope::<DataPayload<RoleResponse>>(builder).await?;
        Ok(envelope.payload.data.role.unwrap_or_default())
    }
}
