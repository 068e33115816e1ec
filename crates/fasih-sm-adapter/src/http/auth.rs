/*
[INPUT]:  Backend-held login session
[OUTPUT]: Session status and logout confirmation
[POS]:    HTTP layer - session endpoints (login/OTP stay in the web flow)
[UPDATE]: When session endpoints change
*/

use crate::http::{FasihClient, Result};
use crate::types::{AuthStatusResponse, Envelope};
use reqwest::Method;
use serde_json::Value;

impl FasihClient {
    /// Check whether the backend holds a logged-in upstream session
    ///
    /// GET /auth/status
    pub async fn session_status(&self) -> Result<bool> {
        let builder = self.request(Method::GET, &["auth", "status"], &[])?;
        let response: AuthStatusResponse = self.send_json(builder).await?;
        Ok(response.is_logged_in)
    }

    /// Drop the backend session and close its browser
    ///
    /// POST /auth/logout
    pub async fn logout(&self) -> Result<()> {
        let builder = self.request(Method::POST, &["auth", "logout"], &[])?;
        let _: Envelope<Value> = self.send_envelope(builder).await?;
        Ok(())
    }
}
