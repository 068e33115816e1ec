/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for fasih-sm-adapter tests

use fasih_sm_adapter::{ActionRequest, ClientConfig, FasihClient};
use wiremock::MockServer;

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Client pointed at the mock server's `/api` prefix
pub fn client_for(server: &MockServer) -> FasihClient {
    FasihClient::with_config_and_base_url(ClientConfig::default(), &format!("{}/api", server.uri()))
        .expect("client init")
}

/// Fully resolved dispatch context
#[allow(dead_code)]
pub fn sample_action_request() -> ActionRequest {
    ActionRequest {
        survey_id: "s-1".to_string(),
        period_id: "p-1".to_string(),
        template_id: "t-1".to_string(),
        group_id: "g-1".to_string(),
        kab_id: "k-1".to_string(),
        kab_name: "KOTA MALANG".to_string(),
        survey_name: "SUSENAS 2026".to_string(),
        period_name: "Maret".to_string(),
        selected_columns: None,
    }
}
