/*
[INPUT]:  ConsoleSession over a real FasihClient and a wiremock backend
[OUTPUT]: End-to-end operator flows from survey selection to history
[POS]:    Integration test layer - full console verification
[UPDATE]: When adding new integration scenarios
*/

use std::sync::Arc;
use std::time::Duration;

use fasih_sm_adapter::{ActionKind, ClientConfig, FasihClient, TaskStatus};
use fasih_sm_console::{ConsoleError, ConsoleSession, WilayahPhase, wait_for_terminal};
use tokio::time::timeout;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const POLL: Duration = Duration::from_millis(20);

fn session_for(server: &MockServer) -> ConsoleSession {
    let client = FasihClient::with_config_and_base_url(
        ClientConfig::default(),
        &format!("{}/api", server.uri()),
    )
    .expect("client init");
    ConsoleSession::new(Arc::new(client), POLL)
}

fn ok(body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

/// Session, survey, region and role endpoints shared by every flow
async fn mount_selection(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/auth/status"))
        .respond_with(ok(serde_json::json!({"is_logged_in": true})))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/surveys"))
        .respond_with(ok(serde_json::json!({
            "success": true,
            "data": [
                {"id": "S1", "name": "SUSENAS 2026", "surveyType": "Pencacahan", "regionGroupId": "G1"}
            ]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/surveys/S1"))
        .respond_with(ok(serde_json::json!({
            "success": true,
            "data": {
                "id": "S1",
                "name": "SUSENAS 2026",
                "regionGroupId": "G1",
                "templateId": "T1",
                "periods": [
                    {"id": "P1", "name": "Maret"},
                    {"id": "P2", "name": "September"}
                ]
            }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/surveys/S1/role/P1"))
        .respond_with(ok(serde_json::json!({"success": true, "data": {"role": "Pengawas"}})))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/regions/provinsi"))
        .and(query_param("groupId", "G1"))
        .respond_with(ok(serde_json::json!({
            "success": true,
            "data": [{"id": "PR35", "name": "JAWA TIMUR", "code": "35", "fullCode": "35"}]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/regions/kabupaten"))
        .and(query_param("provFullCode", "35"))
        .respond_with(ok(serde_json::json!({
            "success": true,
            "data": [
                {"id": "K1", "name": "KOTA MALANG", "code": "73", "fullCode": "3573"},
                {"id": "K2", "name": "MALANG", "code": "07", "fullCode": "3507"}
            ]
        })))
        .mount(server)
        .await;
}

async fn select_down_to(session: &ConsoleSession, kabupaten_id: &str) {
    session.start().await.expect("start");
    session.select_survey("S1").await;
    session.select_period("P1").await;
    session.select_province("35").await;
    session.select_kabupaten(kabupaten_id).await;
}

/// Approve on a cached kabupaten: check hit, two polls, history grows afterwards
#[tokio::test]
async fn test_approve_flow_with_cached_wilayah() {
    let server = MockServer::start().await;
    mount_selection(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/wilayah/status"))
        .and(query_param("kabId", "K1"))
        .respond_with(ok(serde_json::json!({"success": true, "exists": true, "count": 42})))
        .mount(&server)
        .await;
    // Cache hit must not trigger a fetch
    Mock::given(method("POST"))
        .and(path("/api/wilayah/fetch"))
        .respond_with(ok(serde_json::json!({"success": true, "count": 0})))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/action/approve"))
        .and(body_partial_json(serde_json::json!({
            "surveyId": "S1",
            "periodId": "P1",
            "templateId": "T1",
            "groupId": "G1",
            "kabId": "K1",
            "kabName": "KOTA MALANG"
        })))
        .respond_with(ok(serde_json::json!({"success": true, "taskId": "task-approve"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/action/progress/task-approve"))
        .respond_with(ok(serde_json::json!({
            "success": true,
            "data": {"status": "running", "progress": 0, "message": "Starting", "logs": ["login ok"]}
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/action/progress/task-approve"))
        .respond_with(ok(serde_json::json!({
            "success": true,
            "data": {
                "status": "completed",
                "progress": 100,
                "message": "Approved 40 of 42",
                "logs": ["login ok", "done"],
                "filename": "approve_log_3573.txt",
                "total_assignments": 42,
                "success_count": 40,
                "fail_count": 1,
                "skip_count": 1
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/action/history"))
        .respond_with(ok(serde_json::json!({"success": true, "history": []})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/action/history"))
        .respond_with(ok(serde_json::json!({
            "success": true,
            "history": [{
                "filename": "approve_log_3573.txt",
                "type": "log",
                "timestamp": "2026-10-19T09:30:00",
                "size": 2048
            }]
        })))
        .mount(&server)
        .await;

    let session = session_for(&server);
    select_down_to(&session, "K1").await;

    let state = session.selection();
    assert_eq!(state.role, "Pengawas");
    assert_eq!(state.kabupaten_name, "KOTA MALANG");
    assert_eq!(state.wilayah.phase, WilayahPhase::Ready);
    assert_eq!(state.wilayah.count, 42);
    assert!(session.history().is_empty());
    assert!(session.can_dispatch());

    let mut view = session.dispatch(ActionKind::Approve).await.expect("dispatch");
    assert_eq!(session.active_task_id().as_deref(), Some("task-approve"));

    let finished = timeout(Duration::from_secs(5), wait_for_terminal(&mut view))
        .await
        .expect("task should finish");
    assert_eq!(finished.status, TaskStatus::Completed);
    assert_eq!(finished.progress, 100);
    let counters = finished.counters.expect("counters");
    assert_eq!(counters.success, Some(40));
    assert_eq!(
        finished.artifact.as_ref().map(|a| a.filename.as_str()),
        Some("approve_log_3573.txt")
    );

    session.close_task().await;
    assert!(session.active_task_id().is_none());
    assert_eq!(session.history().len(), 1);
}

/// Cache miss fetches the wilayah, then a column-subset raw download is dispatched
#[tokio::test]
async fn test_download_flow_fetches_missing_wilayah() {
    let server = MockServer::start().await;
    mount_selection(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/wilayah/status"))
        .and(query_param("kabId", "K2"))
        .respond_with(ok(serde_json::json!({"success": true, "exists": false})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/wilayah/fetch"))
        .and(body_partial_json(serde_json::json!({"kabId": "K2", "groupId": "G1"})))
        .respond_with(ok(serde_json::json!({
            "success": true,
            "message": "Fetched 311 smallcodes",
            "count": 311
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/action/get-columns"))
        .and(query_param("surveyName", "SUSENAS 2026"))
        .respond_with(ok(serde_json::json!({
            "success": true,
            "columns": ["kode_prov", "kode_kab", "nama_krt", "jumlah_art"],
            "fromFile": "SUSENAS_2026_3573.xlsx"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/action/download-raw"))
        .and(body_partial_json(serde_json::json!({
            "kabId": "K2",
            "selectedColumns": ["kode_kab", "jumlah_art"]
        })))
        .respond_with(ok(serde_json::json!({"success": true, "taskId": "task-raw"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/action/progress/task-raw"))
        .respond_with(ok(serde_json::json!({
            "success": true,
            "data": {
                "status": "completed",
                "progress": 100,
                "message": "Download complete",
                "filename": "SUSENAS_2026_3507.xlsx"
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/action/history"))
        .respond_with(ok(serde_json::json!({"success": true, "history": []})))
        .mount(&server)
        .await;

    let session = session_for(&server);
    select_down_to(&session, "K2").await;

    let state = session.selection();
    assert_eq!(state.wilayah.phase, WilayahPhase::Ready);
    assert_eq!(state.wilayah.count, 311);

    let mut columns = session.download_catalog().await.expect("catalog");
    assert!(columns.all_selected());
    columns.clear();
    assert!(matches!(
        session.dispatch_download(Some(&columns)).await,
        Err(ConsoleError::NoColumnsSelected)
    ));
    // Ticked out of order, sent in catalog order
    columns.toggle("jumlah_art");
    columns.toggle("kode_kab");

    let mut view = session
        .dispatch_download(Some(&columns))
        .await
        .expect("dispatch");
    let finished = timeout(Duration::from_secs(5), wait_for_terminal(&mut view))
        .await
        .expect("task should finish");
    assert_eq!(finished.status, TaskStatus::Completed);
    assert_eq!(
        finished.artifact.map(|a| a.filename),
        Some("SUSENAS_2026_3507.xlsx".to_string())
    );
}

#[tokio::test]
async fn test_start_requires_backend_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/status"))
        .respond_with(ok(serde_json::json!({"is_logged_in": false})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/surveys"))
        .respond_with(ok(serde_json::json!({"success": true, "data": []})))
        .expect(0)
        .mount(&server)
        .await;

    let session = session_for(&server);
    assert!(matches!(session.start().await, Err(ConsoleError::NotLoggedIn)));
    assert!(session.selection().surveys.is_empty());
}
