#![forbid(unsafe_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use et_adapter::{build_router, route_path, AppState, CallbackFailureResponse};
use et_engines::case_access::{CaseAccessError, RoleAssignment};
use et_engines::idam::StaticTokenRuntime;
use et_kernel_contracts::case::CaseId;
use et_kernel_contracts::event::LifecycleEvent;
use et_os::access_roles::CaseAccessClient;
use et_os::clock::FixedClock;
use et_os::dispatcher::Dispatcher;
use et_os::gate::AuthorizationGate;
use et_storage::migration::{InMemoryMigrationLedger, MigrationRollbackRow, StorageError};
use et_storage::repo::MigrationRollbackRepo;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

const TOKEN: &str = "caseworker-token";

struct AcceptingCaseAccess;

impl CaseAccessClient for AcceptingCaseAccess {
    fn assign_case_role(
        &self,
        _case_id: &CaseId,
        _assignment: &RoleAssignment,
    ) -> Result<(), CaseAccessError> {
        Ok(())
    }
}

struct SlowLedger(Duration);

impl MigrationRollbackRepo for SlowLedger {
    fn migration_rollback_commit_row(
        &self,
        row: MigrationRollbackRow,
    ) -> Result<MigrationRollbackRow, StorageError> {
        std::thread::sleep(self.0);
        Ok(row)
    }

    fn migration_rollback_rows(
        &self,
        _case_id: &CaseId,
    ) -> Result<Vec<MigrationRollbackRow>, StorageError> {
        Ok(vec![])
    }
}

struct BrokenLedger;

impl MigrationRollbackRepo for BrokenLedger {
    fn migration_rollback_commit_row(
        &self,
        _row: MigrationRollbackRow,
    ) -> Result<MigrationRollbackRow, StorageError> {
        Err(StorageError::LockPoisoned)
    }

    fn migration_rollback_rows(
        &self,
        _case_id: &CaseId,
    ) -> Result<Vec<MigrationRollbackRow>, StorageError> {
        Ok(vec![])
    }
}

fn router_with(ledger: Arc<dyn MigrationRollbackRepo>, rollback_timeout: Duration) -> Router {
    let dispatcher = Dispatcher::standard(
        AuthorizationGate::new(Arc::new(StaticTokenRuntime::new([TOKEN]))),
        Arc::new(FixedClock {
            today: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        }),
        Arc::new(AcceptingCaseAccess),
        ledger,
    );
    build_router(AppState::new(Arc::new(dispatcher), rollback_timeout))
}

fn router() -> Router {
    router_with(
        Arc::new(InMemoryMigrationLedger::new_in_memory()),
        Duration::from_secs(5),
    )
}

fn callback(case_data: Value) -> Value {
    json!({
        "event_id": "test",
        "case_details": {
            "id": 1695134423958127u64,
            "case_type_id": "ET_EnglandWales",
            "jurisdiction": "EMPLOYMENT",
            "case_data": case_data
        }
    })
}

async fn post(app: Router, event: LifecycleEvent, token: Option<&str>, body: Value) -> (StatusCode, Vec<u8>) {
    let mut req = Request::builder()
        .method("POST")
        .uri(route_path(event))
        .header("content-type", "application/json");
    if let Some(token) = token {
        req = req.header("authorization", format!("Bearer {token}"));
    }
    let response = app
        .oneshot(req.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

#[tokio::test]
async fn at_http_01_healthz() {
    let response = router()
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn at_http_02_accepted_envelope_is_200_with_data() {
    let (status, bytes) = post(
        router(),
        LifecycleEvent::InitialiseCaseVetting,
        Some(TOKEN),
        callback(json!({"claimant": "Grace Hopper"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["data"]["et1VettingStage"], "Initialised");
    assert_eq!(body["data"]["claimant"], "Grace Hopper");
    assert_eq!(body["errors"], json!([]));
}

#[tokio::test]
async fn at_http_03_validation_errors_are_still_200() {
    let (status, bytes) = post(
        router(),
        LifecycleEvent::PreAcceptanceAboutToSubmit,
        None,
        callback(json!({
            "receiptDate": "2024-03-01",
            "preAcceptCase": {"caseAccepted": "No", "dateRejected": "2024-02-01"}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["receiptDate"], "2024-03-01");
}

#[tokio::test]
async fn at_http_04_gated_route_denies_without_valid_bearer() {
    for token in [None, Some("wrong")] {
        let (status, bytes) = post(
            router(),
            LifecycleEvent::HearingPreferencesMidEvent,
            token,
            callback(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(bytes.is_empty());
    }
}

#[tokio::test]
async fn at_http_05_malformed_body_and_case_id_are_400() {
    let (status, _) = post(
        router(),
        LifecycleEvent::TseRespondentAboutToSubmit,
        None,
        json!({"not": "a callback"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, bytes) = post(
        router(),
        LifecycleEvent::TseRespondentAboutToSubmit,
        None,
        json!({"case_details": {"id": "not-digits", "case_data": {}}}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: CallbackFailureResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body.status, "error");
}

#[tokio::test]
async fn at_http_06_rollback_hard_failure_is_500_not_an_envelope() {
    let app = router_with(Arc::new(BrokenLedger), Duration::from_secs(5));
    let (status, bytes) = post(
        app,
        LifecycleEvent::MigrationRollbackAboutToSubmit,
        None,
        callback(json!({
            "migrationRollback": {"migrationId": "m1", "previousValues": {"a": "b"}}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "error");
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn at_http_07_slow_rollback_times_out_with_504() {
    let app = router_with(
        Arc::new(SlowLedger(Duration::from_millis(400))),
        Duration::from_millis(50),
    );
    let (status, bytes) = post(
        app,
        LifecycleEvent::MigrationRollbackAboutToSubmit,
        None,
        callback(json!({
            "migrationRollback": {"migrationId": "m1", "previousValues": {"a": "b"}}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    let body: CallbackFailureResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body.reason, "migration rollback timed out");
}

#[tokio::test]
async fn at_http_08_tse_route_files_application() {
    let (status, bytes) = post(
        router(),
        LifecycleEvent::TseRespondentAboutToSubmit,
        None,
        callback(json!({
            "resTseSelectApplication": "Amend response",
            "resTseTextBox1": "Corrected dates"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    let history = body["data"]["genericTseApplicationCollection"].as_array().unwrap();
    assert_eq!(history[0]["value"]["applicant"], "Respondent");
    assert!(body["data"].get("resTseSelectApplication").is_none());
}

#[tokio::test]
async fn at_http_09_gated_route_denies_before_reporting_body_errors() {
    let (status, bytes) = post(
        router(),
        LifecycleEvent::InitialiseCaseVetting,
        None,
        json!({"case_details": {"id": "not-digits", "case_data": {}}}),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(bytes.is_empty());

    let (status, _) = post(
        router(),
        LifecycleEvent::InitialiseCaseVetting,
        Some(TOKEN),
        json!({"case_details": {"id": "not-digits", "case_data": {}}}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
