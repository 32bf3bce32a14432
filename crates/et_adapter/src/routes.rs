#![forbid(unsafe_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use et_kernel_contracts::callback::CallbackRequest;
use et_kernel_contracts::event::{Credential, LifecycleEvent};
use et_os::dispatcher::{DispatchOutcome, Dispatcher};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

#[derive(Clone)]
pub struct AppState {
    dispatcher: Arc<Dispatcher>,
    rollback_timeout: Duration,
}

impl AppState {
    pub fn new(dispatcher: Arc<Dispatcher>, rollback_timeout: Duration) -> Self {
        Self {
            dispatcher,
            rollback_timeout,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Body of every non-envelope failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackFailureResponse {
    pub status: String,
    pub reason: String,
}

pub fn route_path(event: LifecycleEvent) -> &'static str {
    match event {
        LifecycleEvent::ClaimantTransferredCase => "/caseTransfer/claimantTransferredCase",
        LifecycleEvent::InitialiseCaseVetting => "/et1Vetting/initialiseCaseVetting",
        LifecycleEvent::HearingPreferencesMidEvent => "/et1Repped/hearingPreferences/midEvent",
        LifecycleEvent::PreAcceptanceAboutToSubmit => "/preAcceptance/aboutToSubmit",
        LifecycleEvent::MigrationRollbackAboutToSubmit => "/migrate/rollback/aboutToSubmit",
        LifecycleEvent::TseRespondentAboutToSubmit => "/tseRespondent/aboutToSubmit",
    }
}

pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new().route("/healthz", get(healthz));
    for event in LifecycleEvent::ALL {
        router = router.route(
            route_path(event),
            post(
                move |State(state): State<AppState>, headers: HeaderMap, body: Bytes| async move {
                    run_callback(state, event, headers, body).await
                },
            ),
        );
    }
    router.with_state(state)
}

async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

fn failure(status: StatusCode, reason: String) -> Response {
    (
        status,
        Json(CallbackFailureResponse {
            status: "error".to_string(),
            reason,
        }),
    )
        .into_response()
}

/// A malformed or absent header yields no credential; the gate then denies
/// gated events and ungated events never look.
fn bearer_credential(headers: &HeaderMap) -> Option<Credential> {
    let raw = headers.get(AUTHORIZATION)?.to_str().ok()?;
    Credential::from_authorization_header(raw).ok()
}

/// Callers that fail the gate learn nothing about why their body was refused.
async fn reject_malformed(
    state: &AppState,
    event: LifecycleEvent,
    credential: Option<Credential>,
    reason: String,
) -> Response {
    if event.requires_authorization() {
        let dispatcher = state.dispatcher.clone();
        let authorized = tokio::task::spawn_blocking(move || {
            dispatcher.authorize(event, credential.as_ref())
        })
        .await
        .unwrap_or(false);
        if !authorized {
            warn!(%event, "authorization denied");
            return StatusCode::FORBIDDEN.into_response();
        }
    }
    warn!(%event, %reason, "callback body rejected");
    failure(StatusCode::BAD_REQUEST, reason)
}

async fn run_callback(
    state: AppState,
    event: LifecycleEvent,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let credential = bearer_credential(&headers);
    let parsed = serde_json::from_slice::<CallbackRequest>(&body)
        .map_err(|err| format!("invalid callback body: {err}"))
        .and_then(|request| request.into_case_record().map_err(|v| v.to_string()));
    let record = match parsed {
        Ok(record) => record,
        Err(reason) => return reject_malformed(&state, event, credential, reason).await,
    };

    let dispatcher = state.dispatcher.clone();
    let task = tokio::task::spawn_blocking(move || {
        dispatcher.dispatch(event, credential.as_ref(), record)
    });
    let joined = if event == LifecycleEvent::MigrationRollbackAboutToSubmit {
        match tokio::time::timeout(state.rollback_timeout, task).await {
            Ok(joined) => joined,
            Err(_) => {
                error!(%event, timeout_ms = state.rollback_timeout.as_millis() as u64, "rollback timed out");
                return failure(
                    StatusCode::GATEWAY_TIMEOUT,
                    "migration rollback timed out".to_string(),
                );
            }
        }
    } else {
        task.await
    };

    match joined {
        Ok(Ok(DispatchOutcome::Envelope(envelope))) => (StatusCode::OK, Json(envelope)).into_response(),
        Ok(Ok(DispatchOutcome::AuthorizationDenied)) => StatusCode::FORBIDDEN.into_response(),
        Ok(Err(err)) => failure(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        Err(join_err) => {
            error!(%event, error = %join_err, "dispatch task aborted");
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "dispatch task aborted".to_string(),
            )
        }
    }
}
