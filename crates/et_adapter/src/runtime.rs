#![forbid(unsafe_code)]

use std::sync::Arc;

use et_engines::case_access::{CaseAccessConfig, CaseAccessRuntime};
use et_engines::http::HttpClientConfig;
use et_engines::idam::{IdamConfig, IdamTokenRuntime, StaticTokenRuntime};
use et_os::access_roles::CaseAccessClient;
use et_os::clock::SystemClock;
use et_os::dispatcher::Dispatcher;
use et_os::gate::{AuthorizationGate, TokenVerifier};
use et_storage::migration::{InMemoryMigrationLedger, JsonlMigrationLedger, StorageError};
use et_storage::repo::MigrationRollbackRepo;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{AdapterConfig, AdapterConfigError, AuthMode};

#[derive(Debug, Error)]
pub enum AdapterStartupError {
    #[error(transparent)]
    Config(#[from] AdapterConfigError),
    #[error("http client setup failed: {0}")]
    HttpClient(String),
    #[error("migration ledger unavailable: {0}")]
    Storage(#[from] StorageError),
}

/// Wires the production collaborators named by `config` into a dispatcher.
pub fn build_dispatcher(config: &AdapterConfig) -> Result<Dispatcher, AdapterStartupError> {
    let http = HttpClientConfig {
        timeout_ms: config.http_timeout_ms,
        ..HttpClientConfig::mvp_v1()
    };

    let verifier: Arc<dyn TokenVerifier> = match &config.auth {
        AuthMode::Static { tokens } => Arc::new(StaticTokenRuntime::new(tokens.iter().cloned())),
        AuthMode::Idam { base_url } => Arc::new(
            IdamTokenRuntime::new(&IdamConfig {
                base_url: base_url.clone(),
                http: http.clone(),
            })
            .map_err(AdapterStartupError::HttpClient)?,
        ),
    };

    let case_access: Arc<dyn CaseAccessClient> = Arc::new(
        CaseAccessRuntime::new(&CaseAccessConfig {
            base_url: config.case_access_url.clone(),
            service_token: config.service_token.clone(),
            http,
        })
        .map_err(AdapterStartupError::HttpClient)?,
    );
    if config.service_token.is_none() {
        warn!("ET_SERVICE_TOKEN unset; case access calls carry no service authorization");
    }

    let ledger: Arc<dyn MigrationRollbackRepo> = match &config.migration_ledger_path {
        Some(path) => {
            let ledger = JsonlMigrationLedger::open(path.clone())?;
            info!(path = %ledger.path().display(), "migration ledger opened");
            Arc::new(ledger)
        }
        None => {
            warn!("ET_MIGRATION_LEDGER_PATH unset; rollback ledger is in memory only");
            Arc::new(InMemoryMigrationLedger::new_in_memory())
        }
    };

    Ok(Dispatcher::standard(
        AuthorizationGate::new(verifier),
        Arc::new(SystemClock),
        case_access,
        ledger,
    ))
}
