#![forbid(unsafe_code)]

pub mod config;
pub mod routes;
pub mod runtime;

pub use config::{AdapterConfig, AdapterConfigError, AuthMode};
pub use routes::{build_router, route_path, AppState, CallbackFailureResponse, HealthResponse};
pub use runtime::{build_dispatcher, AdapterStartupError};
