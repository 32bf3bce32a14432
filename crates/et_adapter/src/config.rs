#![forbid(unsafe_code)]

use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use et_engines::http::HTTP_TIMEOUT_MS_DEFAULT;
use thiserror::Error;

pub const DEFAULT_HTTP_BIND: &str = "127.0.0.1:4550";
pub const ROLLBACK_TIMEOUT_MS_DEFAULT: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// How bearer credentials on gated events are checked.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMode {
    Static { tokens: Vec<String> },
    Idam { base_url: String },
}

impl AuthMode {
    pub fn mode_name(&self) -> &'static str {
        match self {
            AuthMode::Static { .. } => "static",
            AuthMode::Idam { .. } => "idam",
        }
    }
}

impl fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::Static { tokens } => f
                .debug_struct("Static")
                .field("token_count", &tokens.len())
                .finish(),
            AuthMode::Idam { base_url } => {
                f.debug_struct("Idam").field("base_url", base_url).finish()
            }
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    pub bind: SocketAddr,
    pub auth: AuthMode,
    pub case_access_url: String,
    pub service_token: Option<String>,
    pub http_timeout_ms: u32,
    pub migration_ledger_path: Option<PathBuf>,
    pub rollback_timeout: Duration,
}

impl fmt::Debug for AdapterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterConfig")
            .field("bind", &self.bind)
            .field("auth", &self.auth)
            .field("case_access_url", &self.case_access_url)
            .field("service_token", &self.service_token.as_ref().map(|_| "<redacted>"))
            .field("http_timeout_ms", &self.http_timeout_ms)
            .field("migration_ledger_path", &self.migration_ledger_path)
            .field("rollback_timeout", &self.rollback_timeout)
            .finish()
    }
}

impl AdapterConfig {
    pub fn from_env() -> Result<Self, AdapterConfigError> {
        Self::from_env_var_map(|key| env::var(key).ok())
    }

    pub fn from_env_var_map<F>(lookup: F) -> Result<Self, AdapterConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_raw = var("ET_HTTP_BIND").unwrap_or_else(|| DEFAULT_HTTP_BIND.to_string());
        let bind = bind_raw
            .parse::<SocketAddr>()
            .map_err(|err| AdapterConfigError::Invalid {
                var: "ET_HTTP_BIND",
                reason: err.to_string(),
            })?;

        let auth = match var("ET_AUTH_MODE")
            .map(|v| v.to_ascii_lowercase())
            .as_deref()
        {
            None | Some("static") => {
                let tokens: Vec<String> = var("ET_STATIC_TOKENS")
                    .ok_or(AdapterConfigError::Missing("ET_STATIC_TOKENS"))?
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect();
                if tokens.is_empty() {
                    return Err(AdapterConfigError::Missing("ET_STATIC_TOKENS"));
                }
                AuthMode::Static { tokens }
            }
            Some("idam") => AuthMode::Idam {
                base_url: var("ET_IDAM_URL").ok_or(AdapterConfigError::Missing("ET_IDAM_URL"))?,
            },
            Some(other) => {
                return Err(AdapterConfigError::Invalid {
                    var: "ET_AUTH_MODE",
                    reason: format!("expected static or idam, got {other}"),
                })
            }
        };

        let case_access_url =
            var("ET_CASE_ACCESS_URL").ok_or(AdapterConfigError::Missing("ET_CASE_ACCESS_URL"))?;

        let http_timeout_ms = parse_bounded_ms(
            var("ET_HTTP_TIMEOUT_MS"),
            "ET_HTTP_TIMEOUT_MS",
            100..=60_000,
            u64::from(HTTP_TIMEOUT_MS_DEFAULT),
        )? as u32;
        let rollback_timeout_ms = parse_bounded_ms(
            var("ET_ROLLBACK_TIMEOUT_MS"),
            "ET_ROLLBACK_TIMEOUT_MS",
            100..=120_000,
            ROLLBACK_TIMEOUT_MS_DEFAULT,
        )?;

        Ok(Self {
            bind,
            auth,
            case_access_url,
            service_token: var("ET_SERVICE_TOKEN"),
            http_timeout_ms,
            migration_ledger_path: var("ET_MIGRATION_LEDGER_PATH").map(PathBuf::from),
            rollback_timeout: Duration::from_millis(rollback_timeout_ms),
        })
    }
}

fn parse_bounded_ms(
    raw: Option<String>,
    var: &'static str,
    range: std::ops::RangeInclusive<u64>,
    default: u64,
) -> Result<u64, AdapterConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let value = raw.parse::<u64>().map_err(|err| AdapterConfigError::Invalid {
        var,
        reason: err.to_string(),
    })?;
    if !range.contains(&value) {
        return Err(AdapterConfigError::Invalid {
            var,
            reason: format!("must be within {}..={}", range.start(), range.end()),
        });
    }
    Ok(value)
}
