#![forbid(unsafe_code)]

use std::time::Duration;

pub const HTTP_TIMEOUT_MS_DEFAULT: u32 = 5_000;
pub const USER_AGENT: &str = concat!("et-callbacks/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
    pub timeout_ms: u32,
    pub user_agent: String,
}

impl HttpClientConfig {
    pub fn mvp_v1() -> Self {
        Self {
            timeout_ms: HTTP_TIMEOUT_MS_DEFAULT,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

pub fn build_http_agent(config: &HttpClientConfig) -> Result<ureq::Agent, String> {
    if config.timeout_ms == 0 {
        return Err("timeout must be > 0".to_string());
    }
    let timeout = Duration::from_millis(u64::from(config.timeout_ms).max(100));
    Ok(ureq::AgentBuilder::new()
        .timeout_connect(timeout)
        .timeout_read(timeout)
        .timeout_write(timeout)
        .user_agent(&config.user_agent)
        .try_proxy_from_env(false)
        .build())
}

pub fn classify_ureq_error(err: &ureq::Error) -> String {
    match err {
        ureq::Error::Status(status, _) => format!("http_status_{status}"),
        ureq::Error::Transport(transport) => {
            let combined = format!("{:?} {}", transport.kind(), transport);
            classify_transport_error_kind(&combined).to_string()
        }
    }
}

fn classify_transport_error_kind(raw: &str) -> &'static str {
    let lower = raw.to_ascii_lowercase();
    if lower.contains("timeout") || lower.contains("timed out") {
        "timeout"
    } else if lower.contains("tls") || lower.contains("ssl") {
        "tls"
    } else if lower.contains("dns") {
        "dns"
    } else if lower.contains("connection") || lower.contains("connect") {
        "connection"
    } else {
        "transport"
    }
}
