#![forbid(unsafe_code)]

use subtle::ConstantTimeEq;

use crate::http::{build_http_agent, classify_ureq_error, HttpClientConfig};

/// Shared-secret verifier for environments without an identity service.
#[derive(Clone)]
pub struct StaticTokenRuntime {
    tokens: Vec<String>,
}

impl StaticTokenRuntime {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(|t| {
                    let t: String = t.into();
                    t.trim().to_string()
                })
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    pub fn verify(&self, token: &str) -> bool {
        // Every configured token is compared so timing does not depend on position.
        let mut matched = false;
        for expected in &self.tokens {
            matched |= constant_time_eq(token, expected);
        }
        matched
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdamConfig {
    pub base_url: String,
    pub http: HttpClientConfig,
}

/// Checks a user token against the identity service `userinfo` endpoint.
#[derive(Debug, Clone)]
pub struct IdamTokenRuntime {
    agent: ureq::Agent,
    userinfo_url: String,
}

impl IdamTokenRuntime {
    pub fn new(config: &IdamConfig) -> Result<Self, String> {
        let base = config.base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err("idam base url must not be empty".to_string());
        }
        Ok(Self {
            agent: build_http_agent(&config.http)?,
            userinfo_url: format!("{base}/o/userinfo"),
        })
    }

    /// Any failure to reach the identity service denies.
    pub fn verify(&self, token: &str) -> Result<bool, String> {
        match self
            .agent
            .get(&self.userinfo_url)
            .set("Authorization", &format!("Bearer {token}"))
            .set("Accept", "application/json")
            .call()
        {
            Ok(resp) => Ok((200..=299).contains(&resp.status())),
            Err(ureq::Error::Status(401, _)) | Err(ureq::Error::Status(403, _)) => Ok(false),
            Err(err) => Err(classify_ureq_error(&err)),
        }
    }
}
