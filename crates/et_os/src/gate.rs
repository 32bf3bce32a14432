#![forbid(unsafe_code)]

use std::sync::Arc;

use et_engines::idam::{IdamTokenRuntime, StaticTokenRuntime};
use et_kernel_contracts::event::Credential;
use tracing::warn;

/// External trust boundary: a yes/no answer for one credential.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, credential: &Credential) -> bool;
}

impl TokenVerifier for StaticTokenRuntime {
    fn verify(&self, credential: &Credential) -> bool {
        StaticTokenRuntime::verify(self, credential.expose())
    }
}

impl TokenVerifier for IdamTokenRuntime {
    fn verify(&self, credential: &Credential) -> bool {
        match IdamTokenRuntime::verify(self, credential.expose()) {
            Ok(valid) => valid,
            Err(kind) => {
                warn!(error_kind = %kind, "identity service check failed; denying");
                false
            }
        }
    }
}

#[derive(Clone)]
pub struct AuthorizationGate {
    verifier: Arc<dyn TokenVerifier>,
}

impl AuthorizationGate {
    pub fn new(verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { verifier }
    }

    /// Fail-closed: no credential never passes.
    pub fn verify(&self, credential: Option<&Credential>) -> bool {
        match credential {
            Some(c) => self.verifier.verify(c),
            None => false,
        }
    }
}

impl std::fmt::Debug for AuthorizationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationGate").finish_non_exhaustive()
    }
}
