#![forbid(unsafe_code)]

use std::fmt;

use crate::{ContractViolation, Validate};

pub const CREDENTIAL_MAX_LEN: usize = 8_192;

/// Closed set of lifecycle callbacks this service answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleEvent {
    ClaimantTransferredCase,
    InitialiseCaseVetting,
    HearingPreferencesMidEvent,
    PreAcceptanceAboutToSubmit,
    MigrationRollbackAboutToSubmit,
    TseRespondentAboutToSubmit,
}

impl LifecycleEvent {
    pub const ALL: [LifecycleEvent; 6] = [
        LifecycleEvent::ClaimantTransferredCase,
        LifecycleEvent::InitialiseCaseVetting,
        LifecycleEvent::HearingPreferencesMidEvent,
        LifecycleEvent::PreAcceptanceAboutToSubmit,
        LifecycleEvent::MigrationRollbackAboutToSubmit,
        LifecycleEvent::TseRespondentAboutToSubmit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleEvent::ClaimantTransferredCase => "CLAIMANT_TRANSFERRED_CASE",
            LifecycleEvent::InitialiseCaseVetting => "INITIALISE_CASE_VETTING",
            LifecycleEvent::HearingPreferencesMidEvent => "HEARING_PREFERENCES_MID_EVENT",
            LifecycleEvent::PreAcceptanceAboutToSubmit => "PRE_ACCEPTANCE_ABOUT_TO_SUBMIT",
            LifecycleEvent::MigrationRollbackAboutToSubmit => "MIGRATION_ROLLBACK_ABOUT_TO_SUBMIT",
            LifecycleEvent::TseRespondentAboutToSubmit => "TSE_RESPONDENT_ABOUT_TO_SUBMIT",
        }
    }

    /// Gate coverage as observed on the platform today: only vetting
    /// initialisation and the hearing-preference mid-event check are gated.
    pub fn requires_authorization(self) -> bool {
        matches!(
            self,
            LifecycleEvent::InitialiseCaseVetting | LifecycleEvent::HearingPreferencesMidEvent
        )
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque bearer credential. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(raw: impl Into<String>) -> Result<Self, ContractViolation> {
        let c = Self(raw.into());
        c.validate()?;
        Ok(c)
    }

    /// Accepts either a bare token or an `Authorization` header value.
    pub fn from_authorization_header(value: &str) -> Result<Self, ContractViolation> {
        let value = value.trim();
        let token = match value.split_once(' ') {
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest,
            _ if value.eq_ignore_ascii_case("bearer") => "",
            _ => value,
        };
        Self::new(token.trim())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

impl Validate for Credential {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.0.trim().is_empty() {
            return Err(ContractViolation::InvalidValue {
                field: "credential",
                reason: "must not be empty",
            });
        }
        if self.0.len() > CREDENTIAL_MAX_LEN {
            return Err(ContractViolation::InvalidValue {
                field: "credential",
                reason: "must be <= 8192 chars",
            });
        }
        if self.0.chars().any(|c| c.is_control() || c.is_whitespace()) {
            return Err(ContractViolation::InvalidValue {
                field: "credential",
                reason: "must not contain whitespace or control characters",
            });
        }
        Ok(())
    }
}
