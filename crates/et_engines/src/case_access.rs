#![forbid(unsafe_code)]

use et_kernel_contracts::case::CaseData;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::http::{build_http_agent, classify_ureq_error, HttpClientConfig};

pub const CLAIMANT_ID_FIELD: &str = "claimantId";
pub const REP_COLLECTION_FIELD: &str = "repCollection";
pub const ASSIGNED_CASE_ROLES_FIELD: &str = "assignedCaseRoles";

pub const CLAIMANT_ROLE: &str = "[CLAIMANT]";
pub const SOLICITOR_ROLES: [&str; 10] = [
    "[SOLICITORA]",
    "[SOLICITORB]",
    "[SOLICITORC]",
    "[SOLICITORD]",
    "[SOLICITORE]",
    "[SOLICITORF]",
    "[SOLICITORG]",
    "[SOLICITORH]",
    "[SOLICITORI]",
    "[SOLICITORJ]",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "caseRole")]
    pub case_role: String,
}

/// Roles to (re)assign after a transfer, plus anything that blocks an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RolePlan {
    pub assignments: Vec<RoleAssignment>,
    pub problems: Vec<String>,
}

pub fn plan_role_assignments(case_data: &CaseData) -> RolePlan {
    let mut plan = RolePlan::default();
    match case_data.get_str(CLAIMANT_ID_FIELD) {
        Some(claimant_id) => plan.assignments.push(RoleAssignment {
            user_id: claimant_id.to_string(),
            case_role: CLAIMANT_ROLE.to_string(),
        }),
        None => plan
            .problems
            .push("Claimant user id is missing; case access cannot be restored".to_string()),
    }

    let reps = case_data
        .get(REP_COLLECTION_FIELD)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let mut next_role = SOLICITOR_ROLES.iter();
    for rep in reps {
        let value = rep.get("value").unwrap_or(rep);
        let Some(user_id) = value
            .get("respondentRepresentativeId")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
        else {
            // Representatives without a linked account have nothing to restore.
            continue;
        };
        match next_role.next() {
            Some(role) => plan.assignments.push(RoleAssignment {
                user_id: user_id.to_string(),
                case_role: role.to_string(),
            }),
            None => {
                let name = value
                    .get("respRepName")
                    .and_then(Value::as_str)
                    .unwrap_or(user_id);
                plan.problems
                    .push(format!("No representative case role left for {name}"));
            }
        }
    }
    plan
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaseAccessError {
    #[error("case access service refused the assignment (status {0})")]
    Refused(u16),
    #[error("case access service unreachable ({0})")]
    Unreachable(String),
}

#[derive(Clone, PartialEq, Eq)]
pub struct CaseAccessConfig {
    pub base_url: String,
    pub service_token: Option<String>,
    pub http: HttpClientConfig,
}

/// Client for the case-users assignment API.
#[derive(Clone)]
pub struct CaseAccessRuntime {
    agent: ureq::Agent,
    case_users_url: String,
    service_token: Option<String>,
}

impl CaseAccessRuntime {
    pub fn new(config: &CaseAccessConfig) -> Result<Self, String> {
        let base = config.base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err("case access base url must not be empty".to_string());
        }
        Ok(Self {
            agent: build_http_agent(&config.http)?,
            case_users_url: format!("{base}/case-users"),
            service_token: config.service_token.clone(),
        })
    }

    pub fn assign(&self, case_id: &str, assignment: &RoleAssignment) -> Result<(), CaseAccessError> {
        let body = json!({
            "case_users": [{
                "case_id": case_id,
                "user_id": assignment.user_id,
                "case_role": assignment.case_role,
            }]
        });
        let mut req = self
            .agent
            .post(&self.case_users_url)
            .set("Content-Type", "application/json")
            .set("Accept", "application/json");
        if let Some(token) = self.service_token.as_deref() {
            req = req.set("ServiceAuthorization", &format!("Bearer {token}"));
        }
        match req.send_json(body) {
            Ok(resp) if (200..=299).contains(&resp.status()) => Ok(()),
            Ok(resp) => Err(CaseAccessError::Refused(resp.status())),
            Err(ureq::Error::Status(code, _)) => Err(CaseAccessError::Refused(code)),
            Err(err) => Err(CaseAccessError::Unreachable(classify_ureq_error(&err))),
        }
    }
}
