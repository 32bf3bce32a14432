#![forbid(unsafe_code)]

use std::sync::Arc;

use et_engines::case_access::{
    plan_role_assignments, CaseAccessError, CaseAccessRuntime, RoleAssignment,
    ASSIGNED_CASE_ROLES_FIELD, CLAIMANT_ID_FIELD, REP_COLLECTION_FIELD,
};
use et_kernel_contracts::case::{CaseId, CaseRecord, FieldAccess};
use et_kernel_contracts::envelope::ValidationErrorList;
use et_kernel_contracts::event::LifecycleEvent;
use serde_json::Value;
use tracing::{debug, warn};

use crate::handler::{EventContext, HardFailure, LifecycleHandler};

pub trait CaseAccessClient: Send + Sync {
    fn assign_case_role(
        &self,
        case_id: &CaseId,
        assignment: &RoleAssignment,
    ) -> Result<(), CaseAccessError>;
}

impl CaseAccessClient for CaseAccessRuntime {
    fn assign_case_role(
        &self,
        case_id: &CaseId,
        assignment: &RoleAssignment,
    ) -> Result<(), CaseAccessError> {
        self.assign(case_id.as_str(), assignment)
    }
}

/// Restores case access after an administrative transfer. Assignments are
/// attempted one by one; each failure is reported and the rest still run.
pub struct AccessRoleAssigner {
    client: Arc<dyn CaseAccessClient>,
}

impl AccessRoleAssigner {
    pub fn new(client: Arc<dyn CaseAccessClient>) -> Self {
        Self { client }
    }
}

impl LifecycleHandler for AccessRoleAssigner {
    fn event(&self) -> LifecycleEvent {
        LifecycleEvent::ClaimantTransferredCase
    }

    fn field_access(&self, _record: &CaseRecord) -> FieldAccess {
        FieldAccess::read_write(
            &[CLAIMANT_ID_FIELD, REP_COLLECTION_FIELD],
            &[ASSIGNED_CASE_ROLES_FIELD],
        )
    }

    fn handle(
        &self,
        _ctx: &EventContext,
        record: &mut CaseRecord,
    ) -> Result<ValidationErrorList, HardFailure> {
        let plan = plan_role_assignments(&record.case_data);
        let mut errors = ValidationErrorList::new();
        errors.extend(plan.problems);

        let mut assigned = Vec::with_capacity(plan.assignments.len());
        for assignment in plan.assignments {
            match self.client.assign_case_role(record.case_id(), &assignment) {
                Ok(()) => {
                    debug!(case_id = %record.case_id(), role = %assignment.case_role, "case role assigned");
                    assigned.push(assignment);
                }
                Err(err) => {
                    warn!(case_id = %record.case_id(), role = %assignment.case_role, error = %err, "case role assignment failed");
                    errors.push(format!(
                        "Failed to assign role {} to user {}: {}",
                        assignment.case_role, assignment.user_id, err
                    ));
                }
            }
        }

        if errors.is_empty() {
            let roles = assigned
                .into_iter()
                .map(|a| serde_json::to_value(a).unwrap_or(Value::Null))
                .collect();
            record
                .case_data
                .set(ASSIGNED_CASE_ROLES_FIELD, Value::Array(roles));
        }
        Ok(errors)
    }
}
