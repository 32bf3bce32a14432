#![forbid(unsafe_code)]

use et_engines::acceptance::{validate_acceptance_dates, PRE_ACCEPT_FIELD, RECEIPT_DATE_FIELD};
use et_kernel_contracts::case::{CaseRecord, FieldAccess};
use et_kernel_contracts::envelope::ValidationErrorList;
use et_kernel_contracts::event::LifecycleEvent;

use crate::handler::{EventContext, HardFailure, LifecycleHandler};

#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptanceValidator;

impl LifecycleHandler for AcceptanceValidator {
    fn event(&self) -> LifecycleEvent {
        LifecycleEvent::PreAcceptanceAboutToSubmit
    }

    fn field_access(&self, _record: &CaseRecord) -> FieldAccess {
        FieldAccess::read_only(&[RECEIPT_DATE_FIELD, PRE_ACCEPT_FIELD])
    }

    fn handle(
        &self,
        _ctx: &EventContext,
        record: &mut CaseRecord,
    ) -> Result<ValidationErrorList, HardFailure> {
        Ok(validate_acceptance_dates(&record.case_data))
    }
}
