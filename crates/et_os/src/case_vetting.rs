#![forbid(unsafe_code)]

use et_engines::vetting::{
    initial_vetting_fields, CLAIMANT_FIELD, CLAIMANT_IND_TYPE_FIELD, RESPONDENT_COLLECTION_FIELD,
    VETTING_FIELDS,
};
use et_kernel_contracts::case::{CaseRecord, FieldAccess};
use et_kernel_contracts::envelope::ValidationErrorList;
use et_kernel_contracts::event::LifecycleEvent;

use crate::handler::{EventContext, HardFailure, LifecycleHandler};

/// Sets the ET1 vetting labels. Never rejects; safe to re-run.
#[derive(Debug, Clone, Copy, Default)]
pub struct VettingInitializer;

impl LifecycleHandler for VettingInitializer {
    fn event(&self) -> LifecycleEvent {
        LifecycleEvent::InitialiseCaseVetting
    }

    fn field_access(&self, _record: &CaseRecord) -> FieldAccess {
        FieldAccess::read_write(
            &[
                CLAIMANT_IND_TYPE_FIELD,
                CLAIMANT_FIELD,
                RESPONDENT_COLLECTION_FIELD,
            ],
            &VETTING_FIELDS,
        )
    }

    fn handle(
        &self,
        _ctx: &EventContext,
        record: &mut CaseRecord,
    ) -> Result<ValidationErrorList, HardFailure> {
        for (field, value) in initial_vetting_fields(&record.case_data) {
            record.case_data.set(field, value);
        }
        Ok(ValidationErrorList::new())
    }
}
