#![forbid(unsafe_code)]

use et_engines::hearing_preferences::{validate_hearing_preferences, HEARING_PREFERENCE_FIELD};
use et_kernel_contracts::case::{CaseRecord, FieldAccess};
use et_kernel_contracts::envelope::ValidationErrorList;
use et_kernel_contracts::event::LifecycleEvent;

use crate::handler::{EventContext, HardFailure, LifecycleHandler};

/// Mid-event check on the hearing-preference page. Read-only.
#[derive(Debug, Clone, Copy, Default)]
pub struct HearingPreferenceValidator;

impl LifecycleHandler for HearingPreferenceValidator {
    fn event(&self) -> LifecycleEvent {
        LifecycleEvent::HearingPreferencesMidEvent
    }

    fn field_access(&self, _record: &CaseRecord) -> FieldAccess {
        FieldAccess::read_only(&[HEARING_PREFERENCE_FIELD])
    }

    fn handle(
        &self,
        _ctx: &EventContext,
        record: &mut CaseRecord,
    ) -> Result<ValidationErrorList, HardFailure> {
        Ok(validate_hearing_preferences(&record.case_data))
    }
}
