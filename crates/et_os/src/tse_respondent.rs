#![forbid(unsafe_code)]

use et_engines::listing::HEARING_COLLECTION_FIELD;
use et_engines::tse::{
    draft_fields, finalise_respondent_application, has_respondent_draft, new_application_id,
    APPLICATION_HISTORY_FIELD,
};
use et_kernel_contracts::case::{CaseRecord, FieldAccess};
use et_kernel_contracts::envelope::ValidationErrorList;
use et_kernel_contracts::event::LifecycleEvent;
use tracing::info;

use crate::handler::{EventContext, HardFailure, LifecycleHandler};

/// Files a respondent application. Unconditional: never returns errors.
/// The next listed date is refreshed by the dispatcher afterwards.
#[derive(Debug, Clone, Copy, Default)]
pub struct TseApplicationHandler;

impl LifecycleHandler for TseApplicationHandler {
    fn event(&self) -> LifecycleEvent {
        LifecycleEvent::TseRespondentAboutToSubmit
    }

    fn field_access(&self, record: &CaseRecord) -> FieldAccess {
        let mut access = FieldAccess::read_write(
            &[APPLICATION_HISTORY_FIELD, HEARING_COLLECTION_FIELD],
            &[],
        )
        .with_next_listed_date_refresh();
        let drafting = has_respondent_draft(&record.case_data);
        if drafting {
            access = access.with_write(APPLICATION_HISTORY_FIELD);
        }
        // Every resTse* key is read to detect a draft; with one, each is also removed.
        for field in draft_fields(&record.case_data) {
            access = access.with_read(field.clone());
            if drafting {
                access = access.with_write(field);
            }
        }
        access
    }

    fn handle(
        &self,
        ctx: &EventContext,
        record: &mut CaseRecord,
    ) -> Result<ValidationErrorList, HardFailure> {
        let application_id = new_application_id();
        if finalise_respondent_application(&mut record.case_data, ctx.today, &application_id)? {
            info!(case_id = %record.case_id(), application_id = %application_id, "respondent application filed");
        }
        Ok(ValidationErrorList::new())
    }
}
