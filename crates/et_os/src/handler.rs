#![forbid(unsafe_code)]

use chrono::NaiveDate;
use et_engines::tse::MalformedApplicationHistory;
use et_kernel_contracts::case::{CaseRecord, FieldAccess};
use et_kernel_contracts::envelope::ValidationErrorList;
use et_kernel_contracts::event::LifecycleEvent;
use et_storage::migration::StorageError;
use thiserror::Error;

/// Per-invocation inputs besides the record itself.
#[derive(Debug, Clone)]
pub struct EventContext {
    pub today: NaiveDate,
    pub now_rfc3339: String,
}

/// The operation itself could not complete. Never shown to the user as a
/// form error.
#[derive(Debug, Error)]
pub enum HardFailure {
    #[error("migration ledger write failed: {0}")]
    Storage(#[from] StorageError),
    #[error("migration metadata is malformed: {0}")]
    MalformedMigrationMetadata(&'static str),
    #[error(transparent)]
    MalformedApplicationHistory(#[from] MalformedApplicationHistory),
}

pub trait LifecycleHandler: Send + Sync {
    fn event(&self) -> LifecycleEvent;

    /// Declared before the handler runs; computed from the incoming record.
    fn field_access(&self, record: &CaseRecord) -> FieldAccess;

    /// Mutates `record` in place. A non-empty list means "do not advance";
    /// the dispatcher then discards any mutation.
    fn handle(
        &self,
        ctx: &EventContext,
        record: &mut CaseRecord,
    ) -> Result<ValidationErrorList, HardFailure>;
}
