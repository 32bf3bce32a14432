#![forbid(unsafe_code)]

use std::sync::Arc;

use et_engines::listing::HEARING_COLLECTION_FIELD;
use et_kernel_contracts::case::{CaseRecord, FieldAccess};
use et_kernel_contracts::envelope::ValidationErrorList;
use et_kernel_contracts::event::LifecycleEvent;
use et_storage::migration::{MigrationRollbackRow, StorageError};
use et_storage::repo::MigrationRollbackRepo;
use serde_json::{Map, Value};
use tracing::info;

use crate::handler::{EventContext, HardFailure, LifecycleHandler};

pub const MIGRATION_METADATA_FIELD: &str = "migrationRollback";

struct MigrationMetadata<'a> {
    migration_id: &'a str,
    previous_values: &'a Map<String, Value>,
}

fn read_metadata(record: &CaseRecord) -> Result<Option<MigrationMetadata<'_>>, HardFailure> {
    let Some(meta) = record.case_data.get(MIGRATION_METADATA_FIELD) else {
        return Ok(None);
    };
    if meta.is_null() {
        return Ok(None);
    }
    let migration_id = meta
        .get("migrationId")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(HardFailure::MalformedMigrationMetadata(
            "migrationId must be a non-empty string",
        ))?;
    let previous_values = meta
        .get("previousValues")
        .and_then(Value::as_object)
        .ok_or(HardFailure::MalformedMigrationMetadata(
            "previousValues must be an object",
        ))?;
    if previous_values.contains_key(MIGRATION_METADATA_FIELD) {
        return Err(HardFailure::MalformedMigrationMetadata(
            "previousValues must not restore the metadata field itself",
        ));
    }
    Ok(Some(MigrationMetadata {
        migration_id,
        previous_values,
    }))
}

/// Reverses a case-data migration from the snapshot embedded in the record.
/// The ledger write happens before any field is restored, so a ledger fault
/// leaves nothing half rolled back.
pub struct MigrationRollbackHandler {
    repo: Arc<dyn MigrationRollbackRepo>,
}

impl MigrationRollbackHandler {
    pub fn new(repo: Arc<dyn MigrationRollbackRepo>) -> Self {
        Self { repo }
    }
}

impl LifecycleHandler for MigrationRollbackHandler {
    fn event(&self) -> LifecycleEvent {
        LifecycleEvent::MigrationRollbackAboutToSubmit
    }

    fn field_access(&self, record: &CaseRecord) -> FieldAccess {
        let mut access = FieldAccess::read_write(&[MIGRATION_METADATA_FIELD], &[]);
        if let Ok(Some(meta)) = read_metadata(record) {
            access = access.with_write(MIGRATION_METADATA_FIELD);
            for field in meta.previous_values.keys() {
                access = access.with_write(field.clone());
            }
            if meta.previous_values.contains_key(HEARING_COLLECTION_FIELD) {
                access = access
                    .with_read(HEARING_COLLECTION_FIELD)
                    .with_next_listed_date_refresh();
            }
        }
        access
    }

    fn handle(
        &self,
        ctx: &EventContext,
        record: &mut CaseRecord,
    ) -> Result<ValidationErrorList, HardFailure> {
        let Some(meta) = read_metadata(record)? else {
            return Ok(ValidationErrorList::new());
        };
        let migration_id = meta.migration_id.to_string();
        let restore: Vec<(String, Value)> = meta
            .previous_values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let row = MigrationRollbackRow::v1(
            record.case_id(),
            migration_id.clone(),
            restore.iter().map(|(k, _)| k.clone()).collect(),
            ctx.now_rfc3339.clone(),
        )
        .map_err(StorageError::from)?;
        self.repo.migration_rollback_commit_row(row)?;

        for (field, value) in restore {
            if value.is_null() {
                record.case_data.remove(&field);
            } else {
                record.case_data.set(field, value);
            }
        }
        record.case_data.remove(MIGRATION_METADATA_FIELD);
        info!(case_id = %record.case_id(), migration_id = %migration_id, "migration rolled back");
        Ok(ValidationErrorList::new())
    }
}
