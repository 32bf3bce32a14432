#![forbid(unsafe_code)]

use et_kernel_contracts::case::CaseId;

use crate::migration::{
    InMemoryMigrationLedger, JsonlMigrationLedger, MigrationRollbackRow, StorageError,
};

/// Durable record of migration rollbacks. Shared across requests.
pub trait MigrationRollbackRepo: Send + Sync {
    fn migration_rollback_commit_row(
        &self,
        row: MigrationRollbackRow,
    ) -> Result<MigrationRollbackRow, StorageError>;

    fn migration_rollback_rows(
        &self,
        case_id: &CaseId,
    ) -> Result<Vec<MigrationRollbackRow>, StorageError>;
}

impl MigrationRollbackRepo for InMemoryMigrationLedger {
    fn migration_rollback_commit_row(
        &self,
        row: MigrationRollbackRow,
    ) -> Result<MigrationRollbackRow, StorageError> {
        self.commit_row(row)
    }

    fn migration_rollback_rows(
        &self,
        case_id: &CaseId,
    ) -> Result<Vec<MigrationRollbackRow>, StorageError> {
        self.rows_for_case(case_id)
    }
}

impl MigrationRollbackRepo for JsonlMigrationLedger {
    fn migration_rollback_commit_row(
        &self,
        row: MigrationRollbackRow,
    ) -> Result<MigrationRollbackRow, StorageError> {
        self.commit_row(row)
    }

    fn migration_rollback_rows(
        &self,
        case_id: &CaseId,
    ) -> Result<Vec<MigrationRollbackRow>, StorageError> {
        self.rows_for_case(case_id)
    }
}
