#![forbid(unsafe_code)]

use et_kernel_contracts::case::CaseId;
use et_storage::migration::{
    InMemoryMigrationLedger, JsonlMigrationLedger, MigrationRollbackRow, StorageError,
};
use et_storage::repo::MigrationRollbackRepo;

fn case(id: &str) -> CaseId {
    CaseId::new(id).unwrap()
}

fn row(case_id: &str, migration_id: &str, at: &str) -> MigrationRollbackRow {
    MigrationRollbackRow::v1(
        &case(case_id),
        migration_id.to_string(),
        vec!["ethosCaseReference".to_string()],
        at.to_string(),
    )
    .unwrap()
}

#[test]
fn at_migration_db_01_repeat_commit_keeps_first_row() {
    let s = InMemoryMigrationLedger::new_in_memory();
    let first = s
        .migration_rollback_commit_row(row("1001", "ecm-1", "2024-05-01T10:00:00Z"))
        .unwrap();
    let second = s
        .migration_rollback_commit_row(row("1001", "ecm-1", "2024-05-02T10:00:00Z"))
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(s.migration_rollback_rows(&case("1001")).unwrap().len(), 1);
}

#[test]
fn at_migration_db_02_rows_are_scoped_per_case() {
    let s = InMemoryMigrationLedger::new_in_memory();
    s.migration_rollback_commit_row(row("1001", "ecm-1", "t1")).unwrap();
    s.migration_rollback_commit_row(row("1002", "ecm-1", "t1")).unwrap();
    s.migration_rollback_commit_row(row("1001", "ecm-2", "t2")).unwrap();
    assert_eq!(s.migration_rollback_rows(&case("1001")).unwrap().len(), 2);
    assert_eq!(s.migration_rollback_rows(&case("1002")).unwrap().len(), 1);
    assert!(s.migration_rollback_rows(&case("1003")).unwrap().is_empty());
}

#[test]
fn at_migration_db_03_blank_migration_id_is_refused() {
    let err = MigrationRollbackRow::v1(&case("1001"), " ".to_string(), vec![], "t".to_string());
    assert!(err.is_err());
}

#[test]
fn at_migration_db_04_jsonl_ledger_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger").join("rollbacks.jsonl");
    {
        let s = JsonlMigrationLedger::open(&path).unwrap();
        s.migration_rollback_commit_row(row("1001", "ecm-1", "t1")).unwrap();
        s.migration_rollback_commit_row(row("1001", "ecm-1", "t2")).unwrap();
    }
    let reopened = JsonlMigrationLedger::open(&path).unwrap();
    let rows = reopened.migration_rollback_rows(&case("1001")).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].rolled_back_at, "t1");
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 1);
}

#[test]
fn at_migration_db_05_unwritable_ledger_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the file should be makes every append fail.
    let path = dir.path().join("rollbacks.jsonl");
    let s = JsonlMigrationLedger::open(&path).unwrap();
    std::fs::create_dir_all(&path).unwrap();
    let err = s
        .migration_rollback_commit_row(row("1001", "ecm-1", "t1"))
        .unwrap_err();
    assert!(matches!(err, StorageError::Io(_)));
    assert!(s.migration_rollback_rows(&case("1001")).unwrap().is_empty());
}

#[test]
fn at_migration_db_06_corrupt_ledger_fails_to_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rollbacks.jsonl");
    std::fs::write(&path, "{not json}\n").unwrap();
    assert!(matches!(
        JsonlMigrationLedger::open(&path),
        Err(StorageError::Codec(_))
    ));
}

#[test]
fn at_migration_db_07_torn_final_append_is_cut_off_on_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rollbacks.jsonl");
    {
        let s = JsonlMigrationLedger::open(&path).unwrap();
        s.migration_rollback_commit_row(row("1001", "ecm-1", "t1")).unwrap();
    }
    let mut text = std::fs::read_to_string(&path).unwrap();
    text.push_str("{\"case_id\":\"1001\",\"migration_id\":\"ecm-2\",\"restored_fi");
    std::fs::write(&path, &text).unwrap();

    let reopened = JsonlMigrationLedger::open(&path).unwrap();
    assert_eq!(reopened.migration_rollback_rows(&case("1001")).unwrap().len(), 1);
    reopened
        .migration_rollback_commit_row(row("1001", "ecm-2", "t2"))
        .unwrap();

    let again = JsonlMigrationLedger::open(&path).unwrap();
    let rows = again.migration_rollback_rows(&case("1001")).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 2);
}

#[test]
fn at_migration_db_08_complete_final_line_without_newline_is_kept() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rollbacks.jsonl");
    let line = serde_json::to_string(&row("1001", "ecm-1", "t1")).unwrap();
    std::fs::write(&path, &line).unwrap();

    let s = JsonlMigrationLedger::open(&path).unwrap();
    s.migration_rollback_commit_row(row("1001", "ecm-2", "t2")).unwrap();
    let reopened = JsonlMigrationLedger::open(&path).unwrap();
    assert_eq!(reopened.migration_rollback_rows(&case("1001")).unwrap().len(), 2);
}
