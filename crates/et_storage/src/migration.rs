#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use et_kernel_contracts::case::CaseId;
use et_kernel_contracts::{ContractViolation, Validate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("migration ledger i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("migration ledger row could not be encoded or decoded: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("migration ledger lock poisoned")]
    LockPoisoned,
    #[error("migration ledger row violates contract: {0}")]
    ContractViolation(#[from] ContractViolation),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRollbackRow {
    pub case_id: String,
    pub migration_id: String,
    pub restored_fields: Vec<String>,
    pub rolled_back_at: String,
}

impl MigrationRollbackRow {
    pub fn v1(
        case_id: &CaseId,
        migration_id: String,
        restored_fields: Vec<String>,
        rolled_back_at: String,
    ) -> Result<Self, ContractViolation> {
        let r = Self {
            case_id: case_id.as_str().to_string(),
            migration_id,
            restored_fields,
            rolled_back_at,
        };
        r.validate()?;
        Ok(r)
    }

    fn key(&self) -> (String, String) {
        (self.case_id.clone(), self.migration_id.clone())
    }
}

impl Validate for MigrationRollbackRow {
    fn validate(&self) -> Result<(), ContractViolation> {
        CaseId::new(self.case_id.clone())?;
        if self.migration_id.trim().is_empty() || self.migration_id.len() > 128 {
            return Err(ContractViolation::InvalidValue {
                field: "migration_rollback_row.migration_id",
                reason: "must be 1..=128 chars",
            });
        }
        if self.rolled_back_at.trim().is_empty() {
            return Err(ContractViolation::InvalidValue {
                field: "migration_rollback_row.rolled_back_at",
                reason: "must not be empty",
            });
        }
        Ok(())
    }
}

/// In-memory rollback ledger. Rows are keyed by (case, migration); a repeat
/// commit returns the stored row unchanged.
#[derive(Debug, Default)]
pub struct InMemoryMigrationLedger {
    rows: Mutex<BTreeMap<(String, String), MigrationRollbackRow>>,
}

impl InMemoryMigrationLedger {
    pub fn new_in_memory() -> Self {
        Self::default()
    }

    pub fn commit_row(
        &self,
        row: MigrationRollbackRow,
    ) -> Result<MigrationRollbackRow, StorageError> {
        row.validate()?;
        let mut rows = self.rows.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(rows.entry(row.key()).or_insert(row).clone())
    }

    pub fn rows_for_case(&self, case_id: &CaseId) -> Result<Vec<MigrationRollbackRow>, StorageError> {
        let rows = self.rows.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(rows
            .values()
            .filter(|r| r.case_id == case_id.as_str())
            .cloned()
            .collect())
    }
}

/// Append-only JSON-lines ledger on disk. A torn final line left by an
/// interrupted append is cut off on open; earlier corrupt lines are errors.
#[derive(Debug)]
pub struct JsonlMigrationLedger {
    path: PathBuf,
    index: Mutex<BTreeMap<(String, String), MigrationRollbackRow>>,
}

impl JsonlMigrationLedger {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut index = BTreeMap::new();
        if path.exists() {
            let bytes = fs::read(&path)?;
            let mut kept = 0usize;
            for chunk in bytes.split_inclusive(|b| *b == b'\n') {
                let complete = chunk.ends_with(b"\n");
                let line = chunk.strip_suffix(b"\n").unwrap_or(chunk);
                if line.iter().all(u8::is_ascii_whitespace) {
                    kept += chunk.len();
                    continue;
                }
                match serde_json::from_slice::<MigrationRollbackRow>(line) {
                    Ok(row) => {
                        index.entry(row.key()).or_insert(row);
                        kept += chunk.len();
                    }
                    // Only the final append can be torn, and it never reached its newline.
                    Err(_) if !complete => break,
                    Err(err) => return Err(err.into()),
                }
            }
            if kept < bytes.len() {
                OpenOptions::new().write(true).open(&path)?.set_len(kept as u64)?;
            } else if !bytes.is_empty() && !bytes.ends_with(b"\n") {
                OpenOptions::new().append(true).open(&path)?.write_all(b"\n")?;
            }
        }
        Ok(Self {
            path,
            index: Mutex::new(index),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn commit_row(
        &self,
        row: MigrationRollbackRow,
    ) -> Result<MigrationRollbackRow, StorageError> {
        row.validate()?;
        let mut index = self.index.lock().map_err(|_| StorageError::LockPoisoned)?;
        if let Some(existing) = index.get(&row.key()) {
            return Ok(existing.clone());
        }
        let mut line = serde_json::to_string(&row)?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.sync_data()?;
        index.insert(row.key(), row.clone());
        Ok(row)
    }

    pub fn rows_for_case(&self, case_id: &CaseId) -> Result<Vec<MigrationRollbackRow>, StorageError> {
        let index = self.index.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(index
            .values()
            .filter(|r| r.case_id == case_id.as_str())
            .cloned()
            .collect())
    }
}
