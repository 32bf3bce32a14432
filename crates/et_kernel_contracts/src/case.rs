#![forbid(unsafe_code)]

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{ContractViolation, Validate};

pub const CASE_ID_MAX_DIGITS: usize = 19;

/// CCD case reference. Digits only; never reassigned once a record exists.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CaseId(String);

impl CaseId {
    pub fn new(id: impl Into<String>) -> Result<Self, ContractViolation> {
        let id = id.into();
        let v = Self(id);
        v.validate()?;
        Ok(v)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Validate for CaseId {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.0.is_empty() {
            return Err(ContractViolation::InvalidValue {
                field: "case_id",
                reason: "must not be empty",
            });
        }
        if self.0.len() > CASE_ID_MAX_DIGITS {
            return Err(ContractViolation::InvalidValue {
                field: "case_id",
                reason: "must be <= 19 digits",
            });
        }
        if !self.0.chars().all(|c| c.is_ascii_digit()) {
            return Err(ContractViolation::InvalidValue {
                field: "case_id",
                reason: "must contain ASCII digits only",
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for CaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Open case document keyed by CCD field name.
///
/// Handlers only ever touch individual keys; anything they do not name is
/// carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseData(Map<String, Value>);

impl CaseData {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Trimmed, non-empty string value of `field`.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Top-level keys whose value differs between `before` and `self`,
    /// including keys added or removed.
    pub fn changed_fields(&self, before: &CaseData) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for (k, v) in &self.0 {
            if before.0.get(k) != Some(v) {
                out.insert(k.clone());
            }
        }
        for k in before.0.keys() {
            if !self.0.contains_key(k) {
                out.insert(k.clone());
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseRecord {
    case_id: CaseId,
    pub case_type_id: Option<String>,
    pub jurisdiction: Option<String>,
    pub case_data: CaseData,
}

impl CaseRecord {
    pub fn v1(
        case_id: CaseId,
        case_type_id: Option<String>,
        jurisdiction: Option<String>,
        case_data: CaseData,
    ) -> Result<Self, ContractViolation> {
        let r = Self {
            case_id,
            case_type_id,
            jurisdiction,
            case_data,
        };
        r.validate()?;
        Ok(r)
    }

    pub fn case_id(&self) -> &CaseId {
        &self.case_id
    }
}

impl Validate for CaseRecord {
    fn validate(&self) -> Result<(), ContractViolation> {
        self.case_id.validate()?;
        if let Some(case_type_id) = &self.case_type_id {
            if case_type_id.trim().is_empty() || case_type_id.len() > 64 {
                return Err(ContractViolation::InvalidValue {
                    field: "case_record.case_type_id",
                    reason: "must be 1..=64 chars when provided",
                });
            }
        }
        if let Some(jurisdiction) = &self.jurisdiction {
            if jurisdiction.trim().is_empty() || jurisdiction.len() > 64 {
                return Err(ContractViolation::InvalidValue {
                    field: "case_record.jurisdiction",
                    reason: "must be 1..=64 chars when provided",
                });
            }
        }
        Ok(())
    }
}

/// Fields a handler reads and may write for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldAccess {
    pub reads: BTreeSet<String>,
    pub writes: BTreeSet<String>,
    pub refreshes_next_listed_date: bool,
}

impl FieldAccess {
    pub fn read_only(reads: &[&str]) -> Self {
        Self {
            reads: reads.iter().map(|f| f.to_string()).collect(),
            writes: BTreeSet::new(),
            refreshes_next_listed_date: false,
        }
    }

    pub fn read_write(reads: &[&str], writes: &[&str]) -> Self {
        Self {
            reads: reads.iter().map(|f| f.to_string()).collect(),
            writes: writes.iter().map(|f| f.to_string()).collect(),
            refreshes_next_listed_date: false,
        }
    }

    pub fn with_read(mut self, field: impl Into<String>) -> Self {
        self.reads.insert(field.into());
        self
    }

    pub fn with_write(mut self, field: impl Into<String>) -> Self {
        self.writes.insert(field.into());
        self
    }

    pub fn with_next_listed_date_refresh(mut self) -> Self {
        self.refreshes_next_listed_date = true;
        self
    }

    pub fn is_read_only(&self) -> bool {
        self.writes.is_empty() && !self.refreshes_next_listed_date
    }

    /// First changed field not covered by `writes`.
    pub fn check_writes(&self, changed: &BTreeSet<String>) -> Result<(), ContractViolation> {
        match changed.iter().find(|f| !self.writes.contains(*f)) {
            Some(field) => Err(ContractViolation::UndeclaredWrite {
                field: field.clone(),
            }),
            None => Ok(()),
        }
    }
}
