#![forbid(unsafe_code)]

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ContractViolation {
    InvalidValue {
        field: &'static str,
        reason: &'static str,
    },
    UndeclaredWrite {
        field: String,
    },
}

impl fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractViolation::InvalidValue { field, reason } => {
                write!(f, "invalid value for {field}: {reason}")
            }
            ContractViolation::UndeclaredWrite { field } => {
                write!(f, "handler wrote undeclared field {field}")
            }
        }
    }
}

impl std::error::Error for ContractViolation {}

pub trait Validate {
    fn validate(&self) -> Result<(), ContractViolation>;
}
