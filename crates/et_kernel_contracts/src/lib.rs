#![forbid(unsafe_code)]

pub mod callback;
pub mod case;
pub mod common;
pub mod envelope;
pub mod event;

pub use common::{ContractViolation, Validate};
