#![forbid(unsafe_code)]

pub mod migration;
pub mod repo;
