#![forbid(unsafe_code)]

pub mod acceptance;
pub mod case_access;
pub mod hearing_preferences;
pub mod http;
pub mod idam;
pub mod listing;
pub mod tse;
pub mod vetting;
