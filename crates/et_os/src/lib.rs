#![forbid(unsafe_code)]

pub mod access_roles;
pub mod case_vetting;
pub mod clock;
pub mod dispatcher;
pub mod gate;
pub mod handler;
pub mod hearing_preferences;
pub mod migration_rollback;
pub mod pre_acceptance;
pub mod tse_respondent;
