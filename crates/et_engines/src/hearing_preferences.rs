#![forbid(unsafe_code)]

use et_kernel_contracts::case::CaseData;
use et_kernel_contracts::envelope::ValidationErrorList;
use serde_json::Value;

pub const HEARING_PREFERENCE_FIELD: &str = "claimantHearingPreference";
const PREFERENCES_KEY: &str = "hearing_preferences";
const ASSISTANCE_KEY: &str = "hearing_assistance";

pub const VIDEO: &str = "Video";
pub const PHONE: &str = "Phone";
pub const NEITHER: &str = "Neither";
const KNOWN_OPTIONS: [&str; 3] = [VIDEO, PHONE, NEITHER];

pub const ERR_NOTHING_SELECTED: &str = "Please select at least one hearing preference";
pub const ERR_NEITHER_COMBINED: &str =
    "You cannot select 'Neither' together with 'Video' or 'Phone'";
pub const ERR_NEITHER_WITHOUT_REASON: &str =
    "Please explain why you cannot take part in video or phone hearings";

/// Combination rules for the hearing-preference page. Pure; never mutates.
pub fn validate_hearing_preferences(case_data: &CaseData) -> ValidationErrorList {
    let mut errors = ValidationErrorList::new();
    let preference = case_data.get(HEARING_PREFERENCE_FIELD);
    let selected: Vec<&str> = preference
        .and_then(|p| p.get(PREFERENCES_KEY))
        .and_then(Value::as_array)
        .map(|opts| opts.iter().filter_map(Value::as_str).map(str::trim).collect())
        .unwrap_or_default();

    if selected.is_empty() {
        errors.push(ERR_NOTHING_SELECTED);
        return errors;
    }

    for opt in &selected {
        if !KNOWN_OPTIONS.contains(opt) {
            errors.push(format!("'{opt}' is not a recognised hearing preference"));
        }
    }

    let neither = selected.contains(&NEITHER);
    if neither && (selected.contains(&VIDEO) || selected.contains(&PHONE)) {
        errors.push(ERR_NEITHER_COMBINED);
    }
    if neither {
        let reason = preference
            .and_then(|p| p.get(ASSISTANCE_KEY))
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default();
        if reason.is_empty() {
            errors.push(ERR_NEITHER_WITHOUT_REASON);
        }
    }
    errors
}
