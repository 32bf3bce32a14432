#![forbid(unsafe_code)]

use chrono::NaiveDate;
use et_kernel_contracts::case::CaseData;
use et_kernel_contracts::envelope::ValidationErrorList;
use serde_json::Value;

pub const RECEIPT_DATE_FIELD: &str = "receiptDate";
pub const PRE_ACCEPT_FIELD: &str = "preAcceptCase";

pub const ERR_ACCEPTED_BEFORE_RECEIPT: &str =
    "Accepted date should not be earlier than the case received date";
pub const ERR_REJECTED_BEFORE_RECEIPT: &str =
    "Rejected date should not be earlier than the case received date";

pub fn parse_ccd_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Date-ordering rules for the pre-acceptance decision. Pure; never mutates.
pub fn validate_acceptance_dates(case_data: &CaseData) -> ValidationErrorList {
    let mut errors = ValidationErrorList::new();
    let Some(pre_accept) = case_data.get(PRE_ACCEPT_FIELD) else {
        return errors;
    };

    let accepted = pre_accept
        .get("caseAccepted")
        .and_then(Value::as_str)
        .map(str::trim);
    let (key, label, ordering_error) = match accepted {
        Some("No") => ("dateRejected", "Rejected", ERR_REJECTED_BEFORE_RECEIPT),
        _ => ("dateAccepted", "Accepted", ERR_ACCEPTED_BEFORE_RECEIPT),
    };

    let Some(raw_decision_date) = pre_accept
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
    else {
        return errors;
    };
    let Some(decision_date) = parse_ccd_date(raw_decision_date) else {
        errors.push(format!("{label} date is not a valid date"));
        return errors;
    };

    let receipt_date = case_data.get_str(RECEIPT_DATE_FIELD).and_then(parse_ccd_date);
    if let Some(receipt_date) = receipt_date {
        if decision_date < receipt_date {
            errors.push(ordering_error);
        }
    }
    errors
}
