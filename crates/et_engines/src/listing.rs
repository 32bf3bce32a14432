#![forbid(unsafe_code)]

use chrono::NaiveDate;
use et_kernel_contracts::case::CaseData;
use serde_json::Value;

use crate::acceptance::parse_ccd_date;

pub const HEARING_COLLECTION_FIELD: &str = "hearingCollection";
pub const NEXT_LISTED_DATE_FIELD: &str = "nextListedDate";
pub const HEARING_STATUS_LISTED: &str = "Listed";

fn value_of(item: &Value) -> &Value {
    item.get("value").unwrap_or(item)
}

/// Earliest listed hearing day on or after `today`.
pub fn next_listed_date(case_data: &CaseData, today: NaiveDate) -> Option<NaiveDate> {
    let hearings = case_data.get(HEARING_COLLECTION_FIELD)?.as_array()?;
    hearings
        .iter()
        .filter_map(|h| value_of(h).get("hearingDateCollection")?.as_array())
        .flatten()
        .map(value_of)
        .filter(|d| {
            d.get("Hearing_status").and_then(Value::as_str) == Some(HEARING_STATUS_LISTED)
        })
        .filter_map(|d| d.get("listedDate").and_then(Value::as_str).and_then(parse_ccd_date))
        .filter(|d| *d >= today)
        .min()
}

/// Rewrites `nextListedDate` from the current hearing collection; removes it
/// when nothing is listed in the future.
pub fn refresh_next_listed_date(case_data: &mut CaseData, today: NaiveDate) {
    match next_listed_date(case_data, today) {
        Some(date) => case_data.set(
            NEXT_LISTED_DATE_FIELD,
            Value::String(date.format("%Y-%m-%d").to_string()),
        ),
        None => {
            case_data.remove(NEXT_LISTED_DATE_FIELD);
        }
    }
}
