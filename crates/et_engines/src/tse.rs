#![forbid(unsafe_code)]

use chrono::{Days, NaiveDate};
use et_kernel_contracts::case::CaseData;
use serde_json::{json, Value};
use thiserror::Error;

pub const RESPONDENT_DRAFT_PREFIX: &str = "resTse";
pub const RESPONDENT_SELECT_APPLICATION_FIELD: &str = "resTseSelectApplication";
pub const RESPONDENT_COPY_FIELD: &str = "resTseCopyToOtherPartyYesOrNo";
pub const RESPONDENT_COPY_TEXT_FIELD: &str = "resTseCopyToOtherPartyTextArea";
pub const APPLICATION_HISTORY_FIELD: &str = "genericTseApplicationCollection";

pub const RESPONDENT_APPLICANT: &str = "Respondent";
pub const APPLICATION_STATUS_OPEN: &str = "Open";
pub const RESPONSE_DUE_DAYS: u64 = 7;

/// Application type → suffix of the `resTseDocument<N>` / `resTseTextBox<N>`
/// pair that carries its detail.
const APPLICATION_SLOTS: [(&str, &str); 13] = [
    ("Amend response", "1"),
    ("Change personal details", "2"),
    ("Claimant not complied", "3"),
    ("Consider a decision afresh", "4"),
    ("Contact the tribunal", "5"),
    ("Order other party", "6"),
    ("Order a witness to attend to give evidence", "7"),
    ("Postpone a hearing", "8"),
    ("Reconsider judgement", "9"),
    ("Restrict publicity", "10"),
    ("Strike out all or part of a claim", "11"),
    ("Vary or revoke an order", "12"),
    ("Withdraw my claim", "13"),
];

fn is_present(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        _ => true,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("genericTseApplicationCollection is present but is not a list")]
pub struct MalformedApplicationHistory;

pub fn new_application_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn draft_fields(case_data: &CaseData) -> Vec<String> {
    case_data
        .keys()
        .filter(|k| k.starts_with(RESPONDENT_DRAFT_PREFIX))
        .cloned()
        .collect()
}

pub fn has_respondent_draft(case_data: &CaseData) -> bool {
    case_data
        .as_map()
        .iter()
        .any(|(k, v)| k.starts_with(RESPONDENT_DRAFT_PREFIX) && is_present(v))
}

/// Moves a respondent draft into the application history. Draft keys are
/// removed, not blanked. Returns false when there was no draft to move.
/// An existing history that is not a list is refused before anything changes.
pub fn finalise_respondent_application(
    case_data: &mut CaseData,
    today: NaiveDate,
    application_id: &str,
) -> Result<bool, MalformedApplicationHistory> {
    if !has_respondent_draft(case_data) {
        return Ok(false);
    }
    let mut history = match case_data.get(APPLICATION_HISTORY_FIELD) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(_) => return Err(MalformedApplicationHistory),
    };

    let application_type = case_data
        .get_str(RESPONDENT_SELECT_APPLICATION_FIELD)
        .unwrap_or_default()
        .to_string();
    let slot = APPLICATION_SLOTS
        .iter()
        .find(|(name, _)| *name == application_type)
        .map(|(_, slot)| *slot);
    let (details, document) = match slot {
        Some(slot) => (
            case_data
                .get(&format!("resTseTextBox{slot}"))
                .cloned()
                .unwrap_or(Value::Null),
            case_data
                .get(&format!("resTseDocument{slot}"))
                .cloned()
                .unwrap_or(Value::Null),
        ),
        None => (Value::Null, Value::Null),
    };

    let due = today
        .checked_add_days(Days::new(RESPONSE_DUE_DAYS))
        .unwrap_or(today);
    let number = history.len() + 1;
    history.push(json!({
        "id": application_id,
        "value": {
            "number": number.to_string(),
            "type": application_type,
            "applicant": RESPONDENT_APPLICANT,
            "date": today.format("%-d %b %Y").to_string(),
            "dueDate": due.format("%-d %b %Y").to_string(),
            "details": details,
            "documentUpload": document,
            "copyToOtherPartyYesOrNo": case_data.get(RESPONDENT_COPY_FIELD).cloned().unwrap_or(Value::Null),
            "copyToOtherPartyText": case_data.get(RESPONDENT_COPY_TEXT_FIELD).cloned().unwrap_or(Value::Null),
            "responsesCount": "0",
            "status": APPLICATION_STATUS_OPEN,
        }
    }));
    case_data.set(APPLICATION_HISTORY_FIELD, Value::Array(history));

    for key in draft_fields(case_data) {
        case_data.remove(&key);
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(v: Value) -> CaseData {
        match v {
            Value::Object(map) => CaseData::from_map(map),
            _ => panic!("expected object"),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn at_tse_01_draft_moves_into_history_and_leaves_no_trace() {
        let mut d = data(json!({
            "resTseSelectApplication": "Postpone a hearing",
            "resTseTextBox8": "Witness unavailable",
            "resTseCopyToOtherPartyYesOrNo": "Yes",
            "genericTseApplicationCollection": [{"id": "old", "value": {"number": "1"}}],
            "claimant": "Grace Hopper"
        }));
        assert!(finalise_respondent_application(&mut d, day(2024, 5, 1), "app-2").unwrap());
        assert!(draft_fields(&d).is_empty());
        assert_eq!(d.get_str("claimant"), Some("Grace Hopper"));

        let history = d.get(APPLICATION_HISTORY_FIELD).and_then(Value::as_array).unwrap();
        assert_eq!(history.len(), 2);
        let entry = &history[1];
        assert_eq!(entry["id"], "app-2");
        assert_eq!(entry["value"]["number"], "2");
        assert_eq!(entry["value"]["applicant"], "Respondent");
        assert_eq!(entry["value"]["type"], "Postpone a hearing");
        assert_eq!(entry["value"]["details"], "Witness unavailable");
        assert_eq!(entry["value"]["date"], "1 May 2024");
        assert_eq!(entry["value"]["dueDate"], "8 May 2024");
        assert_eq!(entry["value"]["copyToOtherPartyYesOrNo"], "Yes");
    }

    #[test]
    fn at_tse_02_blank_draft_keys_do_not_count_as_a_draft() {
        let mut d = data(json!({"resTseSelectApplication": "", "resTseTextBox1": null}));
        assert!(!has_respondent_draft(&d));
        assert!(!finalise_respondent_application(&mut d, day(2024, 5, 1), "x").unwrap());
        assert!(!d.contains(APPLICATION_HISTORY_FIELD));
    }

    #[test]
    fn at_tse_03_first_application_starts_history_at_one() {
        let mut d = data(json!({"resTseSelectApplication": "Amend response", "resTseTextBox1": "typo"}));
        assert!(finalise_respondent_application(&mut d, day(2024, 1, 31), "app-1").unwrap());
        let history = d.get(APPLICATION_HISTORY_FIELD).and_then(Value::as_array).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0]["value"]["number"], "1");
        assert_eq!(history[0]["value"]["dueDate"], "7 Feb 2024");
    }

    #[test]
    fn at_tse_04_non_list_history_is_refused_and_nothing_changes() {
        let mut d = data(json!({
            "resTseSelectApplication": "Amend response",
            "resTseTextBox1": "typo",
            "genericTseApplicationCollection": {"legacy": {"number": "1"}}
        }));
        let before = d.clone();
        assert_eq!(
            finalise_respondent_application(&mut d, day(2024, 5, 1), "app-1"),
            Err(MalformedApplicationHistory)
        );
        assert_eq!(d, before);
    }

    #[test]
    fn at_tse_05_null_history_starts_a_new_list() {
        let mut d = data(json!({
            "resTseSelectApplication": "Amend response",
            "genericTseApplicationCollection": null
        }));
        assert!(finalise_respondent_application(&mut d, day(2024, 5, 1), "app-1").unwrap());
        let history = d.get(APPLICATION_HISTORY_FIELD).and_then(Value::as_array).unwrap();
        assert_eq!(history.len(), 1);
    }
}
