#![forbid(unsafe_code)]

use et_kernel_contracts::case::CaseData;
use serde_json::Value;

pub const VETTING_BEFORE_YOU_START_FIELD: &str = "et1VettingBeforeYouStart";
pub const VETTING_CLAIMANT_MARKUP_FIELD: &str = "et1VettingClaimantDetailsMarkUp";
pub const VETTING_RESPONDENT_MARKUP_FIELD: &str = "et1VettingRespondentDetailsMarkUp";
pub const VETTING_STAGE_FIELD: &str = "et1VettingStage";

pub const VETTING_FIELDS: [&str; 4] = [
    VETTING_BEFORE_YOU_START_FIELD,
    VETTING_CLAIMANT_MARKUP_FIELD,
    VETTING_RESPONDENT_MARKUP_FIELD,
    VETTING_STAGE_FIELD,
];

pub const CLAIMANT_IND_TYPE_FIELD: &str = "claimantIndType";
pub const CLAIMANT_FIELD: &str = "claimant";
pub const RESPONDENT_COLLECTION_FIELD: &str = "respondentCollection";

pub const VETTING_STAGE_INITIAL: &str = "Initialised";

const BEFORE_YOU_START: &str = "Open these documents to help you complete this form: \
the ET1 form, any acas certificates and any supporting documents from the claimant. \
Check the Documents tab for additional ET1 documents the claimant may have uploaded.";

/// Initial vetting labels. Deterministic in the case content, so re-running
/// on an initialised case yields the same values.
pub fn initial_vetting_fields(case_data: &CaseData) -> Vec<(&'static str, Value)> {
    let claimant = claimant_name(case_data).unwrap_or_else(|| "Not provided".to_string());
    let respondents = respondent_names(case_data);

    let respondent_markup = if respondents.is_empty() {
        "<h2>Respondent</h2>No respondent recorded".to_string()
    } else {
        respondents
            .iter()
            .enumerate()
            .map(|(i, name)| format!("<h2>Respondent {}</h2>{}", i + 1, name))
            .collect::<Vec<_>>()
            .join("<br/>")
    };

    vec![
        (
            VETTING_BEFORE_YOU_START_FIELD,
            Value::String(BEFORE_YOU_START.to_string()),
        ),
        (
            VETTING_CLAIMANT_MARKUP_FIELD,
            Value::String(format!("<h2>Claimant</h2>{claimant}")),
        ),
        (VETTING_RESPONDENT_MARKUP_FIELD, Value::String(respondent_markup)),
        (
            VETTING_STAGE_FIELD,
            Value::String(VETTING_STAGE_INITIAL.to_string()),
        ),
    ]
}

fn claimant_name(case_data: &CaseData) -> Option<String> {
    if let Some(ind) = case_data.get(CLAIMANT_IND_TYPE_FIELD) {
        let part = |key: &str| {
            ind.get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };
        let joined = [part("claimant_first_names"), part("claimant_last_name")]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        if !joined.is_empty() {
            return Some(joined);
        }
    }
    case_data.get_str(CLAIMANT_FIELD).map(str::to_string)
}

fn respondent_names(case_data: &CaseData) -> Vec<String> {
    case_data
        .get(RESPONDENT_COLLECTION_FIELD)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    item.get("value")
                        .unwrap_or(item)
                        .get("respondent_name")
                        .and_then(Value::as_str)
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                })
                .collect()
        })
        .unwrap_or_default()
}
