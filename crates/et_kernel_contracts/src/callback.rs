#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::case::{CaseData, CaseId, CaseRecord};
use crate::ContractViolation;

/// Inbound CCD callback body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackRequest {
    #[serde(default)]
    pub event_id: Option<String>,
    pub case_details: CaseDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseDetails {
    pub id: Value,
    #[serde(default)]
    pub case_type_id: Option<String>,
    #[serde(default)]
    pub jurisdiction: Option<String>,
    #[serde(default)]
    pub case_data: CaseData,
}

impl CallbackRequest {
    pub fn into_case_record(self) -> Result<CaseRecord, ContractViolation> {
        let details = self.case_details;
        let raw_id = match &details.id {
            Value::Number(n) if n.is_u64() => n.to_string(),
            Value::String(s) => s.trim().to_string(),
            _ => {
                return Err(ContractViolation::InvalidValue {
                    field: "case_details.id",
                    reason: "must be an unsigned number or digit string",
                })
            }
        };
        CaseRecord::v1(
            CaseId::new(raw_id)?,
            details.case_type_id,
            details.jurisdiction,
            details.case_data,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn at_callback_01_numeric_and_string_ids_both_map_to_case_id() {
        for id in [json!(1695134423958127u64), json!("1695134423958127")] {
            let req: CallbackRequest = serde_json::from_value(json!({
                "case_details": {"id": id, "case_type_id": "ET_EnglandWales", "case_data": {"a": 1}}
            }))
            .unwrap();
            let record = req.into_case_record().unwrap();
            assert_eq!(record.case_id().as_str(), "1695134423958127");
            assert_eq!(record.case_type_id.as_deref(), Some("ET_EnglandWales"));
            assert_eq!(record.case_data.get("a"), Some(&json!(1)));
        }
    }

    #[test]
    fn at_callback_02_negative_or_object_id_is_rejected() {
        for id in [json!(-4), json!({"x": 1}), json!("12a")] {
            let req: CallbackRequest =
                serde_json::from_value(json!({"case_details": {"id": id}})).unwrap();
            assert!(req.into_case_record().is_err());
        }
    }
}
