#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::case::CaseData;

/// Ordered, user-facing validation messages. Order is display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrorList(Vec<String>);

impl ValidationErrorList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    pub fn extend<I, S>(&mut self, messages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.extend(messages.into_iter().map(Into::into));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for ValidationErrorList {
    fn from(v: Vec<String>) -> Self {
        Self(v)
    }
}

impl FromIterator<String> for ValidationErrorList {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// CCD callback response body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<CaseData>,
    #[serde(default)]
    pub errors: ValidationErrorList,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl ResponseEnvelope {
    pub fn accepted(data: CaseData) -> Self {
        Self {
            data: Some(data),
            errors: ValidationErrorList::new(),
            warnings: Vec::new(),
        }
    }

    pub fn rejected(data: CaseData, errors: ValidationErrorList) -> Self {
        Self {
            data: Some(data),
            errors,
            warnings: Vec::new(),
        }
    }
}
