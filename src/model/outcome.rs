use serde::{Deserialize, Serialize};
use std::fmt;

/// One field-level rejection reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: serde_json::Value) -> Self {
        self.value = Some(value);
        self
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of invoking the Resource Creator.
///
/// Produced once per attempt and consumed immediately by the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionOutcome {
    pub resource_id: Option<String>,
    pub success: bool,
    pub field_errors: Vec<FieldError>,
}

impl SubmissionOutcome {
    pub fn created(resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: Some(resource_id.into()),
            success: true,
            field_errors: Vec::new(),
        }
    }

    pub fn rejected(field_errors: Vec<FieldError>) -> Self {
        Self {
            resource_id: None,
            success: false,
            field_errors,
        }
    }

    /// The created identifier, if this outcome carries a usable one.
    pub fn valid_id(&self) -> Option<&str> {
        match (&self.resource_id, self.success) {
            (Some(id), true) if !id.trim().is_empty() => Some(id.as_str()),
            _ => None,
        }
    }
}

/// Result of a successful asset upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetReference {
    pub url: String,
    pub public_id: String,
    pub filename: String,
}
