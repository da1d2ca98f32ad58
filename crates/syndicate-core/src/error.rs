use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyndicateError {
    /// Deal economics rejected before any tier runs.
    #[error("Invalid deal economics: {field} — {reason}")]
    InvalidEconomics { field: String, reason: String },

    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl SyndicateError {
    pub(crate) fn economics(field: &str, reason: impl Into<String>) -> Self {
        SyndicateError::InvalidEconomics {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn input(field: &str, reason: impl Into<String>) -> Self {
        SyndicateError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending field, when the error is a validation failure.
    pub fn field(&self) -> Option<&str> {
        match self {
            SyndicateError::InvalidEconomics { field, .. }
            | SyndicateError::InvalidInput { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SyndicateError {
    fn from(e: serde_json::Error) -> Self {
        SyndicateError::SerializationError(e.to_string())
    }
}
