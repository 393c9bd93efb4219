use thiserror::Error;

/// A single persisted record that could not be turned into a usable value.
///
/// These are recoverable: callers skip the offending record and keep
/// aggregating the rest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("record '{title}' is missing required field '{field}'")]
    MalformedRecord { title: String, field: &'static str },

    #[error("event '{title}' has an invalid date '{value}'")]
    InvalidAnchorDate { title: String, value: String },

    #[error("event '{title}' has an unknown frequency '{value}'")]
    UnknownFrequency { title: String, value: String },
}

/// User-facing form validation failure. The message is ready to display.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
