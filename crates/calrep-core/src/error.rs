//! Error types for the report engine.

use std::fmt;

use thiserror::Error;

/// Which side of an event a problem was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Start,
    End,
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::End => write!(f, "end"),
        }
    }
}

/// Errors raised by the report engine.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A raw event cannot be normalized. Only that event is dropped.
    #[error("event {event} has an unusable {boundary}: {reason}")]
    InvalidInput {
        event: String,
        boundary: Boundary,
        reason: String,
    },

    /// The JSON document could not be built.
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// An option string that does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct UnknownOption {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_message_names_event_and_boundary() {
        let err = CoreError::InvalidInput {
            event: "'Standup'".to_string(),
            boundary: Boundary::End,
            reason: "no date or dateTime".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "event 'Standup' has an unusable end: no date or dateTime"
        );
    }
}
