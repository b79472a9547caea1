//! Public API types re-used by external crates (e.g., the HTTP API layer).

use serde::Serialize;

/// Answer to the reserved status question.
///
/// # Example
/// ```
/// use contextor::StatusReport;
/// let json = serde_json::to_string(&StatusReport::Initializing).unwrap();
/// assert_eq!(json, r#"{"status":"initializing"}"#);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StatusReport {
    Ready { model: String },
    Initializing,
    Error { error: String },
}

/// What [`crate::RagPipeline::ask`] produced for one question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Final, normalized answer text.
    Answer(String),
    /// The question was the status sentinel; no model call was made.
    Status(StatusReport),
}
