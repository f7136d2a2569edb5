//! Error taxonomy shared across the client.
//!
//! Three kinds matter to callers: validation failures caught before
//! dispatch, non-2xx responses carrying the backend's error body, and
//! transport failures with no response at all. Conflicts are not a
//! distinct kind; the backend owns conflict semantics and reports them
//! through the same error body.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One field-level problem, either produced locally or parsed from the
/// backend's `details` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Client-side validation failure. Blocks dispatch entirely; the request
/// never starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {}", summary(.issues))]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    /// `Ok(())` when there is nothing to report.
    pub fn from_issues(issues: Vec<FieldIssue>) -> Result<(), ValidationError> {
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

fn summary(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("{}: {}", i.field, i.message))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Failure of a dispatched remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// Non-2xx response. `message` is surfaced to the user verbatim.
    #[error("{message}")]
    Api {
        status: u16,
        code: String,
        message: String,
        details: Vec<FieldIssue>,
    },

    /// Transport failure or timeout; no response body exists.
    #[error("network error: {0}")]
    Network(String),
}

impl RemoteError {
    pub fn from_body(status: u16, body: ErrorBody) -> Self {
        RemoteError::Api {
            status,
            code: body.error.code,
            message: body.error.message,
            details: body.error.details,
        }
    }
}

/// Wire shape of the backend error envelope:
/// `{ "error": { "code", "message", "details"? }, "timestamp" }`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorInfo,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub details: Vec<FieldIssue>,
}
