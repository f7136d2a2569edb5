//! Authentication request/response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FieldIssue, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Login response. The token is an opaque bearer string; the client only
/// ever possesses it, never inspects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        if self.email.trim().is_empty() {
            issues.push(FieldIssue::new("email", "email must not be empty"));
        }
        if self.password.is_empty() {
            issues.push(FieldIssue::new("password", "password must not be empty"));
        }
        ValidationError::from_issues(issues)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

impl SignupRequest {
    /// Checked before dispatch; a mismatched confirmation never reaches
    /// the server.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        if self.email.trim().is_empty() {
            issues.push(FieldIssue::new("email", "email must not be empty"));
        }
        if self.password.is_empty() {
            issues.push(FieldIssue::new("password", "password must not be empty"));
        }
        if self.password != self.password_confirm {
            issues.push(FieldIssue::new(
                "passwordConfirm",
                "password confirmation does not match",
            ));
        }
        ValidationError::from_issues(issues)
    }
}
