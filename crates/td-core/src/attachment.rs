//! File attachments and the three-step upload protocol types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FieldIssue, ValidationError};
use crate::todo::TodoId;

pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];
const ALLOWED_DOCUMENT_TYPES: &[&str] = &["application/pdf", "application/msword", "text/plain"];

/// A registered upload, many-to-one with a todo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: i64,
    pub todo_id: TodoId,
    pub file_name: String,
    pub original_name: String,
    pub file_path: String,
    pub file_url: String,
    pub file_size: u64,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
}

/// Step 1 of the upload protocol: ask the backend for a presigned
/// object-store URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignRequest {
    pub file_name: String,
    pub content_type: String,
    pub file_size: u64,
    pub todo_id: TodoId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignResponse {
    pub presigned_url: String,
    pub file_key: String,
    pub file_url: String,
}

/// Step 3 of the upload protocol: register the uploaded object with the
/// backend after the raw PUT succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadCompleteRequest {
    pub todo_id: TodoId,
    pub file_name: String,
    pub original_name: String,
    pub file_path: String,
    pub file_size: u64,
    pub content_type: String,
}

/// A local file the caller wants to attach. The bytes are already in
/// memory; reading them from disk is the presentation layer's business.
#[derive(Debug, Clone)]
pub struct UploadSource {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadSource {
    /// Size/type gate applied before any network call.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        if self.bytes.len() as u64 > MAX_FILE_SIZE {
            issues.push(FieldIssue::new("fileSize", "file exceeds the 10MB limit"));
        }
        let allowed = ALLOWED_IMAGE_TYPES
            .iter()
            .chain(ALLOWED_DOCUMENT_TYPES)
            .any(|t| *t == self.content_type);
        if !allowed {
            issues.push(FieldIssue::new("contentType", "file type is not allowed"));
        }
        ValidationError::from_issues(issues)
    }

    pub fn is_image(&self) -> bool {
        ALLOWED_IMAGE_TYPES.iter().any(|t| *t == self.content_type)
    }
}

/// Human-readable size for presentation use ("1.5 MB").
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let exp = (bytes as f64).log(1024.0).floor() as usize;
    let exp = exp.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exp as i32);
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[exp])
}
