//! Request context, outcomes, and errors for the session service.

use crate::retrieval::{AnswerKind, QueryError};
use crate::storage::StorageError;
use serde::Serialize;
use thiserror::Error;

/// Errors emitted by the session service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The user identifier was blank.
    #[error("user id must not be empty")]
    InvalidUser,
    /// An upload batch contained no files.
    #[error("upload contained no files")]
    NoFiles,
    /// The query was rejected before retrieval.
    #[error("invalid query: {0}")]
    Query(#[from] QueryError),
    /// The session store failed.
    #[error("session storage failed: {0}")]
    Storage(#[from] StorageError),
}

/// Identifies whose document and history a call operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    user_id: String,
}

impl SessionContext {
    /// Build a context for `user_id`, rejecting blank identifiers.
    pub fn new(user_id: impl AsRef<str>) -> Result<Self, ServiceError> {
        let trimmed = user_id.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ServiceError::InvalidUser);
        }
        Ok(Self {
            user_id: trimmed.to_string(),
        })
    }

    /// The user this context belongs to.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

/// Summary of a completed upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadOutcome {
    /// Number of files in the batch.
    pub files: usize,
    /// Names of files whose extraction failed.
    pub failed_files: Vec<String>,
    /// Character count of the new document.
    pub characters: usize,
    /// SHA-256 fingerprint of the new document.
    pub fingerprint: String,
    /// Leading characters of the new document.
    pub preview: String,
}

/// Snapshot of the current document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentPreview {
    /// Whether a non-empty document is loaded.
    pub loaded: bool,
    /// Character count of the document.
    pub characters: usize,
    /// Leading characters of the document.
    pub preview: String,
}

/// Reply to a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AskOutcome {
    /// Rendered answer text.
    pub answer: String,
    /// Which retrieval branch produced the answer.
    pub kind: AnswerKind,
}
