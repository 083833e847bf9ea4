//! Session service: uploads, questions, and chat history for one user at a time.

mod service;
pub mod types;

pub use service::{ChatApi, ChatService};
pub use types::{AskOutcome, DocumentPreview, ServiceError, SessionContext, UploadOutcome};
