#![deny(missing_docs)]

//! Core library for docchat: extract text from uploaded documents and answer questions from it.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Aggregation of extracted fragments into one document.
pub mod corpus;
/// Text extraction collaborators (PDF, OCR, plain text).
pub mod extraction;
/// Structured logging and tracing setup.
pub mod logging;
/// Upload and query metrics helpers.
pub mod metrics;
/// Sentence segmentation, scoring, and answer selection.
pub mod retrieval;
/// Per-user session service.
pub mod session;
/// Session store interface and in-memory backend.
pub mod storage;
