//! Text extraction collaborators for uploaded files.
//!
//! Files are routed by MIME type through an [`ExtractorRegistry`]:
//!
//! | MIME type | Extractor | Engine |
//! |-----------|-----------|--------|
//! | `application/pdf` | [`PdfExtractor`] | `pdf-extract` on a blocking thread |
//! | `image/*` | [`ImageExtractor`] | an [`OcrEngine`], by default the `tesseract` CLI |
//! | anything else | [`PlainTextExtractor`] | lossy UTF-8 decode |
//!
//! Extraction failures never escape the registry: a failed file contributes an empty fragment
//! and the error is logged and reported alongside it.

pub mod image;
pub mod pdf;
pub mod registry;
pub mod text;

pub use image::{ImageExtractor, OcrEngine, TesseractCli};
pub use pdf::PdfExtractor;
pub use registry::{ExtractorRegistry, Fragment};
pub use text::PlainTextExtractor;

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Errors raised by individual extractors.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Reading input or talking to a child process failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The document could not be parsed.
    #[error("extraction failed: {0}")]
    Failed(String),
    /// The OCR engine rejected the image or exited unsuccessfully.
    #[error("ocr failed: {0}")]
    Ocr(String),
}

/// A file handed to the extraction layer.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Original file name, used for logging only.
    pub file_name: String,
    /// Declared MIME type (for example `application/pdf`).
    pub mime_type: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Build an upload from its parts.
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }
}

/// Interface implemented by text extractors.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Short label used in logs and fragment reports.
    fn name(&self) -> &'static str;

    /// Whether this extractor handles the given MIME type.
    fn handles(&self, mime_type: &str) -> bool;

    /// Recover the text content of a file.
    async fn extract(&self, file: &UploadedFile) -> Result<String, ExtractError>;
}

/// Guess a MIME type from a file extension, defaulting to `text/plain`.
pub fn mime_from_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase);
    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("tif" | "tiff") => "image/tiff",
        _ => "text/plain",
    }
}
