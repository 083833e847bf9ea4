//! Extractor registry: MIME routing and batch extraction.

use super::{
    Extractor, ImageExtractor, PdfExtractor, PlainTextExtractor, TesseractCli, UploadedFile,
};
use crate::config::Config;
use futures_util::future::join_all;
use std::sync::Arc;

/// Text recovered from one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Name of the source file.
    pub file_name: String,
    /// Extractor that handled the file.
    pub extractor: &'static str,
    /// Recovered text; empty when extraction failed.
    pub text: String,
    /// Failure description, when extraction failed.
    pub error: Option<String>,
}

impl Fragment {
    /// Whether extraction failed for this file.
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Routes uploads to the first registered extractor that accepts their MIME type.
pub struct ExtractorRegistry {
    extractors: Vec<Arc<dyn Extractor>>,
    fallback: Arc<dyn Extractor>,
}

impl ExtractorRegistry {
    /// Create a registry that sends everything to `fallback` until extractors are registered.
    pub fn new(fallback: Arc<dyn Extractor>) -> Self {
        Self {
            extractors: Vec::new(),
            fallback,
        }
    }

    /// Standard routing: PDF text, image OCR through Tesseract, plain-text fallback.
    pub fn from_config(config: &Config) -> Self {
        let ocr = TesseractCli::new(&config.tesseract_path, &config.ocr_language);
        Self::with_ocr(Arc::new(ocr))
    }

    /// Standard routing with a caller-supplied OCR engine.
    pub fn with_ocr(ocr: Arc<dyn super::OcrEngine>) -> Self {
        let mut registry = Self::new(Arc::new(PlainTextExtractor));
        registry.register(Arc::new(PdfExtractor));
        registry.register(Arc::new(ImageExtractor::new(ocr)));
        registry
    }

    /// Add an extractor; earlier registrations take precedence.
    pub fn register(&mut self, extractor: Arc<dyn Extractor>) {
        self.extractors.push(extractor);
    }

    /// Pick the extractor for a MIME type.
    pub fn select(&self, mime_type: &str) -> Arc<dyn Extractor> {
        self.extractors
            .iter()
            .find(|extractor| extractor.handles(mime_type))
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }

    /// Extract one file, converting failures into an empty fragment.
    pub async fn extract(&self, file: &UploadedFile) -> Fragment {
        let extractor = self.select(&file.mime_type);
        match extractor.extract(file).await {
            Ok(text) => {
                tracing::debug!(
                    file = %file.file_name,
                    extractor = extractor.name(),
                    chars = text.len(),
                    "Extracted text"
                );
                Fragment {
                    file_name: file.file_name.clone(),
                    extractor: extractor.name(),
                    text,
                    error: None,
                }
            }
            Err(error) => {
                tracing::warn!(
                    file = %file.file_name,
                    mime_type = %file.mime_type,
                    extractor = extractor.name(),
                    error = %error,
                    "Extraction failed; continuing with empty text"
                );
                Fragment {
                    file_name: file.file_name.clone(),
                    extractor: extractor.name(),
                    text: String::new(),
                    error: Some(error.to_string()),
                }
            }
        }
    }

    /// Extract every file concurrently and return fragments in input order.
    ///
    /// Resolves only once every file has finished, so the result is always the complete
    /// ordered batch.
    pub async fn extract_all(&self, files: &[UploadedFile]) -> Vec<Fragment> {
        join_all(files.iter().map(|file| self.extract(file))).await
    }
}
