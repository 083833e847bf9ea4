//! PDF text extractor.
//!
//! Runs `pdf-extract` on a blocking thread, one page at a time. A page that fails to render
//! (including a parser panic on malformed content) is skipped so the rest of the file still
//! contributes text. Pages are joined with a newline.

use std::panic::{AssertUnwindSafe, catch_unwind};

use super::{ExtractError, Extractor, UploadedFile};
use async_trait::async_trait;
use pdf_extract::{Document, PlainTextOutput, output_doc_page};
use tracing::{debug, warn};

/// Extractor for `application/pdf` uploads.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

#[async_trait]
impl Extractor for PdfExtractor {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn handles(&self, mime_type: &str) -> bool {
        mime_type.eq_ignore_ascii_case("application/pdf")
    }

    async fn extract(&self, file: &UploadedFile) -> Result<String, ExtractError> {
        debug!(file = %file.file_name, bytes = file.bytes.len(), "Extracting PDF");
        let bytes = file.bytes.clone();
        tokio::task::spawn_blocking(move || extract_pdf_text(&bytes))
            .await
            .map_err(|e| ExtractError::Failed(format!("PDF task aborted: {e}")))?
    }
}

fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut doc = Document::load_mem(bytes)
        .map_err(|e| ExtractError::Failed(format!("PDF could not be parsed: {e}")))?;
    if doc.is_encrypted() {
        doc.decrypt("")
            .map_err(|e| ExtractError::Failed(format!("PDF is encrypted: {e}")))?;
    }

    let page_numbers: Vec<u32> = doc.get_pages().into_keys().collect();
    let mut pages = Vec::with_capacity(page_numbers.len());
    for &page in &page_numbers {
        match page_text(&doc, page) {
            Ok(text) => pages.push(text),
            Err(reason) => warn!(page, %reason, "Skipping unreadable PDF page"),
        }
    }

    if pages.is_empty() && !page_numbers.is_empty() {
        return Err(ExtractError::Failed(format!(
            "none of the {} PDF pages could be read",
            page_numbers.len()
        )));
    }
    Ok(pages.join("\n"))
}

fn page_text(doc: &Document, page: u32) -> Result<String, String> {
    let rendered = catch_unwind(AssertUnwindSafe(|| {
        let mut text = String::new();
        output_doc_page(doc, &mut PlainTextOutput::new(&mut text), page)?;
        Ok::<_, pdf_extract::OutputError>(text)
    }));
    match rendered {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err("parser panicked".to_string()),
    }
}
