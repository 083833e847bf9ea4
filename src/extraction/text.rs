//! Plain-text fallback extractor.

use super::{ExtractError, Extractor, UploadedFile};
use async_trait::async_trait;

/// Decodes any file as UTF-8, replacing invalid sequences and dropping a leading byte order mark.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

#[async_trait]
impl Extractor for PlainTextExtractor {
    fn name(&self) -> &'static str {
        "text"
    }

    fn handles(&self, _mime_type: &str) -> bool {
        true
    }

    async fn extract(&self, file: &UploadedFile) -> Result<String, ExtractError> {
        let text = String::from_utf8_lossy(&file.bytes);
        Ok(text.strip_prefix('\u{feff}').unwrap_or(&*text).to_owned())
    }
}
