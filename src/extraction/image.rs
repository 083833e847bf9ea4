//! Image extractor backed by an OCR engine.

use super::{ExtractError, Extractor, UploadedFile};
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Optical character recognition over raw image bytes.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Recognize the text contained in an encoded image.
    async fn recognize(&self, image: &[u8]) -> Result<String, ExtractError>;
}

/// OCR engine that pipes images through the `tesseract` command-line tool.
///
/// Runs `tesseract stdin stdout -l <language>`; the binary must be installed separately.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    binary: String,
    language: String,
}

impl TesseractCli {
    /// Configure the binary path and recognition language.
    pub fn new(binary: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractCli {
    async fn recognize(&self, image: &[u8]) -> Result<String, ExtractError> {
        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout", "-l", self.language.as_str()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ExtractError::Ocr("tesseract stdin unavailable".into()))?;
        let write = async move {
            stdin.write_all(image).await?;
            stdin.shutdown().await
        };
        let (written, output) = tokio::join!(write, child.wait_with_output());
        let output = output?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::Ocr(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        if let Err(err) = written {
            debug!(error = %err, "tesseract closed stdin early");
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Extractor for `image/*` uploads.
#[derive(Clone)]
pub struct ImageExtractor {
    engine: Arc<dyn OcrEngine>,
}

impl ImageExtractor {
    /// Wrap an OCR engine.
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl Extractor for ImageExtractor {
    fn name(&self) -> &'static str {
        "image"
    }

    fn handles(&self, mime_type: &str) -> bool {
        mime_type
            .get(..6)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
    }

    async fn extract(&self, file: &UploadedFile) -> Result<String, ExtractError> {
        debug!(file = %file.file_name, bytes = file.bytes.len(), "Running OCR");
        self.engine.recognize(&file.bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoOcr;

    #[async_trait]
    impl OcrEngine for EchoOcr {
        async fn recognize(&self, image: &[u8]) -> Result<String, ExtractError> {
            Ok(format!("recognized {} bytes", image.len()))
        }
    }

    #[test]
    fn handles_any_image_subtype() {
        let extractor = ImageExtractor::new(Arc::new(EchoOcr));
        assert!(extractor.handles("image/png"));
        assert!(extractor.handles("IMAGE/jpeg"));
        assert!(!extractor.handles("application/pdf"));
        assert!(!extractor.handles("img"));
    }

    #[tokio::test]
    async fn delegates_to_the_engine() {
        let extractor = ImageExtractor::new(Arc::new(EchoOcr));
        let file = UploadedFile::new("scan.png", "image/png", vec![0u8; 12]);
        let text = extractor.extract(&file).await.expect("ocr text");
        assert_eq!(text, "recognized 12 bytes");
    }

    #[tokio::test]
    async fn missing_tesseract_binary_is_an_io_error() {
        let engine = TesseractCli::new("/nonexistent/docchat-tesseract", "eng");
        let result = engine.recognize(b"\x89PNG").await;
        assert!(matches!(result, Err(ExtractError::Io(_))));
    }
}
