//! Corpus builder: folds per-file extraction results into one aggregated document.

use sha2::{Digest, Sha256};

/// Join extracted fragments into the aggregated document text.
///
/// Every fragment, including the first, is prefixed with a newline before concatenation and the
/// result is trimmed. Empty fragments are valid input, so a batch whose extraction failed
/// entirely yields an empty document rather than an error.
pub fn build_document<I, T>(fragments: I) -> String
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut aggregated = String::new();
    for fragment in fragments {
        aggregated.push('\n');
        aggregated.push_str(fragment.as_ref());
    }
    aggregated.trim().to_string()
}

/// Return at most `max_chars` leading characters of the document.
pub fn preview(document: &str, max_chars: usize) -> &str {
    match document.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &document[..byte_index],
        None => document,
    }
}

/// Stable SHA-256 fingerprint of a document, hex encoded.
pub fn fingerprint(document: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document.as_bytes());
    hex::encode(hasher.finalize())
}
