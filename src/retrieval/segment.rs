//! Sentence segmentation.

/// Split a document into trimmed, non-empty sentences in document order.
///
/// Boundaries are `.`, `?`, `!` and newlines; a run of boundary characters counts as one.
/// Duplicate sentences are kept.
pub fn split_sentences(document: &str) -> Vec<&str> {
    document
        .split(is_boundary)
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .collect()
}

fn is_boundary(c: char) -> bool {
    matches!(c, '.' | '?' | '!' | '\n')
}
