//! Lexical relevance retrieval over an aggregated document.

mod answer;
pub mod scoring;
pub mod segment;

pub use answer::{Answer, AnswerKind, NO_DOCUMENT_MESSAGE, answer_query, answer_text};
pub use scoring::{ScoredSentence, rank_sentences, score_sentence};
pub use segment::split_sentences;

use thiserror::Error;

/// Errors raised while validating raw query input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    /// Query was empty after trimming whitespace.
    #[error("query must not be empty")]
    Empty,
}

/// A validated user query.
///
/// Keeps the trimmed original text for display and the lowercased words used for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
    words: Vec<String>,
}

impl Query {
    /// Validate raw input, rejecting blank queries.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, QueryError> {
        let text = raw.as_ref().trim();
        if text.is_empty() {
            return Err(QueryError::Empty);
        }
        let words = text
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        Ok(Self {
            text: text.to_string(),
            words,
        })
    }

    /// Query text as the user typed it (trimmed).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Lowercased, whitespace-separated words used for scoring.
    pub fn words(&self) -> &[String] {
        &self.words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_queries_are_rejected() {
        assert_eq!(Query::new(""), Err(QueryError::Empty));
        assert_eq!(Query::new(" \t\n "), Err(QueryError::Empty));
    }

    #[test]
    fn query_keeps_display_text_and_lowercases_words() {
        let query = Query::new("  What  is the Cat's NAME?\n").expect("valid query");
        assert_eq!(query.text(), "What  is the Cat's NAME?");
        assert_eq!(query.words(), ["what", "is", "the", "cat's", "name?"]);
    }
}
