//! Answer selection and rendering.

use super::{Query, rank_sentences, split_sentences};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Message returned when no document text is available.
pub const NO_DOCUMENT_MESSAGE: &str =
    "No document loaded. Please upload a PDF or image so I can search it.";

const MAX_EXCERPTS: usize = 3;
const EXCERPT_SEPARATOR: &str = "\n\n";

/// Outcome of answering a query against a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// The document is empty.
    NoDocument,
    /// Nothing scored; the leading sentences are offered instead.
    Fallback {
        /// Query text as typed.
        query: String,
        /// Up to three leading sentences, in document order.
        excerpts: Vec<String>,
    },
    /// Best-scoring sentences, deduplicated, in rank order.
    Matches {
        /// Query text as typed.
        query: String,
        /// Up to three unique sentences.
        excerpts: Vec<String>,
    },
}

/// Discriminant of [`Answer`] reported to API clients and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerKind {
    /// See [`Answer::NoDocument`].
    NoDocument,
    /// See [`Answer::Fallback`].
    Fallback,
    /// See [`Answer::Matches`].
    Matches,
}

impl Answer {
    /// Which branch produced this answer.
    pub fn kind(&self) -> AnswerKind {
        match self {
            Self::NoDocument => AnswerKind::NoDocument,
            Self::Fallback { .. } => AnswerKind::Fallback,
            Self::Matches { .. } => AnswerKind::Matches,
        }
    }

    /// Sentences included in the answer.
    pub fn excerpts(&self) -> &[String] {
        match self {
            Self::NoDocument => &[],
            Self::Fallback { excerpts, .. } | Self::Matches { excerpts, .. } => excerpts.as_slice(),
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDocument => f.write_str(NO_DOCUMENT_MESSAGE),
            Self::Fallback { query, excerpts } => write!(
                f,
                "I couldn't find direct matches for \"{query}\". Here are some document excerpts you may find helpful:\n\n{}",
                excerpts.join(EXCERPT_SEPARATOR)
            ),
            Self::Matches { query, excerpts } => write!(
                f,
                "Here are the most relevant excerpts for \"{query}\":\n\n{}",
                excerpts.join(EXCERPT_SEPARATOR)
            ),
        }
    }
}

/// Answer `query` from `document`.
///
/// Pure and synchronous; never fails. An empty document short-circuits before segmentation.
pub fn answer_query(document: &str, query: &Query) -> Answer {
    if document.is_empty() {
        return Answer::NoDocument;
    }

    let sentences = split_sentences(document);
    let ranked = rank_sentences(&sentences, query);

    if ranked.is_empty() {
        return Answer::Fallback {
            query: query.text().to_string(),
            excerpts: sentences
                .iter()
                .take(MAX_EXCERPTS)
                .map(|sentence| sentence.to_string())
                .collect(),
        };
    }

    let mut seen = HashSet::new();
    let excerpts = ranked
        .iter()
        .take(MAX_EXCERPTS)
        .filter(|candidate| seen.insert(candidate.text))
        .map(|candidate| candidate.text.to_string())
        .collect();

    Answer::Matches {
        query: query.text().to_string(),
        excerpts,
    }
}

/// Answer `query` from `document` and render the reply text.
pub fn answer_text(document: &str, query: &Query) -> String {
    answer_query(document, query).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(text: &str) -> Query {
        Query::new(text).expect("valid query")
    }

    #[test]
    fn empty_document_yields_guidance_for_any_query() {
        for q in ["cat", "anything at all", "?"] {
            let answer = answer_query("", &query(q));
            assert_eq!(answer, Answer::NoDocument);
            assert_eq!(answer.to_string(), NO_DOCUMENT_MESSAGE);
        }
    }

    #[test]
    fn matching_sentences_keep_document_order_on_ties() {
        let document = "The cat sat. The dog ran. The cat slept.";
        let answer = answer_query(document, &query("cat"));
        assert_eq!(answer.kind(), AnswerKind::Matches);
        assert_eq!(answer.excerpts(), ["The cat sat", "The cat slept"]);
        assert_eq!(
            answer.to_string(),
            "Here are the most relevant excerpts for \"cat\":\n\nThe cat sat\n\nThe cat slept"
        );
    }

    #[test]
    fn no_match_falls_back_to_leading_sentences() {
        let answer = answer_query("Hello world", &query("zzz"));
        assert_eq!(
            answer.to_string(),
            "I couldn't find direct matches for \"zzz\". Here are some document excerpts you may find helpful:\n\nHello world"
        );
    }

    #[test]
    fn fallback_takes_first_three_without_dedup() {
        let document = "Alpha. Alpha. Beta. Gamma. Delta.";
        let answer = answer_query(document, &query("zzz"));
        assert_eq!(answer.kind(), AnswerKind::Fallback);
        assert_eq!(answer.excerpts(), ["Alpha", "Alpha", "Beta"]);
    }

    #[test]
    fn punctuation_only_document_falls_back_with_no_excerpts() {
        let answer = answer_query("...!?", &query("cat"));
        assert_eq!(answer.kind(), AnswerKind::Fallback);
        assert!(answer.excerpts().is_empty());
        assert!(answer.to_string().ends_with("helpful:\n\n"));
    }

    #[test]
    fn duplicates_in_top_three_collapse_in_rank_order() {
        let document = "A cat. Cat and dog. A cat. A cat. Last cat";
        let answer = answer_query(document, &query("cat dog"));
        // "Cat and dog" ranks first; the next two slots are the same sentence.
        assert_eq!(answer.excerpts(), ["Cat and dog", "A cat"]);
    }

    #[test]
    fn only_top_three_ranked_sentences_are_considered() {
        let document = "one cat. two cat. three cat. four cat.";
        let answer = answer_query(document, &query("cat"));
        assert_eq!(answer.excerpts(), ["one cat", "two cat", "three cat"]);
    }

    #[test]
    fn display_uses_query_as_typed() {
        let answer = answer_query("The Cat sat", &query("  CAT  "));
        assert!(answer.to_string().starts_with("Here are the most relevant excerpts for \"CAT\""));
    }

    #[test]
    fn repeated_calls_are_deterministic() {
        let document = "b dog. a cat dog. c cat. d cat.";
        let q = query("cat dog");
        assert_eq!(answer_text(document, &q), answer_text(document, &q));
    }
}
