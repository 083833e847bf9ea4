//! Keyword scoring and ranking of sentences against a query.
//!
//! Each query word contributes to a sentence's score in two independent ways:
//!
//! - `+2` when the lowercased sentence contains the word as a substring;
//! - `+1` when the word with its vowels (`a`, `e`, `i`, `o`, `u`) removed is non-empty and is a
//!   substring of the sentence with its vowels removed.
//!
//! An exact hit always implies the vowel-stripped hit, so an exact word is worth 3. The
//! vowel-stripped check is a plain substring relaxation, not edit distance.

use super::Query;

const EXACT_MATCH_POINTS: u32 = 2;
const FUZZY_MATCH_POINTS: u32 = 1;

/// A sentence paired with its score for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredSentence<'a> {
    /// Sentence text as it appears in the document.
    pub text: &'a str,
    /// Accumulated keyword score.
    pub score: u32,
}

/// Remove lowercase ASCII vowels.
pub(crate) fn strip_vowels(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u'))
        .collect()
}

struct QueryTerm<'q> {
    word: &'q str,
    stripped: String,
}

fn query_terms(query: &Query) -> Vec<QueryTerm<'_>> {
    query
        .words()
        .iter()
        .filter(|word| !word.is_empty())
        .map(|word| QueryTerm {
            word: word.as_str(),
            stripped: strip_vowels(word),
        })
        .collect()
}

fn score_with_terms(sentence: &str, terms: &[QueryTerm<'_>]) -> u32 {
    let lower = sentence.to_lowercase();
    let lower_stripped = strip_vowels(&lower);
    terms.iter().fold(0, |score, term| {
        let mut gained = 0;
        if lower.contains(term.word) {
            gained += EXACT_MATCH_POINTS;
        }
        if !term.stripped.is_empty() && lower_stripped.contains(term.stripped.as_str()) {
            gained += FUZZY_MATCH_POINTS;
        }
        score + gained
    })
}

/// Score a single sentence against the query.
pub fn score_sentence(sentence: &str, query: &Query) -> u32 {
    score_with_terms(sentence, &query_terms(query))
}

/// Score every sentence, drop zero scores, and order by descending score.
///
/// The sort is stable: sentences with equal scores keep their document order.
pub fn rank_sentences<'a>(sentences: &[&'a str], query: &Query) -> Vec<ScoredSentence<'a>> {
    let terms = query_terms(query);
    let mut scored: Vec<ScoredSentence<'a>> = sentences
        .iter()
        .map(|&text| ScoredSentence {
            text,
            score: score_with_terms(text, &terms),
        })
        .filter(|candidate| candidate.score > 0)
        .collect();
    scored.sort_by(|left, right| right.score.cmp(&left.score));
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(text: &str) -> Query {
        Query::new(text).expect("valid query")
    }

    #[test]
    fn exact_hit_also_earns_vowel_stripped_bonus() {
        assert_eq!(score_sentence("The cat sat", &query("cat")), 3);
        assert_eq!(score_sentence("The dog ran", &query("cat")), 0);
    }

    #[test]
    fn vowel_stripped_match_alone_scores_one() {
        // "colour" -> "clr" appears in "color" -> "clr" without an exact hit.
        assert_eq!(score_sentence("My favourite color is red", &query("colour")), 1);
    }

    #[test]
    fn all_vowel_words_only_score_exactly() {
        assert_eq!(score_sentence("You and I", &query("i")), 2);
        assert_eq!(score_sentence("Nothing here", &query("ea")), 0);
    }

    #[test]
    fn matching_is_case_insensitive_and_substring_based() {
        assert_eq!(score_sentence("CATALOG entries", &query("Cat")), 3);
    }

    #[test]
    fn scores_accumulate_across_words() {
        let q = query("cat dog");
        assert_eq!(score_sentence("The cat chased the dog", &q), 6);
        assert_eq!(score_sentence("The cat slept", &q), 3);
    }

    #[test]
    fn repeated_query_words_count_each_time() {
        assert_eq!(score_sentence("The cat sat", &query("cat cat")), 6);
    }

    #[test]
    fn ranking_drops_zero_scores_and_is_stable() {
        let sentences = ["b cat", "no match", "a cat dog", "c cat"];
        let ranked = rank_sentences(&sentences, &query("cat dog"));
        let texts: Vec<&str> = ranked.iter().map(|s| s.text).collect();
        assert_eq!(texts, ["a cat dog", "b cat", "c cat"]);
        assert_eq!(ranked[0].score, 6);
        assert_eq!(ranked[1].score, 3);
    }
}
