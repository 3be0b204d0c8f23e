//! Similarity scoring between a completion query and a symbol's display name.
//!
//! Both strings are normalized first: lowercased, every non-alphanumeric
//! character replaced by a space, and trimmed. The normalized query is then
//! matched with `nucleo-matcher` and the raw score is expressed relative to the
//! score the query earns against itself, which puts it in `0.0..=1.0`.
//!
//! The final score lives in `0.0..=100.0`:
//!
//! - `100` only when the normalized strings are identical;
//! - otherwise the relative match quality scaled by a ceiling that shrinks as
//!   the two strings drift apart in length (`95` for similar lengths, `90` up
//!   to an 8x difference, `60` beyond);
//! - when the query is not a fuzzy subsequence of the candidate (a typo), the
//!   best normalized Damerau-Levenshtein similarity between the query and any
//!   equally long window of the candidate, scaled by the same ceiling.

use nucleo_matcher::{
    Config, Matcher, Utf32Str,
    pattern::{AtomKind, CaseMatching, Normalization, Pattern},
};

pub const MAX_SCORE: f64 = 100.0;

const SIMILAR_LENGTH_CEILING: f64 = 95.0;
const PARTIAL_CEILING: f64 = 90.0;
const DISTANT_CEILING: f64 = 60.0;
const SIMILAR_LENGTH_RATIO: f64 = 1.5;
const PARTIAL_LENGTH_RATIO: f64 = 8.0;

pub(crate) struct FuzzyScorer {
    matcher: Matcher,
    pattern: Pattern,
    query: String,
    query_len: usize,
    perfect_score: u32,
    buf: Vec<char>,
}

impl FuzzyScorer {
    pub(crate) fn new(query: &str) -> Self {
        let query = normalize(query);
        let query_len = query.chars().count();
        let mut matcher = Matcher::new(Config::DEFAULT);
        let pattern = Pattern::new(&query, CaseMatching::Ignore, Normalization::Smart, AtomKind::Fuzzy);
        let mut buf = Vec::new();
        let perfect_score = pattern.score(Utf32Str::new(&query, &mut buf), &mut matcher).unwrap_or(0);

        Self {
            matcher,
            pattern,
            query,
            query_len,
            perfect_score,
            buf,
        }
    }

    pub(crate) fn score(
        &mut self,
        candidate: &str,
    ) -> f64 {
        let candidate = normalize(candidate);
        if self.query.is_empty() || candidate.is_empty() {
            return 0.0;
        }
        if candidate == self.query {
            return MAX_SCORE;
        }

        let Some(raw) = self.pattern.score(Utf32Str::new(&candidate, &mut self.buf), &mut self.matcher) else {
            return self.typo_score(&candidate);
        };
        if self.perfect_score == 0 {
            return 0.0;
        }

        let quality = (f64::from(raw) / f64::from(self.perfect_score)).min(1.0);
        let ceiling = length_ceiling(self.query_len, candidate.chars().count());
        round_score(quality * ceiling)
    }

    /// Edit-distance similarity against the best-aligned window of `candidate`.
    fn typo_score(
        &self,
        candidate: &str,
    ) -> f64 {
        let chars: Vec<char> = candidate.chars().collect();
        let width = self.query_len.min(chars.len()).max(1);
        let best = chars
            .windows(width)
            .map(|window| {
                let window: String = window.iter().collect();
                strsim::normalized_damerau_levenshtein(&self.query, &window)
            })
            .fold(0.0, f64::max);
        round_score(best * length_ceiling(self.query_len, chars.len()))
    }
}

fn length_ceiling(
    query_len: usize,
    candidate_len: usize,
) -> f64 {
    let shorter = query_len.min(candidate_len).max(1) as f64;
    let longer = query_len.max(candidate_len) as f64;
    let ratio = longer / shorter;

    if ratio < SIMILAR_LENGTH_RATIO {
        SIMILAR_LENGTH_CEILING
    } else if ratio <= PARTIAL_LENGTH_RATIO {
        PARTIAL_CEILING
    } else {
        DISTANT_CEILING
    }
}

fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

/// Lowercase, map non-alphanumerics to spaces, trim.
pub(crate) fn normalize(text: &str) -> String {
    let mapped: String = text
        .chars()
        .flat_map(|ch| {
            let ch = if ch.is_alphanumeric() { ch } else { ' ' };
            ch.to_lowercase()
        })
        .collect();
    mapped.trim().to_string()
}

#[cfg(test)]
#[path = "../../tests/src/symbols/fuzzy_tests.rs"]
mod tests;
