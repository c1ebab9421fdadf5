//! Best-match selection over catalog candidates.
//!
//! Scoring runs in three phases:
//!
//! 1. **ISBN fast path**: a candidate whose ISBN is the query's ISBN (in either
//!    ISBN-10 or ISBN-13 form) wins outright with score 100.
//! 2. **Fuzzy title scoring**: every query title variation is compared with
//!    every candidate title variation using four weighted similarity measures,
//!    adjusted by word-overlap and length penalties and an exact-title boost.
//! 3. **Bonuses**: the best fuzzy candidate gains confidence from a shared ISBN
//!    prefix or a matching author, and may be rejected by the author policy.

use std::collections::{BTreeSet, HashSet};

use crate::config::{ConfigError, MatchingConfig, MatchingWeights};
use crate::matching::{fuzz, isbn, title};
use crate::models::{Bonus, CandidateRecord, MatchOutcome, MatchType, Query};

/// Either string longer than this switches to the long-title weights
const LONG_TITLE_CHARS: usize = 50;

/// Query variations with at most this many words get the overlap check
const SHORT_TITLE_WORDS: usize = 3;

const SHORT_TITLE_PENALTY: f64 = 0.7;
const LONG_PAIR_LENGTH_PENALTY: f64 = 0.95;
const SHORT_PAIR_LENGTH_PENALTY: f64 = 0.9;
const EXACT_MAIN_TITLE_BOOST: f64 = 1.2;
const ISBN_PARTIAL_BONUS: f64 = 1.10;
const AUTHOR_EXACT_BONUS: f64 = 1.15;

/// Author similarity at or above this earns the author bonus
const AUTHOR_EXACT_SIMILARITY: f64 = 0.95;

/// Author similarity below this rejects a match when authors are required
const AUTHOR_REQUIRED_SIMILARITY: f64 = 0.5;

/// Scores catalog candidates against a query
#[derive(Debug, Clone)]
pub struct MatchScorer {
    config: MatchingConfig,
}

/// A candidate title variation tagged with the candidate it came from
struct CandidateVariation {
    candidate: usize,
    text: String,
    exact_main_title: bool,
}

impl MatchScorer {
    /// Create a scorer, validating threshold and weights
    pub fn new(config: MatchingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Pick the best candidate for the query
    pub fn score(&self, query: &Query, candidates: &[CandidateRecord]) -> MatchOutcome {
        if self.config.use_isbn {
            if let Some(outcome) = isbn_exact_match(query, candidates) {
                tracing::debug!(
                    query = query.title(),
                    matched = outcome.best_title.as_deref().unwrap_or_default(),
                    "ISBN exact match"
                );
                return outcome;
            }
        }

        if candidates.is_empty() {
            return MatchOutcome::not_found();
        }

        let Some((index, raw_score)) = self.best_fuzzy(query, candidates) else {
            return MatchOutcome::not_found();
        };
        let Some(candidate) = candidates.get(index) else {
            return MatchOutcome::not_found();
        };

        let outcome = self.apply_bonuses(query, candidate, raw_score);
        tracing::debug!(
            query = query.title(),
            closest = candidate.title.as_str(),
            score = outcome.score,
            found = outcome.found,
            match_type = %outcome.match_type,
            "Fuzzy match scored"
        );
        outcome
    }

    /// Highest weighted score over all variation pairs, with the producing candidate
    fn best_fuzzy(&self, query: &Query, candidates: &[CandidateRecord]) -> Option<(usize, f64)> {
        let query_variations = title::variations(query.title());
        if query_variations.is_empty() {
            return None;
        }

        let query_main = title::normalize(query.title()).main;
        let candidate_variations: Vec<CandidateVariation> = candidates
            .iter()
            .enumerate()
            .flat_map(|(index, candidate)| {
                let exact_main_title = title::normalize(&candidate.title).main == query_main;
                title::variations(&candidate.title)
                    .into_iter()
                    .map(move |text| CandidateVariation {
                        candidate: index,
                        text,
                        exact_main_title,
                    })
            })
            .collect();

        let mut best: Option<(usize, f64)> = None;
        for query_variation in &query_variations {
            for variation in &candidate_variations {
                let score = self.pair_score(query_variation, variation);
                if best.map_or(true, |(_, best_score)| score > best_score) {
                    best = Some((variation.candidate, score));
                }
            }
        }
        best
    }

    /// Weighted similarity of one query variation against one candidate variation
    fn pair_score(&self, query: &str, candidate: &CandidateVariation) -> f64 {
        let text = candidate.text.as_str();
        let query_len = query.chars().count();
        let candidate_len = text.chars().count();

        let weights = if query_len > LONG_TITLE_CHARS || candidate_len > LONG_TITLE_CHARS {
            MatchingWeights::LONG_TITLE
        } else {
            self.config.weights
        };

        let mut score = weights.combine(
            fuzz::ratio(query, text),
            fuzz::partial_ratio(query, text),
            fuzz::token_sort_ratio(query, text),
            fuzz::token_set_ratio(query, text),
        );

        let query_words: Vec<&str> = query.split_whitespace().collect();
        if query_words.len() <= SHORT_TITLE_WORDS {
            let candidate_words: HashSet<&str> = text.split_whitespace().collect();
            let shared = query_words
                .iter()
                .filter(|word| candidate_words.contains(*word))
                .count();
            if (shared as f64) < query_words.len() as f64 / 2.0 {
                score *= SHORT_TITLE_PENALTY;
            }
        }

        let len_sum = query_len + candidate_len;
        let len_diff = query_len.abs_diff(candidate_len);
        if len_sum > 100 {
            if len_diff > 30 {
                score *= LONG_PAIR_LENGTH_PENALTY;
            }
        } else if len_diff > 10 {
            score *= SHORT_PAIR_LENGTH_PENALTY;
        }

        if candidate.exact_main_title {
            score *= EXACT_MAIN_TITLE_BOOST;
        }

        score
    }

    fn apply_bonuses(&self, query: &Query, candidate: &CandidateRecord, raw_score: f64) -> MatchOutcome {
        let mut score = clamp_score(raw_score);
        let mut match_type = MatchType::Fuzzy;
        let mut bonuses_applied = BTreeSet::new();

        if self.config.use_isbn && shares_isbn_prefix(query, candidate) {
            score = clamp_score(score * ISBN_PARTIAL_BONUS);
            match_type = MatchType::FuzzyIsbnPartial;
            bonuses_applied.insert(Bonus::IsbnPartial);
        }

        let author_match = query
            .author()
            .map(|author| author_similarity(author, candidate.author.as_deref().unwrap_or_default()));

        if author_match.is_some_and(|similarity| similarity >= AUTHOR_EXACT_SIMILARITY) {
            score = clamp_score(score * AUTHOR_EXACT_BONUS);
            match_type = if bonuses_applied.contains(&Bonus::IsbnPartial) {
                MatchType::FuzzyIsbnAuthor
            } else {
                MatchType::FuzzyAuthorExact
            };
            bonuses_applied.insert(Bonus::AuthorExact);
        }

        let rejected = self.config.require_author_match
            && author_match.is_some_and(|similarity| similarity < AUTHOR_REQUIRED_SIMILARITY);
        if rejected {
            tracing::debug!(
                query = query.title(),
                candidate = candidate.title.as_str(),
                "Match rejected: author mismatch"
            );
        }

        let score = score.round() as u8;
        MatchOutcome {
            found: score >= self.config.threshold && !rejected,
            best_title: Some(candidate.title.clone()),
            score,
            match_type,
            candidate: Some(candidate.clone()),
            bonuses_applied,
        }
    }
}

/// First candidate whose ISBN is a variant of the query ISBN
fn isbn_exact_match(query: &Query, candidates: &[CandidateRecord]) -> Option<MatchOutcome> {
    let wanted = isbn::variants(query.isbn()?);
    if wanted.is_empty() {
        return None;
    }

    let candidate = candidates.iter().find(|candidate| {
        candidate
            .isbn
            .as_deref()
            .and_then(isbn::normalize)
            .is_some_and(|candidate_isbn| wanted.contains(&candidate_isbn))
    })?;

    Some(MatchOutcome {
        found: true,
        best_title: Some(candidate.title.clone()),
        score: 100,
        match_type: MatchType::IsbnExact,
        candidate: Some(candidate.clone()),
        bonuses_applied: BTreeSet::new(),
    })
}

fn shares_isbn_prefix(query: &Query, candidate: &CandidateRecord) -> bool {
    let query_isbn = query.isbn().and_then(isbn::normalize);
    let candidate_isbn = candidate.isbn.as_deref().and_then(isbn::normalize);

    match (query_isbn, candidate_isbn) {
        (Some(q), Some(c)) => q.prefix9() == c.prefix9(),
        _ => false,
    }
}

/// Token-set similarity of two author strings in 0.0..=1.0
pub fn author_similarity(a: &str, b: &str) -> f64 {
    fuzz::token_set_ratio(a, b) / 100.0
}

fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}
