//! Match classification and result models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{CandidateRecord, Query};

/// Which evidence produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Query and candidate ISBNs are the same book (either format)
    IsbnExact,
    /// Title similarity only
    Fuzzy,
    /// Title similarity plus a shared 9-character ISBN prefix
    FuzzyIsbnPartial,
    /// Title similarity plus a near-identical author
    FuzzyAuthorExact,
    /// Title similarity plus both the ISBN prefix and the author bonus
    FuzzyIsbnAuthor,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::IsbnExact => "isbn_exact",
            MatchType::Fuzzy => "fuzzy",
            MatchType::FuzzyIsbnPartial => "fuzzy_isbn_partial",
            MatchType::FuzzyAuthorExact => "fuzzy_author_exact",
            MatchType::FuzzyIsbnAuthor => "fuzzy_isbn_author",
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Post-hoc confidence adjustments applied to a fuzzy match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bonus {
    IsbnPartial,
    AuthorExact,
}

/// What the scorer concluded for one query
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    /// Whether the best candidate passed the threshold and author policy
    pub found: bool,

    /// Title of the closest candidate, even when not found
    pub best_title: Option<String>,

    /// Final confidence in 0..=100
    pub score: u8,

    pub match_type: MatchType,

    /// The closest candidate record
    pub candidate: Option<CandidateRecord>,

    pub bonuses_applied: BTreeSet<Bonus>,
}

impl MatchOutcome {
    /// An outcome with no usable candidate
    pub fn not_found() -> Self {
        Self {
            found: false,
            best_title: None,
            score: 0,
            match_type: MatchType::Fuzzy,
            candidate: None,
            bonuses_applied: BTreeSet::new(),
        }
    }

    /// Convert into a public result; `None` unless the match was found
    pub fn into_match_result(self, query: &Query) -> Option<MatchResult> {
        if !self.found {
            return None;
        }

        let candidate = self.candidate?;
        Some(MatchResult {
            query_title: query.title().to_string(),
            matched_title: candidate.title,
            author: candidate.author,
            score: self.score,
            match_type: self.match_type,
            price: candidate.price,
            url: candidate.url,
            cover_url: candidate.cover_url,
            isbn: candidate.isbn,
            bonuses_applied: self.bonuses_applied,
        })
    }
}

/// A confirmed match between a query and a catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub query_title: String,
    pub matched_title: String,
    pub author: Option<String>,
    pub score: u8,
    pub match_type: MatchType,
    pub price: Option<String>,
    pub url: Option<String>,
    pub cover_url: Option<String>,
    pub isbn: Option<String>,
    #[serde(default)]
    pub bonuses_applied: BTreeSet<Bonus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CandidateBuilder;

    #[test]
    fn test_match_type_serializes_snake_case() {
        let json = serde_json::to_string(&MatchType::FuzzyIsbnAuthor).unwrap();
        assert_eq!(json, "\"fuzzy_isbn_author\"");
        assert_eq!(MatchType::IsbnExact.to_string(), "isbn_exact");
    }

    #[test]
    fn test_not_found_has_no_result() {
        let query = Query::new("Dune").unwrap();
        assert!(MatchOutcome::not_found().into_match_result(&query).is_none());
    }

    #[test]
    fn test_found_outcome_carries_candidate_fields() {
        let query = Query::new("Dune").unwrap();
        let outcome = MatchOutcome {
            found: true,
            best_title: Some("Dune".to_string()),
            score: 97,
            match_type: MatchType::FuzzyAuthorExact,
            candidate: Some(
                CandidateBuilder::new("Dune")
                    .author("Frank Herbert")
                    .price("$7.99")
                    .build(),
            ),
            bonuses_applied: BTreeSet::from([Bonus::AuthorExact]),
        };

        let result = outcome.into_match_result(&query).unwrap();
        assert_eq!(result.query_title, "Dune");
        assert_eq!(result.matched_title, "Dune");
        assert_eq!(result.author.as_deref(), Some("Frank Herbert"));
        assert_eq!(result.price.as_deref(), Some("$7.99"));
        assert_eq!(result.score, 97);
        assert!(result.bonuses_applied.contains(&Bonus::AuthorExact));
    }
}
