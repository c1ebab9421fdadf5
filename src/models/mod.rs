//! Core data models for book queries, catalog candidates and match results.

mod book;
mod matching;
mod task;

pub use book::{CandidateBuilder, CandidateRecord, Query, QueryError};
pub use matching::{Bonus, MatchOutcome, MatchResult, MatchType};
pub use task::SearchTask;
