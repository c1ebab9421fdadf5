//! JSON report: run metadata plus one object per match.

use serde::Serialize;

use super::{score_pct, OutputError, ReportMetadata};
use crate::models::{MatchResult, MatchType};

#[derive(Serialize)]
struct JsonReport<'a> {
    metadata: JsonMetadata<'a>,
    matches: Vec<JsonMatch<'a>>,
}

#[derive(Serialize)]
struct JsonMetadata<'a> {
    #[serde(flatten)]
    run: &'a ReportMetadata,
    total_matches: usize,
}

#[derive(Serialize)]
struct JsonMatch<'a> {
    goodreads_title: &'a str,
    bookoutlet_match: &'a str,
    score: u8,
    score_pct: String,
    match_type: MatchType,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    price: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cover_url: Option<&'a str>,
}

pub(super) fn render(
    matches: &[MatchResult],
    metadata: &ReportMetadata,
) -> Result<String, OutputError> {
    let report = JsonReport {
        metadata: JsonMetadata {
            run: metadata,
            total_matches: matches.len(),
        },
        matches: matches
            .iter()
            .map(|m| JsonMatch {
                goodreads_title: &m.query_title,
                bookoutlet_match: &m.matched_title,
                score: m.score,
                score_pct: score_pct(m),
                match_type: m.match_type,
                author: m.author.as_deref(),
                price: m.price.as_deref(),
                url: m.url.as_deref(),
                cover_url: m.cover_url.as_deref(),
            })
            .collect(),
    };

    let mut rendered = serde_json::to_string_pretty(&report)?;
    rendered.push('\n');
    Ok(rendered)
}
