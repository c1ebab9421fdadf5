//! Title normalization and search variations.
//!
//! Catalog titles and reading-list titles disagree on articles, series
//! annotations, edition markers and subtitles. Normalization strips the noise
//! and [`variations`] produces the handful of strings the scorer compares.

use regex::Regex;
use std::sync::LazyLock;

static LEADING_ARTICLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:the|a|an)\s+").expect("valid article regex"));

/// Parenthetical annotations and edition suffixes that never identify a work
static ANNOTATIONS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\s*\([^)]*series[^)]*\)",
        r"(?i)\s*\([^)]*book\s*\d+[^)]*\)",
        r"(?i)\s*\([^)]*#\s*\d+[^)]*\)",
        r"(?i)\s*\(volume\s*\d+\)",
        r"(?i)\s*\(vol\.?\s*\d+\)",
        r"(?i)\s*\(\d+\)",
        r"(?i)\s*\([^)]*edition[^)]*\)",
        r"(?i),?\s*\b\d+(?:st|nd|rd|th)\s+edition\b",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid annotation regex"))
    .collect()
});

const STRIPPED_PUNCTUATION: &[char] = &['\'', '"', ':', ';', ',', '.', '[', ']', '(', ')'];

/// Subtitles longer than this also yield a shortened variation
const SHORT_SUBTITLE_WORDS: usize = 3;

/// A title split into its canonical main part and optional subtitle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTitle {
    pub main: String,
    pub subtitle: Option<String>,
}

/// Normalize a raw title into main title and subtitle
pub fn normalize(title: &str) -> NormalizedTitle {
    let lowered = title.trim().to_lowercase();
    let mut cleaned = LEADING_ARTICLE.replace(&lowered, "").into_owned();

    for pattern in ANNOTATIONS.iter() {
        cleaned = pattern.replace_all(&cleaned, "").into_owned();
    }

    let (main, subtitle) = match cleaned.split_once(':') {
        Some((main, subtitle)) => (main, Some(collapse_whitespace(subtitle))),
        None => (cleaned.as_str(), None),
    };

    NormalizedTitle {
        main: strip_punctuation(main),
        subtitle: subtitle.filter(|s| !s.is_empty()),
    }
}

/// Title strings worth comparing, most specific last
///
/// Always contains the normalized main title (when non-empty); a subtitle adds
/// the full `main subtitle` form and, for long subtitles, `main` plus the first
/// three subtitle words.
pub fn variations(title: &str) -> Vec<String> {
    let normalized = normalize(title);
    let mut variations = Vec::new();

    if !normalized.main.is_empty() {
        variations.push(normalized.main.clone());
    }

    if let Some(subtitle) = normalized.subtitle.as_deref().map(strip_punctuation) {
        if !subtitle.is_empty() {
            variations.push(join_words(&normalized.main, &subtitle));

            let words: Vec<&str> = subtitle.split_whitespace().collect();
            if words.len() > SHORT_SUBTITLE_WORDS {
                let short = words[..SHORT_SUBTITLE_WORDS].join(" ");
                variations.push(join_words(&normalized.main, &short));
            }
        }
    }

    variations
}

fn strip_punctuation(text: &str) -> String {
    collapse_whitespace(&text.replace(STRIPPED_PUNCTUATION, ""))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn join_words(left: &str, right: &str) -> String {
    format!("{left} {right}").trim().to_string()
}
