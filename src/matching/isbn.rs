//! ISBN normalization, checksum validation and ISBN-10/ISBN-13 conversion.
//!
//! Malformed identifiers are never an error: every function here signals
//! failure with `None` (or `false`), so a bad ISBN in the input simply
//! disables the ISBN-based scoring paths for that query.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Spreadsheet formula wrapper used by Goodreads exports, e.g. `="0262046482"`
static FORMULA_CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"="([^"]*)""#).expect("valid formula regex"));

/// ISBN flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsbnKind {
    Isbn10,
    Isbn13,
}

/// A normalized ISBN: no separators, upper-case, correct length and shape
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Isbn(String);

impl Isbn {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> IsbnKind {
        if self.0.len() == 10 {
            IsbnKind::Isbn10
        } else {
            IsbnKind::Isbn13
        }
    }

    /// The first nine characters, used for partial (same-work) comparisons
    pub fn prefix9(&self) -> &str {
        &self.0[..9]
    }
}

impl std::fmt::Display for Isbn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Isbn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn strip_separators(raw: &str) -> String {
    raw.trim().chars().filter(|c| *c != '-' && *c != ' ').collect()
}

/// 9 digits plus a digit or `X`, or 13 digits
fn has_isbn_shape(candidate: &str) -> bool {
    let bytes = candidate.as_bytes();
    match bytes.len() {
        10 => {
            bytes[..9].iter().all(u8::is_ascii_digit)
                && (bytes[9].is_ascii_digit() || bytes[9] == b'X')
        }
        13 => bytes.iter().all(u8::is_ascii_digit),
        _ => false,
    }
}

fn digit(c: u8) -> u32 {
    u32::from(c - b'0')
}

/// Normalize an ISBN by removing hyphens and spaces and upper-casing
pub fn normalize(raw: &str) -> Option<Isbn> {
    let cleaned = strip_separators(raw).to_uppercase();
    has_isbn_shape(&cleaned).then_some(Isbn(cleaned))
}

/// Convert an ISBN-10 into its ISBN-13 (978-prefixed) form
pub fn to_isbn13(isbn10: &str) -> Option<Isbn> {
    let isbn = normalize(isbn10)?;
    if isbn.kind() != IsbnKind::Isbn10 {
        return None;
    }

    let base = format!("978{}", isbn.prefix9());
    let sum: u32 = base
        .bytes()
        .enumerate()
        .map(|(i, c)| digit(c) * if i % 2 == 0 { 1 } else { 3 })
        .sum();
    let check = (10 - sum % 10) % 10;

    Some(Isbn(format!("{base}{check}")))
}

/// Convert a 978-prefixed ISBN-13 into its ISBN-10 form
///
/// 979-prefixed ISBN-13s have no ISBN-10 equivalent.
pub fn to_isbn10(isbn13: &str) -> Option<Isbn> {
    let isbn = normalize(isbn13)?;
    if isbn.kind() != IsbnKind::Isbn13 || !isbn.as_str().starts_with("978") {
        return None;
    }

    let base = &isbn.as_str()[3..12];
    let sum: u32 = base
        .bytes()
        .zip((2..=10).rev())
        .map(|(c, weight)| digit(c) * weight)
        .sum();

    let check = match (11 - sum % 11) % 11 {
        value @ 0..=9 => char::from_digit(value, 10)?,
        10 => 'X',
        _ => return None,
    };

    Some(Isbn(format!("{base}{check}")))
}

/// The normalized ISBN plus its cross-format conversion when one exists
pub fn variants(isbn: &str) -> BTreeSet<Isbn> {
    let Some(normalized) = normalize(isbn) else {
        return BTreeSet::new();
    };

    let converted = match normalized.kind() {
        IsbnKind::Isbn10 => to_isbn13(normalized.as_str()),
        IsbnKind::Isbn13 => to_isbn10(normalized.as_str()),
    };

    let mut set = BTreeSet::from([normalized]);
    set.extend(converted);
    set
}

/// Validate an ISBN-10 (mod 11) or ISBN-13 (mod 10) checksum
pub fn validate_checksum(isbn: &str) -> bool {
    let Some(normalized) = normalize(isbn) else {
        return false;
    };

    match normalized.kind() {
        IsbnKind::Isbn10 => {
            let sum: u32 = normalized
                .as_str()
                .bytes()
                .zip((1..=10).rev())
                .map(|(c, weight)| {
                    let value = if c == b'X' { 10 } else { digit(c) };
                    value * weight
                })
                .sum();
            sum % 11 == 0
        }
        IsbnKind::Isbn13 => {
            let sum: u32 = normalized
                .as_str()
                .bytes()
                .enumerate()
                .map(|(i, c)| digit(c) * if i % 2 == 0 { 1 } else { 3 })
                .sum();
            sum % 10 == 0
        }
    }
}

/// Extract an ISBN from a spreadsheet cell
///
/// Formula-wrapped cells (`="..."`) yield their trimmed content, or `None` when
/// empty. Plain cells are accepted only if they already look like an ISBN.
pub fn extract_from_formula_cell(cell: &str) -> Option<String> {
    if cell.is_empty() {
        return None;
    }

    if let Some(captures) = FORMULA_CELL.captures(cell) {
        let content = captures.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
        return (!content.is_empty()).then(|| content.to_string());
    }

    let cleaned = strip_separators(cell);
    has_isbn_shape(&cleaned).then_some(cleaned)
}
