//! String similarity measures on a 0..=100 scale.
//!
//! All measures are built on the normalized Levenshtein similarity from
//! `strsim` and rounded to whole numbers, so weighted combinations of them are
//! reproducible.

use std::collections::BTreeSet;
use strsim::normalized_levenshtein;

fn percent(similarity: f64) -> f64 {
    (similarity * 100.0).round()
}

/// Plain edit-distance similarity
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    percent(normalized_levenshtein(a, b))
}

/// Best similarity of the shorter string against any same-length window of the longer one
///
/// A shorter string contained verbatim in the longer one scores 100.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let (shorter, longer) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };

    if shorter.is_empty() {
        return 0.0;
    }
    if longer.contains(shorter) {
        return 100.0;
    }

    let window_len = shorter.chars().count();
    let longer_chars: Vec<char> = longer.chars().collect();
    if window_len == longer_chars.len() {
        return ratio(shorter, longer);
    }

    let mut best = 0.0_f64;
    for window in longer_chars.windows(window_len) {
        let window: String = window.iter().collect();
        best = best.max(normalized_levenshtein(shorter, &window));
    }
    percent(best)
}

/// Lower-case alphanumeric tokens
fn tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Similarity ignoring word order
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    let mut left = tokens(a);
    let mut right = tokens(b);
    left.sort();
    right.sort();
    ratio(&left.join(" "), &right.join(" "))
}

/// Similarity of the shared words against each side's full word set
///
/// Scores 100 when one side's words are a subset of the other's.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let left: BTreeSet<String> = tokens(a).into_iter().collect();
    let right: BTreeSet<String> = tokens(b).into_iter().collect();
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let join = |words: Vec<&String>| {
        words
            .into_iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    };
    let intersection = join(left.intersection(&right).collect());
    let left_only = join(left.difference(&right).collect());
    let right_only = join(right.difference(&left).collect());

    let combined_left = format!("{intersection} {left_only}").trim().to_string();
    let combined_right = format!("{intersection} {right_only}").trim().to_string();

    ratio(&intersection, &combined_left)
        .max(ratio(&intersection, &combined_right))
        .max(ratio(&combined_left, &combined_right))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio() {
        assert_eq!(ratio("dune", "dune"), 100.0);
        assert_eq!(ratio("dragon heart", "dragon heart zen"), 75.0);
        assert_eq!(ratio("", "dune"), 0.0);
        assert!(ratio("dune", "emma") < 50.0);
    }

    #[test]
    fn test_partial_ratio() {
        assert_eq!(partial_ratio("dune", "dune messiah"), 100.0);
        assert_eq!(partial_ratio("dune messiah", "dune"), 100.0);
        assert_eq!(partial_ratio("dine", "dune messiah"), 75.0);
        assert_eq!(partial_ratio("", "dune"), 0.0);
    }

    #[test]
    fn test_token_sort_ratio_ignores_order() {
        assert_eq!(token_sort_ratio("herbert frank", "Frank Herbert"), 100.0);
        assert_eq!(token_sort_ratio("dragon heart", "dragon heart zen"), 75.0);
    }

    #[test]
    fn test_token_set_ratio() {
        assert_eq!(token_set_ratio("Frank Herbert", "Herbert, Frank"), 100.0);
        assert_eq!(token_set_ratio("dragon heart", "dragon heart zen"), 100.0);
        assert_eq!(token_set_ratio("", "dune"), 0.0);
        assert!(token_set_ratio("Ann Leckie", "Frank Herbert") < 50.0);
    }

    #[test]
    fn test_subset_titles_rank_above_unrelated() {
        let related = token_set_ratio("name of the wind", "the name of the wind");
        let unrelated = token_set_ratio("name of the wind", "a game of thrones");
        assert!(related > unrelated);
    }
}
