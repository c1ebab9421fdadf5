//! GitHub-flavored Markdown report.

use std::fmt::Write;

use super::{score_pct, ReportMetadata};
use crate::models::MatchResult;

pub(super) fn render(matches: &[MatchResult], metadata: &ReportMetadata) -> String {
    let mut out = String::from("# BookOutlet Matches\n\n");
    let _ = writeln!(
        out,
        "Found **{}** matches out of **{}** books (threshold: {}%).\n",
        matches.len(),
        metadata.total_searched,
        metadata.threshold
    );

    if matches.is_empty() {
        out.push_str("_No matches found._\n");
        return out;
    }

    out.push_str("| Goodreads Title | BookOutlet Match | Score | Price | Link |\n");
    out.push_str("|---|---|---|---|---|\n");
    for m in matches {
        let link = m
            .url
            .as_deref()
            .map(|url| format!("[View]({url})"))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            escape(&m.query_title),
            escape(&m.matched_title),
            score_pct(m),
            escape(m.price.as_deref().unwrap_or_default()),
            link
        );
    }
    out
}

/// Keep pipes from splitting table cells
fn escape(text: &str) -> String {
    text.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures;

    #[test]
    fn test_markdown_table() {
        let rendered = render(&fixtures::matches(), &fixtures::metadata());

        assert!(rendered.starts_with("# BookOutlet Matches\n\n"));
        assert!(rendered
            .contains("Found **2** matches out of **230** books (threshold: 90%)."));
        assert!(rendered.contains("| Goodreads Title | BookOutlet Match | Score | Price | Link |"));
        assert!(rendered.contains(
            "| The Song of Achilles | The Song of Achilles | 98% | $9.99 | [View](https://bookoutlet.ca/products/song-of-achilles) |"
        ));
        assert!(rendered.contains("| Either/Or \\| Part One | Either/Or, Part One | 91% |  |  |"));
    }

    #[test]
    fn test_empty_markdown_report() {
        let rendered = render(&[], &fixtures::metadata());
        assert!(rendered.contains("Found **0** matches out of **230** books"));
        assert!(rendered.ends_with("_No matches found._\n"));
        assert!(!rendered.contains("|---|"));
    }
}
