use crate::models::MatchResult;

use super::score_pct;

pub(super) fn render(matches: &[MatchResult]) -> String {
    if matches.is_empty() {
        return "No matches found.\n".to_string();
    }

    matches
        .iter()
        .map(|m| {
            format!(
                "BookOutlet: {}, Goodreads: {}, Match Score: {}\n",
                m.matched_title,
                m.query_title,
                score_pct(m)
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures;

    #[test]
    fn test_one_line_per_match() {
        let rendered = render(&fixtures::matches());
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "BookOutlet: The Song of Achilles, Goodreads: The Song of Achilles, Match Score: 98%"
        );
        assert!(rendered.ends_with('\n'));
    }

    #[test]
    fn test_empty_report() {
        assert_eq!(render(&[]), "No matches found.\n");
    }
}
