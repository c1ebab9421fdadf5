//! Terminal output for the command-line tool.
//!
//! Progress, the results table and the run summary all go to the terminal;
//! reports on disk are produced by [`crate::output`].

use comfy_table::{Attribute, Cell, Color, Table};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::path::Path;

use crate::models::MatchResult;
use crate::search::BatchReport;

/// Progress bar fed by the orchestrator's progress callback
///
/// A disabled bar is hidden and every call is a no-op.
pub struct BatchProgress {
    pb: ProgressBar,
}

impl BatchProgress {
    pub fn new(total: usize, enabled: bool) -> Self {
        if !enabled {
            return Self {
                pb: ProgressBar::hidden(),
            };
        }

        let pb = ProgressBar::new(total as u64);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {bar:40.cyan/blue} {pos}/{len} ({percent}%) {wide_msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .progress_chars("█▓▒░ ");
        pb.set_style(style);
        pb.set_message("Searching BookOutlet");

        Self { pb }
    }

    /// Record one finished title
    pub fn advance(&self, completed: usize, title: &str) {
        self.pb.set_position(completed as u64);
        self.pb.set_message(truncate_with_ellipsis(title, 40));
    }

    pub fn finish(&self, report: &BatchReport) {
        let msg = if report.interrupted {
            format!("Interrupted after {} of {} titles", report.finished(), report.total)
        } else if report.unfinished() > 0 {
            format!("Searched {} of {} titles", report.finished(), report.total)
        } else {
            format!("Searched {} titles", report.total)
        };
        self.pb.finish_with_message(msg);
    }
}

/// Styles text only when color output is enabled
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    color: bool,
}

impl Palette {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn heading(&self, text: &str) -> String {
        if self.color {
            text.bold().cyan().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn success(&self, text: &str) -> String {
        if self.color {
            text.green().bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn warning(&self, text: &str) -> String {
        if self.color {
            text.yellow().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn error(&self, text: &str) -> String {
        if self.color {
            text.red().bold().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Print the search header before work starts
pub fn print_search_header(palette: Palette, csv_path: &Path, total: usize, threshold: u8) {
    println!();
    println!("{}", palette.heading("━━━ BookOutlet-Goodreads Matcher ━━━"));
    println!("Loading books from: {}", csv_path.display());
    println!("Books to search:    {}", format_number(total));
    println!("Match threshold:    {}%", threshold);
    println!();
}

/// Color for a match score
fn score_color(score: u8) -> Color {
    match score {
        95.. => Color::Green,
        90..=94 => Color::DarkGreen,
        85..=89 => Color::Yellow,
        _ => Color::Red,
    }
}

/// Table of matches with color-coded scores
pub fn results_table(matches: &[MatchResult], color: bool) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Goodreads Title", "BookOutlet Match", "Score", "Price"]);

    for m in matches {
        let mut score = Cell::new(format!("{}%", m.score));
        if color {
            score = score.fg(score_color(m.score));
        }
        table.add_row(vec![
            Cell::new(truncate_with_ellipsis(&m.query_title, 40)).add_attribute(Attribute::Bold),
            Cell::new(truncate_with_ellipsis(&m.matched_title, 40)),
            score,
            Cell::new(m.price.as_deref().unwrap_or("")),
        ]);
    }
    table
}

pub fn print_results(palette: Palette, matches: &[MatchResult], color: bool) {
    if matches.is_empty() {
        println!("{}", palette.warning("No matches found."));
        return;
    }
    println!("{}", palette.heading("Book Matches Found"));
    println!("{}", results_table(matches, color));
}

/// Print the closing summary
pub fn print_summary(palette: Palette, report: &BatchReport, threshold: u8, written: Option<&Path>) {
    let found = report.results.len();
    let percentage = if report.total > 0 {
        found as f64 / report.total as f64 * 100.0
    } else {
        0.0
    };

    println!();
    if report.interrupted {
        println!("{}", palette.warning("⚠ Search interrupted"));
    } else if report.unfinished() > 0 {
        println!(
            "{}",
            palette.error(&format!("✗ {} titles were never searched", report.unfinished()))
        );
    } else {
        println!("{}", palette.success("✓ Search complete"));
    }
    println!(
        "Matches found: {} out of {} books ({:.1}%)",
        found, report.total, percentage
    );
    println!("Threshold:     {}%", threshold);
    if report.failed > 0 {
        println!(
            "{}",
            palette.error(&format!("✗ {} searches failed", report.failed))
        );
    }
    if let Some(path) = written {
        println!("Results saved to: {}", path.display());
    }
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Truncate text to a display width, accounting for wide characters
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width <= 3 {
        return "...".to_string();
    }

    let mut width = 0;
    let mut truncated = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(1);
        if width + w > max_width - 3 {
            break;
        }
        width += w;
        truncated.push(c);
    }
    format!("{truncated}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchType;

    fn result(query: &str, score: u8) -> MatchResult {
        MatchResult {
            query_title: query.to_string(),
            matched_title: query.to_string(),
            author: None,
            score,
            match_type: MatchType::Fuzzy,
            price: Some("$4.99".to_string()),
            url: None,
            cover_url: None,
            isbn: None,
            bonuses_applied: Default::default(),
        }
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("Hello", 10), "Hello");
        assert_eq!(truncate_with_ellipsis("Hello World", 8), "Hello...");
        assert_eq!(truncate_with_ellipsis("", 10), "");
        assert_eq!(truncate_with_ellipsis("Hello", 3), "...");
        assert_eq!(truncate_with_ellipsis("ノルウェイの森", 9), "ノルウ...");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(123), "123");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_score_color_bands() {
        assert_eq!(score_color(100), Color::Green);
        assert_eq!(score_color(92), Color::DarkGreen);
        assert_eq!(score_color(85), Color::Yellow);
        assert_eq!(score_color(40), Color::Red);
    }

    #[test]
    fn test_results_table_rows() {
        let table = results_table(&[result("Dune", 100), result("Emma", 91)], false);
        let rendered = table.to_string();
        assert!(rendered.contains("Goodreads Title"));
        assert!(rendered.contains("Dune"));
        assert!(rendered.contains("91%"));
        assert!(rendered.contains("$4.99"));
    }

    #[test]
    fn test_palette_without_color_is_plain() {
        let palette = Palette::new(false);
        assert_eq!(palette.success("done"), "done");
        assert_eq!(palette.error("failed"), "failed");
    }

    #[test]
    fn test_hidden_progress_accepts_updates() {
        let progress = BatchProgress::new(3, false);
        progress.advance(1, "Dune");
        progress.finish(&BatchReport::default());
    }
}
