//! Report rendering.
//!
//! A report is the list of matches plus [`ReportMetadata`]. [`render`] turns it
//! into text in one of the [`OutputFormat`]s and [`write_report`] stores it on
//! disk with the format's extension.

mod delimited;
mod html;
mod json;
mod markdown;
mod text;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::MatchResult;

pub const TOOL_NAME: &str = "BookOutlet-Goodreads Matcher";

/// Report formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One line per match
    #[default]
    Text,
    /// Metadata and matches as pretty-printed JSON
    Json,
    /// Spreadsheet-friendly rows
    Csv,
    /// GitHub-flavored Markdown table
    Markdown,
    /// Standalone page splitting certain from potential matches
    Html,
}

impl OutputFormat {
    /// File extension, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Markdown => "md",
            OutputFormat::Html => "html",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Html => "html",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "html" | "htm" => Ok(OutputFormat::Html),
            other => Err(OutputError::UnknownFormat(other.to_string())),
        }
    }
}

/// Errors raised while rendering or writing a report
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("Unknown format '{0}'. Available: text, json, csv, markdown, html")]
    UnknownFormat(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Facts about the run that produced a report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub tool: String,
    /// Number of books searched
    pub total_searched: usize,
    pub threshold: u8,
}

impl ReportMetadata {
    pub fn new(total_searched: usize, threshold: u8) -> Self {
        Self {
            generated_at: Utc::now(),
            tool: TOOL_NAME.to_string(),
            total_searched,
            threshold,
        }
    }
}

/// Render matches in the given format
pub fn render(
    format: OutputFormat,
    matches: &[MatchResult],
    metadata: &ReportMetadata,
) -> Result<String, OutputError> {
    match format {
        OutputFormat::Text => Ok(text::render(matches)),
        OutputFormat::Json => json::render(matches, metadata),
        OutputFormat::Csv => delimited::render(matches),
        OutputFormat::Markdown => Ok(markdown::render(matches, metadata)),
        OutputFormat::Html => Ok(html::render(matches, metadata)),
    }
}

/// Path the report is written to: `path` with the format's extension
///
/// The extension is appended unless `path` already ends with it.
pub fn report_path(path: &Path, format: OutputFormat) -> PathBuf {
    let extension = format.extension();
    if path.extension().is_some_and(|ext| ext == extension) {
        return path.to_path_buf();
    }

    let mut file_name = path.as_os_str().to_owned();
    file_name.push(".");
    file_name.push(extension);
    PathBuf::from(file_name)
}

/// Render and write a report, returning the path written
pub fn write_report(
    path: &Path,
    format: OutputFormat,
    matches: &[MatchResult],
    metadata: &ReportMetadata,
) -> Result<PathBuf, OutputError> {
    let content = render(format, matches, metadata)?;
    let target = report_path(path, format);

    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&target, content)?;

    tracing::debug!("Wrote {} report to {}", format, target.display());
    Ok(target)
}

/// Score as shown in reports
pub(crate) fn score_pct(result: &MatchResult) -> String {
    format!("{}%", result.score)
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_format_parsing() {
        assert_eq!("markdown".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("MD".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("txt".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("HTML".parse::<OutputFormat>().unwrap(), OutputFormat::Html);
        assert!(matches!(
            "pdf".parse::<OutputFormat>(),
            Err(OutputError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_report_path_appends_extension() {
        assert_eq!(
            report_path(Path::new("output"), OutputFormat::Json),
            PathBuf::from("output.json")
        );
        assert_eq!(
            report_path(Path::new("reports/matches.md"), OutputFormat::Markdown),
            PathBuf::from("reports/matches.md")
        );
        assert_eq!(
            report_path(Path::new("matches.v2"), OutputFormat::Csv),
            PathBuf::from("matches.v2.csv")
        );
    }

    #[test]
    fn test_write_report() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("nested").join("output");

        let written = write_report(
            &base,
            OutputFormat::Text,
            &fixtures::matches(),
            &fixtures::metadata(),
        )
        .unwrap();

        assert_eq!(written, dir.path().join("nested").join("output.txt"));
        let content = std::fs::read_to_string(&written).unwrap();
        assert!(content.starts_with("BookOutlet: The Song of Achilles"));
    }
}
