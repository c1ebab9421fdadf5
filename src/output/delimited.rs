//! CSV report.

use super::{score_pct, OutputError};
use crate::models::MatchResult;

const HEADERS: [&str; 5] = ["Goodreads Title", "BookOutlet Match", "Score", "Price", "URL"];

pub(super) fn render(matches: &[MatchResult]) -> Result<String, OutputError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let csv_error = |e: csv::Error| OutputError::Csv(e.to_string());

    writer.write_record(HEADERS).map_err(csv_error)?;
    for m in matches {
        writer
            .write_record([
                m.query_title.as_str(),
                m.matched_title.as_str(),
                score_pct(m).as_str(),
                m.price.as_deref().unwrap_or_default(),
                m.url.as_deref().unwrap_or_default(),
            ])
            .map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| OutputError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| OutputError::Csv(e.to_string()))
}
