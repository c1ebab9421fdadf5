//! Standalone HTML report.
//!
//! Matches are split into certain and potential sections. Certain means the
//! ISBN matched, the title matched perfectly, or a near-perfect title was
//! backed by the author. Each section is a sortable table with cover
//! thumbnails, and a search box filters rows across both.

use std::fmt::Write;

use super::{score_pct, ReportMetadata};
use crate::models::{MatchResult, MatchType};

/// Lowest score that counts as certain when the author also matched
const AUTHOR_CERTAIN_SCORE: u8 = 95;

const STYLE: &str = r#"body{font-family:system-ui,sans-serif;margin:2rem;color:#222}
table{border-collapse:collapse;width:100%;margin-bottom:2rem}
th,td{border:1px solid #ddd;padding:.4rem .6rem;text-align:left;vertical-align:middle}
th{background:#f4f4f4;cursor:pointer}
img.cover{height:64px}
.meta{color:#555}
.score-high{color:#1a7f37;font-weight:bold}
.score-mid{color:#9a6700}
#filter{padding:.4rem;width:20rem;margin-bottom:1rem}"#;

const SCRIPT: &str = r#"document.getElementById('filter').addEventListener('input',function(e){
var q=e.target.value.toLowerCase();
document.querySelectorAll('tbody tr').forEach(function(r){
r.style.display=r.textContent.toLowerCase().indexOf(q)>=0?'':'none';});});
document.querySelectorAll('th').forEach(function(th){th.addEventListener('click',function(){
var table=th.closest('table'),idx=Array.from(th.parentNode.children).indexOf(th);
var rows=Array.from(table.tBodies[0].rows),asc=th.dataset.asc!=='1';th.dataset.asc=asc?'1':'0';
rows.sort(function(a,b){var x=a.cells[idx].dataset.sort||a.cells[idx].textContent,
y=b.cells[idx].dataset.sort||b.cells[idx].textContent;
var nx=parseFloat(x),ny=parseFloat(y);
var c=(!isNaN(nx)&&!isNaN(ny))?nx-ny:x.localeCompare(y);return asc?c:-c;});
rows.forEach(function(r){table.tBodies[0].appendChild(r);});});});"#;

/// Whether a match needs no manual review
fn is_certain(result: &MatchResult) -> bool {
    let author_backed = matches!(
        result.match_type,
        MatchType::FuzzyAuthorExact | MatchType::FuzzyIsbnAuthor
    );
    result.match_type == MatchType::IsbnExact
        || result.score == 100
        || (author_backed && result.score >= AUTHOR_CERTAIN_SCORE)
}

pub(super) fn render(matches: &[MatchResult], metadata: &ReportMetadata) -> String {
    let (certain, potential): (Vec<&MatchResult>, Vec<&MatchResult>) =
        matches.iter().partition(|m| is_certain(m));

    let mut out = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str("<title>BookOutlet Matches</title>\n");
    let _ = writeln!(out, "<style>\n{STYLE}\n</style>\n</head>\n<body>");
    out.push_str("<h1>BookOutlet Matches</h1>\n");
    let _ = writeln!(
        out,
        "<p class=\"meta\">Found <strong>{}</strong> matches out of <strong>{}</strong> books \
         (threshold: {}%): <strong>{}</strong> certain, <strong>{}</strong> potential.</p>",
        matches.len(),
        metadata.total_searched,
        metadata.threshold,
        certain.len(),
        potential.len()
    );
    let _ = writeln!(
        out,
        "<p class=\"meta\">Generated {} by {}</p>",
        metadata.generated_at.format("%Y-%m-%d %H:%M UTC"),
        escape(&metadata.tool)
    );

    if matches.is_empty() {
        out.push_str("<p><em>No matches found.</em></p>\n</body>\n</html>\n");
        return out;
    }

    out.push_str("<input id=\"filter\" type=\"search\" placeholder=\"Filter titles\">\n");
    section(&mut out, "certain", "Certain Matches", &certain);
    section(&mut out, "potential", "Potential Matches", &potential);
    let _ = writeln!(out, "<script>\n{SCRIPT}\n</script>\n</body>\n</html>");
    out
}

fn section(out: &mut String, id: &str, heading: &str, matches: &[&MatchResult]) {
    let _ = writeln!(out, "<h2 id=\"{id}\">{heading} ({})</h2>", matches.len());
    if matches.is_empty() {
        out.push_str("<p><em>None.</em></p>\n");
        return;
    }

    out.push_str("<table>\n<thead><tr><th>Cover</th><th>Goodreads Title</th><th>BookOutlet Match</th>");
    out.push_str("<th>Score</th><th>Match Type</th><th>Price</th></tr></thead>\n<tbody>\n");
    for m in matches {
        let cover = m
            .cover_url
            .as_deref()
            .map(|src| format!("<img class=\"cover\" src=\"{}\" alt=\"{}\">", escape(src), escape(&m.matched_title)))
            .unwrap_or_default();
        let matched = match m.url.as_deref() {
            Some(url) => format!("<a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a>", escape(url), escape(&m.matched_title)),
            None => escape(&m.matched_title),
        };
        let score_class = if m.score >= AUTHOR_CERTAIN_SCORE {
            "score-high"
        } else {
            "score-mid"
        };
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\" data-sort=\"{}\">{}</td><td>{}</td><td>{}</td></tr>",
            cover,
            escape(&m.query_title),
            matched,
            score_class,
            m.score,
            score_pct(m),
            m.match_type,
            escape(m.price.as_deref().unwrap_or_default())
        );
    }
    out.push_str("</tbody>\n</table>\n");
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
