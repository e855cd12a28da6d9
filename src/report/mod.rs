//! Survey report: CSV export → latest response per player → counts → output

pub mod csv_loader;
pub mod dedup;
pub mod filter;
pub mod render;
pub mod tabulate;
pub mod xlsx;

pub use csv_loader::{load_source, read_records, write_records, CsvRow};
pub use dedup::{latest_per_player, Respondent};
pub use filter::ReportFilter;
pub use render::{render_respondents, render_summary, RenderOptions};
pub use tabulate::{summarize, Summary};
pub use xlsx::write_report_xlsx;

use crate::error::Result;

/// Parsed, deduplicated and filtered view of one CSV export
#[derive(Debug, Clone)]
pub struct Report {
    pub rows: usize,
    pub respondents: Vec<Respondent>,
    pub summary: Summary,
}

/// Build a report from CSV text. A malformed export fails as a whole.
pub fn build_report(content: &str, filter: &ReportFilter) -> Result<Report> {
    let rows = read_records(content)?;
    let respondents = filter.apply(latest_per_player(&rows));
    let summary = summarize(&respondents);

    log::info!(
        "{} rows, {} respondents after dedup and filters",
        rows.len(),
        respondents.len()
    );

    Ok(Report {
        rows: rows.len(),
        respondents,
        summary,
    })
}
