//! Survey Report - summarize a CSV export of survey responses
//!
//! Keeps each player's latest response, counts answers per question and
//! languages, and prints bar charts or writes an Excel workbook.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use event_survey::report::{
    build_report, load_source, render_respondents, render_summary, write_report_xlsx, RenderOptions,
    Report, ReportFilter,
};

#[derive(Parser)]
#[command(name = "survey-report")]
#[command(about = "Summarize event survey responses from a CSV export", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print answer and language counts as bar charts
    Summary {
        #[command(flatten)]
        input: InputArgs,

        /// Width of the longest bar
        #[arg(long, default_value_t = 30)]
        bar_width: usize,

        /// Hide percentages
        #[arg(long)]
        no_percent: bool,
    },

    /// List the response kept for each player
    Respondents {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Write the summary and respondents to an Excel workbook
    Xlsx {
        #[command(flatten)]
        input: InputArgs,

        /// Output Excel file
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Args)]
struct InputArgs {
    /// CSV file or http(s) URL of the export
    source: String,

    /// Only respondents who answered in this language
    #[arg(long)]
    lang: Option<String>,

    /// Only responses submitted at or after this time (RFC 3339 or YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    since: Option<DateTime<Utc>>,

    /// Only responses submitted at or before this time (RFC 3339 or YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    until: Option<DateTime<Utc>>,

    /// Only players whose name contains this text
    #[arg(long)]
    name: Option<String>,
}

impl InputArgs {
    fn filter(&self) -> ReportFilter {
        ReportFilter {
            language: self.lang.clone(),
            since: self.since,
            until: self.until,
            name_contains: self.name.clone(),
        }
    }

    fn load(&self) -> Result<Report> {
        let content = load_source(&self.source).with_context(|| format!("Failed to read {}", self.source))?;
        build_report(&content, &self.filter()).context("Failed to parse survey CSV")
    }
}

fn parse_date(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("expected RFC 3339 or YYYY-MM-DD, got {:?}", s))
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Summary {
            input,
            bar_width,
            no_percent,
        } => {
            let report = input.load()?;
            let options = RenderOptions {
                bar_width,
                show_percent: !no_percent,
                ..Default::default()
            };
            println!("Rows read: {}", report.rows);
            print!("{}", render_summary(&report.summary, &options));
        }
        Commands::Respondents { input } => {
            let report = input.load()?;
            print!("{}", render_respondents(&report.respondents));
        }
        Commands::Xlsx { input, output } => {
            let report = input.load()?;
            println!("Writing Excel file: {}", output.display());
            write_report_xlsx(&report.summary, &report.respondents, &output)
                .context("Failed to write Excel file")?;
            println!("Done!");
        }
    }

    Ok(())
}
