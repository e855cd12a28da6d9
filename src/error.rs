use thiserror::Error;

use crate::github::UpstreamError;

#[derive(Error, Debug)]
pub enum SurveyError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("CSV is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("Issue body error: {0}")]
    IssueBody(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Excel error: {0}")]
    Excel(#[from] rust_xlsxwriter::XlsxError),
}

pub type Result<T> = std::result::Result<T, SurveyError>;
