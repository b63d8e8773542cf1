//! Scraping error taxonomy.
//!
//! Adapter operations never hand these to their callers: every public
//! operation logs the error and returns its documented fallback value.
//! The enum exists so the internal `?` chains stay typed.

use thiserror::Error;

/// Errors raised while fetching or extracting source data
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid mirror token: {0}")]
    InvalidToken(String),
}

impl From<url::ParseError> for ScrapeError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
