use crate::parser::{ParseError, SelectorError};
use crate::scrapers::FetchError;
use crate::storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Selector error: {0}")]
    Selector(#[from] SelectorError),

    #[error(
        "Extraction error: field counts differ (items: {items}, prices: {prices}, descriptions: {descriptions})"
    )]
    ExtractionArity {
        items: usize,
        prices: usize,
        descriptions: usize,
    },

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type ScraperResult<T> = Result<T, ScraperError>;
