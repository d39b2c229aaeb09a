use thiserror::Error;

use crate::fetcher::FetchError;
use crate::sink::DeliveryError;

#[derive(Error, Debug)]
pub enum ThreadcastError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Malformed thread URL: {0}")]
    MalformedUrl(String),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ThreadcastError>;
