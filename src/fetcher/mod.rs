pub mod http_fetcher;

pub use http_fetcher::{HttpThreadFetcher, SourceEndpoints};

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::ThreadSnapshot;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Source unreachable: {0}")]
    Unreachable(String),

    #[error("Board /{0}/ does not exist")]
    BoardNotFound(String),

    #[error("Thread /{0}/{1} does not exist")]
    ThreadNotFound(String, String),

    #[error("Request timed out")]
    Timeout,

    #[error("Unexpected source response: {0}")]
    Unexpected(String),
}

#[async_trait]
pub trait ThreadFetcher {
    async fn fetch_thread(
        &self,
        board: &str,
        thread_id: &str,
    ) -> Result<ThreadSnapshot, FetchError>;
}
