use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{Result, ThreadcastError};
use crate::config::Config;
use crate::engine::Dispatcher;
use crate::fetcher::{HttpThreadFetcher, ThreadFetcher};
use crate::sink::{Sink, WebhookSink};
use crate::store::{CursorStore, SqliteStore};

/// Wires the engine's collaborators together. Everything downstream
/// receives these handles explicitly; there are no globals.
pub struct AppContext {
    pub config: Config,
    pub store: Arc<dyn CursorStore + Send + Sync>,
    pub fetcher: Arc<dyn ThreadFetcher + Send + Sync>,
    pub sink: Arc<dyn Sink + Send + Sync>,
    pub dispatcher: Dispatcher,
}

impl AppContext {
    pub fn new(config: Config, db_path: Option<PathBuf>) -> Result<Self> {
        let db_path = match db_path {
            Some(p) => p,
            None => Self::default_db_path()?,
        };

        let store: Arc<dyn CursorStore + Send + Sync> = Arc::new(SqliteStore::new(&db_path)?);
        let fetcher: Arc<dyn ThreadFetcher + Send + Sync> = Arc::new(HttpThreadFetcher::new(
            config.source.endpoints(),
            config.source.timeout_secs,
        ));
        let destinations = config
            .webhook_destinations()
            .map_err(|e| ThreadcastError::Config(e.to_string()))?;
        let sink: Arc<dyn Sink + Send + Sync> = Arc::new(WebhookSink::new(destinations));

        Ok(Self::with_parts(config, store, fetcher, sink))
    }

    /// Assemble a context from explicit parts. Tests use this to swap in
    /// mock collaborators.
    pub fn with_parts(
        config: Config,
        store: Arc<dyn CursorStore + Send + Sync>,
        fetcher: Arc<dyn ThreadFetcher + Send + Sync>,
        sink: Arc<dyn Sink + Send + Sync>,
    ) -> Self {
        let dispatcher = Dispatcher::new(store.clone(), fetcher.clone(), sink.clone());
        Self {
            config,
            store,
            fetcher,
            sink,
            dispatcher,
        }
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| ThreadcastError::Config("Could not find data directory".into()))?;
        let threadcast_dir = data_dir.join("threadcast");
        std::fs::create_dir_all(&threadcast_dir)?;
        Ok(threadcast_dir.join("threadcast.db"))
    }
}
