pub mod sqlite;

pub use sqlite::SqliteStore;

use std::collections::BTreeMap;

use crate::app::Result;
use crate::domain::FeedRecord;

/// Persisted per-(destination, feed-name) cursor state. The engine
/// treats this as the single source of truth for what has been sent.
pub trait CursorStore {
    fn get(&self, destination: &str, name: &str) -> Result<Option<FeedRecord>>;

    /// Insert or replace one feed's record in a single logical update.
    fn set(&self, destination: &str, name: &str, record: &FeedRecord) -> Result<()>;

    /// Returns whether a record existed.
    fn delete(&self, destination: &str, name: &str) -> Result<bool>;

    /// One destination's feeds, ordered by name.
    fn list_destination(&self, destination: &str) -> Result<Vec<(String, FeedRecord)>>;

    /// Every destination's feeds, destinations and names both ordered.
    fn list_all(&self) -> Result<BTreeMap<String, Vec<(String, FeedRecord)>>>;
}
