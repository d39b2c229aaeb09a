use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rusqlite_migration::{Migrations, M};

use crate::app::{Result, ThreadcastError};
use crate::domain::{EmbedMode, FeedRecord};
use crate::store::CursorStore;

const RECORD_COLUMNS: &str = "name, url, embed_override, last_post_id, reply_count, \
     last_delivered_at, image_count, is_archived, is_sticky, is_at_bump_limit";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.conn.lock().map_err(|e| {
            ThreadcastError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })?;

        migrations
            .to_latest(&mut conn)
            .map_err(|_| ThreadcastError::Database(rusqlite::Error::InvalidQuery))?;

        Ok(())
    }
}

/// Decode `(name, record)` from row columns starting at `base`.
///
/// Every cursor field is read leniently: a missing or unreadable value
/// decodes to its never-delivered default rather than failing the read,
/// so a damaged row degrades to a first-ever sync instead of wedging
/// the feed.
fn record_at(row: &Row<'_>, base: usize) -> rusqlite::Result<(String, FeedRecord)> {
    let name: String = row.get(base)?;

    let embed_override = match row.get::<_, Option<i64>>(base + 2).ok().flatten() {
        Some(0) => EmbedMode::ForceOff,
        Some(_) => EmbedMode::ForceOn,
        None => EmbedMode::Inherit,
    };

    let int_field = |idx: usize| -> u64 {
        row.get::<_, Option<i64>>(base + idx)
            .ok()
            .flatten()
            .unwrap_or(0)
            .max(0) as u64
    };
    let flag_field = |idx: usize| -> bool {
        row.get::<_, Option<i64>>(base + idx)
            .ok()
            .flatten()
            .map(|v| v != 0)
            .unwrap_or(false)
    };

    let last_delivered_at = row
        .get::<_, Option<String>>(base + 5)
        .ok()
        .flatten()
        .and_then(|s| serde_json::from_str::<[i64; 6]>(&s).ok());

    let record = FeedRecord {
        url: row
            .get::<_, Option<String>>(base + 1)
            .ok()
            .flatten()
            .unwrap_or_default(),
        embed_override,
        last_post_id: int_field(3),
        reply_count: int_field(4),
        last_delivered_at,
        image_count: int_field(6),
        is_archived: flag_field(7),
        is_sticky: flag_field(8),
        is_at_bump_limit: flag_field(9),
    };

    Ok((name, record))
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<(String, FeedRecord)> {
    record_at(row, 0)
}

fn embed_to_sql(mode: EmbedMode) -> Option<i64> {
    match mode {
        EmbedMode::Inherit => None,
        EmbedMode::ForceOn => Some(1),
        EmbedMode::ForceOff => Some(0),
    }
}

impl CursorStore for SqliteStore {
    fn get(&self, destination: &str, name: &str) -> Result<Option<FeedRecord>> {
        let conn = self.conn.lock().map_err(|e| {
            ThreadcastError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })?;

        let result = conn
            .query_row(
                &format!(
                    "SELECT {} FROM feeds WHERE destination = ?1 AND name = ?2",
                    RECORD_COLUMNS
                ),
                params![destination, name],
                record_from_row,
            )
            .optional()?;

        Ok(result.map(|(_, record)| record))
    }

    fn set(&self, destination: &str, name: &str, record: &FeedRecord) -> Result<()> {
        let conn = self.conn.lock().map_err(|e| {
            ThreadcastError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })?;

        let last_delivered_at = record
            .last_delivered_at
            .map(|fields| serde_json::to_string(&fields).unwrap_or_default());

        conn.execute(
            "INSERT INTO feeds (destination, name, url, embed_override, last_post_id, \
                 reply_count, last_delivered_at, image_count, is_archived, is_sticky, \
                 is_at_bump_limit, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(destination, name) DO UPDATE SET
                 url = excluded.url,
                 embed_override = excluded.embed_override,
                 last_post_id = excluded.last_post_id,
                 reply_count = excluded.reply_count,
                 last_delivered_at = excluded.last_delivered_at,
                 image_count = excluded.image_count,
                 is_archived = excluded.is_archived,
                 is_sticky = excluded.is_sticky,
                 is_at_bump_limit = excluded.is_at_bump_limit",
            params![
                destination,
                name,
                record.url,
                embed_to_sql(record.embed_override),
                record.last_post_id as i64,
                record.reply_count as i64,
                last_delivered_at,
                record.image_count as i64,
                record.is_archived,
                record.is_sticky,
                record.is_at_bump_limit,
                Utc::now().to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    fn delete(&self, destination: &str, name: &str) -> Result<bool> {
        let conn = self.conn.lock().map_err(|e| {
            ThreadcastError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })?;

        let deleted = conn.execute(
            "DELETE FROM feeds WHERE destination = ?1 AND name = ?2",
            params![destination, name],
        )?;

        Ok(deleted > 0)
    }

    fn list_destination(&self, destination: &str) -> Result<Vec<(String, FeedRecord)>> {
        let conn = self.conn.lock().map_err(|e| {
            ThreadcastError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM feeds WHERE destination = ?1 ORDER BY name",
            RECORD_COLUMNS
        ))?;

        let feeds = stmt
            .query_map(params![destination], record_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(feeds)
    }

    fn list_all(&self) -> Result<BTreeMap<String, Vec<(String, FeedRecord)>>> {
        let conn = self.conn.lock().map_err(|e| {
            ThreadcastError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })?;

        let mut stmt = conn.prepare(&format!(
            "SELECT destination, {} FROM feeds ORDER BY destination, name",
            RECORD_COLUMNS
        ))?;

        let rows = stmt
            .query_map([], |row| {
                let destination: String = row.get(0)?;
                // Record columns sit one to the right of destination.
                let (name, record) = record_at(row, 1)?;
                Ok((destination, name, record))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut all: BTreeMap<String, Vec<(String, FeedRecord)>> = BTreeMap::new();
        for (destination, name, record) in rows {
            all.entry(destination).or_default().push((name, record));
        }

        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> FeedRecord {
        FeedRecord {
            url: "https://boards.example.org/g/thread/100".into(),
            embed_override: EmbedMode::Inherit,
            last_post_id: 104,
            reply_count: 2,
            last_delivered_at: Some([2023, 11, 14, 22, 13, 20]),
            image_count: 3,
            is_archived: false,
            is_sticky: true,
            is_at_bump_limit: false,
        }
    }

    #[test]
    fn test_set_get_roundtrip() {
        let store = SqliteStore::in_memory().unwrap();
        let record = sample_record();
        store.set("chan-a", "mything", &record).unwrap();

        let loaded = store.get("chan-a", "mything").unwrap().unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn test_get_missing_is_none() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.get("chan-a", "nope").unwrap().is_none());
    }

    #[test]
    fn test_set_replaces_existing() {
        let store = SqliteStore::in_memory().unwrap();
        let mut record = sample_record();
        store.set("chan-a", "mything", &record).unwrap();

        record.last_post_id = 110;
        record.embed_override = EmbedMode::ForceOff;
        store.set("chan-a", "mything", &record).unwrap();

        let loaded = store.get("chan-a", "mything").unwrap().unwrap();
        assert_eq!(loaded.last_post_id, 110);
        assert_eq!(loaded.embed_override, EmbedMode::ForceOff);
    }

    #[test]
    fn test_embed_tristate_roundtrip() {
        let store = SqliteStore::in_memory().unwrap();
        for mode in [EmbedMode::Inherit, EmbedMode::ForceOn, EmbedMode::ForceOff] {
            let mut record = sample_record();
            record.embed_override = mode;
            store.set("chan-a", "feed", &record).unwrap();
            let loaded = store.get("chan-a", "feed").unwrap().unwrap();
            assert_eq!(loaded.embed_override, mode);
        }
    }

    #[test]
    fn test_delete_reports_existence() {
        let store = SqliteStore::in_memory().unwrap();
        store.set("chan-a", "mything", &sample_record()).unwrap();

        assert!(store.delete("chan-a", "mything").unwrap());
        assert!(!store.delete("chan-a", "mything").unwrap());
        assert!(store.get("chan-a", "mything").unwrap().is_none());
    }

    #[test]
    fn test_list_destination_ordered_by_name() {
        let store = SqliteStore::in_memory().unwrap();
        store.set("chan-a", "zeta", &sample_record()).unwrap();
        store.set("chan-a", "alpha", &sample_record()).unwrap();
        store.set("chan-b", "other", &sample_record()).unwrap();

        let feeds = store.list_destination("chan-a").unwrap();
        let names: Vec<&str> = feeds.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_list_all_groups_by_destination() {
        let store = SqliteStore::in_memory().unwrap();
        store.set("chan-b", "b1", &sample_record()).unwrap();
        store.set("chan-a", "a2", &sample_record()).unwrap();
        store.set("chan-a", "a1", &sample_record()).unwrap();

        let all = store.list_all().unwrap();
        let destinations: Vec<&str> = all.keys().map(String::as_str).collect();
        assert_eq!(destinations, vec!["chan-a", "chan-b"]);

        let names: Vec<&str> = all["chan-a"].iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["a1", "a2"]);
    }

    #[test]
    fn test_malformed_row_degrades_to_defaults() {
        let store = SqliteStore::in_memory().unwrap();
        store.set("chan-a", "mything", &sample_record()).unwrap();

        {
            let conn = store.conn.lock().unwrap();
            conn.execute(
                "UPDATE feeds SET last_post_id = 'garbage', last_delivered_at = 'not json'",
                [],
            )
            .unwrap();
        }

        let loaded = store.get("chan-a", "mything").unwrap().unwrap();
        assert_eq!(loaded.last_post_id, 0);
        assert!(loaded.last_delivered_at.is_none());
    }
}
