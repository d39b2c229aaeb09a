//! Typed feed-management operations. The CLI layer maps these outcomes
//! to user-facing messages; nothing here prints.

use tracing::debug;

use crate::app::{AppContext, Result, ThreadcastError};
use crate::domain::{EmbedMode, FeedRecord, ThreadUrl};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Created,
    NameConflict,
    /// Malformed URL, dead board/thread, or an already-archived thread.
    InvalidThread,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedOutcome {
    Updated,
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceOutcome {
    DeliveredOne,
    InvalidThread,
    NotFound,
}

/// Register a new feed. The thread is validated with a live fetch, and
/// the cursor baseline is pinned to its current latest item so no
/// history is replayed.
pub async fn add_feed(
    ctx: &AppContext,
    destination: &str,
    name: &str,
    url: &str,
) -> Result<AddOutcome> {
    if ctx.store.get(destination, name)?.is_some() {
        return Ok(AddOutcome::NameConflict);
    }

    let Ok(thread_url) = ThreadUrl::parse(url) else {
        return Ok(AddOutcome::InvalidThread);
    };

    let snapshot = match ctx
        .fetcher
        .fetch_thread(&thread_url.board, &thread_url.thread_id)
        .await
    {
        Ok(snapshot) => snapshot,
        Err(e) => {
            debug!("Validation fetch failed for {}: {}", url, e);
            return Ok(AddOutcome::InvalidThread);
        }
    };

    if snapshot.archived {
        return Ok(AddOutcome::InvalidThread);
    }

    let record = FeedRecord::baseline(url.to_string(), &snapshot);
    ctx.store.set(destination, name, &record)?;
    Ok(AddOutcome::Created)
}

pub fn remove_feed(ctx: &AppContext, destination: &str, name: &str) -> Result<RemoveOutcome> {
    if ctx.store.delete(destination, name)? {
        Ok(RemoveOutcome::Removed)
    } else {
        Ok(RemoveOutcome::NotFound)
    }
}

pub fn set_embed_mode(
    ctx: &AppContext,
    destination: &str,
    name: &str,
    mode: EmbedMode,
) -> Result<EmbedOutcome> {
    let Some(mut record) = ctx.store.get(destination, name)? else {
        return Ok(EmbedOutcome::NotFound);
    };

    record.embed_override = mode;
    ctx.store.set(destination, name, &record)?;
    Ok(EmbedOutcome::Updated)
}

/// Feeds of one destination, ordered by name.
pub fn list_feeds(ctx: &AppContext, destination: &str) -> Result<Vec<(String, FeedRecord)>> {
    ctx.store.list_destination(destination)
}

/// Stored state snapshot for one feed.
pub fn feed_stats(ctx: &AppContext, destination: &str, name: &str) -> Result<Option<FeedRecord>> {
    ctx.store.get(destination, name)
}

/// Re-send the latest item of one feed regardless of cursor state,
/// committing the cursor exactly like the background path. May run
/// concurrently with a background tick; the bounded worst case is one
/// duplicate delivery, never a lost or reordered one.
pub async fn force_feed(ctx: &AppContext, destination: &str, name: &str) -> Result<ForceOutcome> {
    let Some(record) = ctx.store.get(destination, name)? else {
        return Ok(ForceOutcome::NotFound);
    };

    let Ok(thread_url) = ThreadUrl::parse(&record.url) else {
        return Ok(ForceOutcome::InvalidThread);
    };

    let snapshot = match ctx
        .fetcher
        .fetch_thread(&thread_url.board, &thread_url.thread_id)
        .await
    {
        Ok(snapshot) => snapshot,
        Err(e) => {
            debug!("Force fetch failed for {}: {}", record.url, e);
            return Ok(ForceOutcome::InvalidThread);
        }
    };

    if snapshot.archived {
        return Ok(ForceOutcome::InvalidThread);
    }

    let Some(profile) = ctx.sink.profile(destination).await else {
        return Err(ThreadcastError::Config(format!(
            "no destination configured: {}",
            destination
        )));
    };

    let delivery = ctx
        .dispatcher
        .deliver_feed(destination, name, &record, &snapshot, profile, true)
        .await?;

    if delivery.delivered > 0 {
        Ok(ForceOutcome::DeliveredOne)
    } else {
        Err(ThreadcastError::Other(
            "forced delivery was rejected by the destination".to_string(),
        ))
    }
}
