use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{FeedRecord, ThreadSnapshot, ThreadUrl};
use crate::engine::diff::{advance_cursor, compute_delivery, Delivery};
use crate::fetcher::ThreadFetcher;
use crate::formatter;
use crate::sink::{Sink, SinkProfile};
use crate::store::CursorStore;

/// Outcome counters for one synchronization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Feeds examined.
    pub feeds: usize,
    /// Items successfully handed to the sink.
    pub delivered: usize,
    /// Feeds skipped without cursor mutation (fetch failure, unknown
    /// destination).
    pub skipped: usize,
    /// Feeds that hit an unexpected error at the processing boundary.
    pub errors: usize,
}

/// Result of attempting one feed's deliveries.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedDelivery {
    pub delivered: usize,
    pub failed: usize,
}

/// Drives one synchronization pass over every configured feed.
///
/// All collaborators are injected at construction; the dispatcher holds
/// no state of its own between ticks.
pub struct Dispatcher {
    store: Arc<dyn CursorStore + Send + Sync>,
    fetcher: Arc<dyn ThreadFetcher + Send + Sync>,
    sink: Arc<dyn Sink + Send + Sync>,
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn CursorStore + Send + Sync>,
        fetcher: Arc<dyn ThreadFetcher + Send + Sync>,
        sink: Arc<dyn Sink + Send + Sync>,
    ) -> Self {
        Self {
            store,
            fetcher,
            sink,
        }
    }

    /// Process every destination's feeds once.
    ///
    /// Within a tick the sink profile is resolved once per destination
    /// and each resolved `(board, thread_id)` is fetched at most once,
    /// however many feeds point at it. A feed whose fetch failed is
    /// skipped with its cursor untouched. No single feed's failure
    /// aborts the tick.
    pub async fn run_tick(&self) -> TickSummary {
        let mut summary = TickSummary::default();

        let all = match self.store.list_all() {
            Ok(all) => all,
            Err(e) => {
                warn!("Failed to enumerate feeds: {}", e);
                summary.errors += 1;
                return summary;
            }
        };

        let mut snapshots: HashMap<ThreadUrl, Option<ThreadSnapshot>> = HashMap::new();
        let mut profiles: HashMap<String, Option<SinkProfile>> = HashMap::new();

        for (destination, feeds) in all {
            let profile = match profiles.get(&destination) {
                Some(cached) => *cached,
                None => {
                    let resolved = self.sink.profile(&destination).await;
                    profiles.insert(destination.clone(), resolved);
                    resolved
                }
            };

            let Some(profile) = profile else {
                debug!(
                    "No sink profile for destination {}; skipping {} feed(s)",
                    destination,
                    feeds.len()
                );
                summary.feeds += feeds.len();
                summary.skipped += feeds.len();
                continue;
            };

            for (name, record) in feeds {
                summary.feeds += 1;
                match self
                    .process_feed(&destination, &name, &record, profile, &mut snapshots)
                    .await
                {
                    Ok(Some(delivery)) => summary.delivered += delivery.delivered,
                    Ok(None) => summary.skipped += 1,
                    Err(e) => {
                        debug!(
                            "Feed {} in {} failed this tick: {}",
                            name, destination, e
                        );
                        summary.errors += 1;
                    }
                }
            }
        }

        summary
    }

    /// Handle one feed within a tick. `None` means the feed was skipped
    /// without touching its cursor.
    async fn process_feed(
        &self,
        destination: &str,
        name: &str,
        record: &FeedRecord,
        profile: SinkProfile,
        snapshots: &mut HashMap<ThreadUrl, Option<ThreadSnapshot>>,
    ) -> crate::app::Result<Option<FeedDelivery>> {
        let thread_url = ThreadUrl::parse(&record.url)?;

        let snapshot = match snapshots.get(&thread_url) {
            Some(cached) => cached.clone(),
            None => {
                let fetched = match self
                    .fetcher
                    .fetch_thread(&thread_url.board, &thread_url.thread_id)
                    .await
                {
                    Ok(snapshot) => Some(snapshot),
                    Err(e) => {
                        debug!("Fetch failed for {}: {}", thread_url, e);
                        None
                    }
                };
                snapshots.insert(thread_url.clone(), fetched.clone());
                fetched
            }
        };

        let Some(snapshot) = snapshot else {
            return Ok(None);
        };

        let delivery = self
            .deliver_feed(destination, name, record, &snapshot, profile, false)
            .await?;
        Ok(Some(delivery))
    }

    /// Diff, format, and deliver one feed's items against a snapshot,
    /// then commit the cursor. Shared by the background tick and the
    /// manual force path so both commit identically.
    ///
    /// A sink rejection of one item is logged and does not abort the
    /// remaining items; the cursor lands on the last item the sink
    /// actually accepted.
    pub async fn deliver_feed(
        &self,
        destination: &str,
        name: &str,
        record: &FeedRecord,
        snapshot: &ThreadSnapshot,
        profile: SinkProfile,
        force: bool,
    ) -> crate::app::Result<FeedDelivery> {
        let embed = record.embed_override.resolve(profile.embed_default);
        let deliveries = compute_delivery(snapshot, record, force);

        let mut outcome = FeedDelivery::default();
        let mut last_delivered = None;
        let mut notice_delivered = false;

        for delivery in deliveries {
            let payload = match &delivery {
                Delivery::Post(post) => formatter::render(post, embed, profile.accent_color),
                Delivery::ArchivalNotice => formatter::render_archival_notice(name),
            };

            match self.sink.deliver(destination, &payload).await {
                Ok(()) => {
                    outcome.delivered += 1;
                    match delivery {
                        Delivery::Post(post) => last_delivered = Some(post),
                        Delivery::ArchivalNotice => notice_delivered = true,
                    }
                }
                Err(e) => {
                    outcome.failed += 1;
                    debug!(
                        "Delivery failed for feed {} in {}: {}",
                        name, destination, e
                    );
                }
            }
        }

        let updated = advance_cursor(record, snapshot, last_delivered.as_ref(), notice_delivered);
        if updated != *record {
            self.store.set(destination, name, &updated)?;
        }

        Ok(outcome)
    }
}
