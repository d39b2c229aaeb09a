//! Decides what one feed must deliver for one fetched snapshot, and how
//! the cursor moves afterwards. Everything here is pure; the dispatcher
//! owns the I/O around it.

use crate::domain::{FeedRecord, Post, ThreadSnapshot};

/// One unit of output from a diff: a real post, or the synthetic notice
/// emitted when a thread transitions into the archived state.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Post(Post),
    ArchivalNotice,
}

/// Compute the items to deliver now, in ascending post-number order.
///
/// - An archived snapshot against a non-archived cursor yields exactly
///   one archival notice and suppresses the normal diff for this cycle;
///   once the cursor is archived the feed goes quiet for good.
/// - `force` selects the single latest item (topic when the thread has
///   no replies), already-delivered or not.
/// - A zero cursor means the feed has never delivered; the baseline is
///   established by the cursor commit, not by replaying history.
/// - Otherwise every reply newer than the cursor is a candidate, with a
///   cheap short-circuit on `last_reply_id`.
///
/// An empty result is the common steady-state outcome, not an error.
pub fn compute_delivery(
    snapshot: &ThreadSnapshot,
    cursor: &FeedRecord,
    force: bool,
) -> Vec<Delivery> {
    if snapshot.archived {
        if !cursor.is_archived {
            return vec![Delivery::ArchivalNotice];
        }
        return Vec::new();
    }

    if force {
        return vec![Delivery::Post(snapshot.latest_item().clone())];
    }

    if cursor.last_post_id == 0 {
        return Vec::new();
    }

    if snapshot.last_reply_id <= cursor.last_post_id {
        return Vec::new();
    }

    snapshot
        .replies_after(cursor.last_post_id)
        .cloned()
        .map(Delivery::Post)
        .collect()
}

/// The cursor state to persist after a feed's deliveries were attempted.
///
/// `delivered` is the last item successfully handed to the sink (not the
/// last item attempted); `notice_delivered` records a successfully sent
/// archival notice. Advisory flags refresh from the snapshot on every
/// commit. `last_post_id` never decreases, so a forced re-send of an
/// already-delivered item cannot move the cursor backwards.
pub fn advance_cursor(
    cursor: &FeedRecord,
    snapshot: &ThreadSnapshot,
    delivered: Option<&Post>,
    notice_delivered: bool,
) -> FeedRecord {
    let mut next = cursor.clone();

    next.is_sticky = snapshot.sticky;
    next.is_at_bump_limit = snapshot.bump_limit;
    next.image_count = snapshot.image_count;

    if notice_delivered {
        next.is_archived = true;
    }

    if let Some(post) = delivered {
        next.last_post_id = next.last_post_id.max(post.number);
        next.reply_count = snapshot.reply_count();
        next.last_delivered_at = Some(post.timestamp_fields());
    } else if next.last_post_id == 0 {
        // First ever sync: pin the baseline to the current latest item
        // without delivering anything.
        next.last_post_id = snapshot.last_reply_id;
        next.reply_count = snapshot.reply_count();
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EmbedMode;

    fn post(number: u64) -> Post {
        Post {
            number,
            timestamp: 1_700_000_000 + number as i64,
            author_name: "Anonymous".into(),
            author_hash: None,
            signature: None,
            raw_text: String::new(),
            rendered_text: format!("reply {}", number),
            url: format!("https://boards.example.org/g/thread/5#p{}", number),
            media_url: None,
        }
    }

    fn snapshot(replies: &[u64]) -> ThreadSnapshot {
        let replies: Vec<Post> = replies.iter().map(|n| post(*n)).collect();
        let last_reply_id = replies.last().map(|p| p.number).unwrap_or(5);
        ThreadSnapshot {
            board: "g".into(),
            thread_id: "5".into(),
            topic: post(5),
            replies,
            last_reply_id,
            archived: false,
            sticky: false,
            bump_limit: false,
            image_count: 0,
        }
    }

    fn cursor_at(last_post_id: u64) -> FeedRecord {
        FeedRecord {
            url: "https://boards.example.org/g/thread/5".into(),
            embed_override: EmbedMode::Inherit,
            last_post_id,
            reply_count: 0,
            last_delivered_at: None,
            image_count: 0,
            is_archived: false,
            is_sticky: false,
            is_at_bump_limit: false,
        }
    }

    fn numbers(deliveries: &[Delivery]) -> Vec<u64> {
        deliveries
            .iter()
            .filter_map(|d| match d {
                Delivery::Post(p) => Some(p.number),
                Delivery::ArchivalNotice => None,
            })
            .collect()
    }

    #[test]
    fn test_new_replies_delivered_ascending() {
        let snap = snapshot(&[5, 6, 7, 8]);
        let out = compute_delivery(&snap, &cursor_at(5), false);
        assert_eq!(numbers(&out), vec![6, 7, 8]);
    }

    #[test]
    fn test_no_new_replies_is_empty() {
        let snap = snapshot(&[6, 7]);
        let out = compute_delivery(&snap, &cursor_at(7), false);
        assert!(out.is_empty());
    }

    #[test]
    fn test_zero_cursor_never_backfills() {
        let snap = snapshot(&[6, 7, 8]);
        let out = compute_delivery(&snap, &cursor_at(0), false);
        assert!(out.is_empty());
    }

    #[test]
    fn test_repeat_diff_is_idempotent() {
        let snap = snapshot(&[6, 7, 8]);
        let cursor = cursor_at(5);
        let first = compute_delivery(&snap, &cursor, false);
        assert_eq!(numbers(&first), vec![6, 7, 8]);

        let advanced = advance_cursor(&cursor, &snap, Some(&post(8)), false);
        let second = compute_delivery(&snap, &advanced, false);
        assert!(second.is_empty());
    }

    #[test]
    fn test_force_selects_single_latest() {
        let snap = snapshot(&[7, 8, 9]);
        let out = compute_delivery(&snap, &cursor_at(6), true);
        assert_eq!(numbers(&out), vec![9]);
    }

    #[test]
    fn test_force_on_thread_without_replies_selects_topic() {
        let snap = snapshot(&[]);
        let out = compute_delivery(&snap, &cursor_at(5), true);
        assert_eq!(numbers(&out), vec![5]);
    }

    #[test]
    fn test_force_redelivers_already_sent_item() {
        let snap = snapshot(&[6, 7]);
        let out = compute_delivery(&snap, &cursor_at(7), true);
        assert_eq!(numbers(&out), vec![7]);
    }

    #[test]
    fn test_archival_transition_emits_single_notice() {
        let mut snap = snapshot(&[6, 7]);
        snap.archived = true;

        let cursor = cursor_at(5);
        let out = compute_delivery(&snap, &cursor, false);
        assert_eq!(out, vec![Delivery::ArchivalNotice]);

        // Normal diff is suppressed even though replies 6 and 7 are new.
        assert_eq!(numbers(&out), Vec::<u64>::new());

        let advanced = advance_cursor(&cursor, &snap, None, true);
        assert!(advanced.is_archived);
        let again = compute_delivery(&snap, &advanced, false);
        assert!(again.is_empty());
    }

    #[test]
    fn test_failed_notice_retries_next_cycle() {
        let mut snap = snapshot(&[6]);
        snap.archived = true;

        let cursor = cursor_at(5);
        // Sink rejected the notice: the cursor must not mark archived.
        let advanced = advance_cursor(&cursor, &snap, None, false);
        assert!(!advanced.is_archived);
        assert_eq!(
            compute_delivery(&snap, &advanced, false),
            vec![Delivery::ArchivalNotice]
        );
    }

    #[test]
    fn test_cheap_path_short_circuit_matches_general_rule() {
        let snap = snapshot(&[6, 7, 8]);
        // last_reply_id (8) <= cursor (9): short-circuits to empty,
        // exactly what the per-item rule would conclude.
        let out = compute_delivery(&snap, &cursor_at(9), false);
        assert!(out.is_empty());
    }

    #[test]
    fn test_advance_pins_baseline_for_zero_cursor() {
        let snap = snapshot(&[6, 7, 8]);
        let advanced = advance_cursor(&cursor_at(0), &snap, None, false);
        assert_eq!(advanced.last_post_id, 8);
        assert_eq!(advanced.reply_count, 3);
        assert!(advanced.last_delivered_at.is_none());
    }

    #[test]
    fn test_advance_records_delivered_item() {
        let snap = snapshot(&[6, 7, 8]);
        let advanced = advance_cursor(&cursor_at(5), &snap, Some(&post(7)), false);
        assert_eq!(advanced.last_post_id, 7);
        assert_eq!(advanced.reply_count, 3);
        assert_eq!(
            advanced.last_delivered_at,
            Some(post(7).timestamp_fields())
        );
    }

    #[test]
    fn test_advance_is_monotonic_under_forced_redelivery() {
        let snap = snapshot(&[6, 7]);
        let cursor = cursor_at(7);
        let advanced = advance_cursor(&cursor, &snap, Some(&post(7)), false);
        assert_eq!(advanced.last_post_id, 7);
    }

    #[test]
    fn test_advance_refreshes_advisory_flags() {
        let mut snap = snapshot(&[6]);
        snap.sticky = true;
        snap.bump_limit = true;
        snap.image_count = 42;

        let advanced = advance_cursor(&cursor_at(6), &snap, None, false);
        assert!(advanced.is_sticky);
        assert!(advanced.is_at_bump_limit);
        assert_eq!(advanced.image_count, 42);
        // Advisory refresh alone never moves the cursor.
        assert_eq!(advanced.last_post_id, 6);
        assert_eq!(advanced.reply_count, 0);
    }
}
