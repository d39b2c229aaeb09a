//! # threadcast
//!
//! Watches imageboard discussion threads and delivers their new posts to
//! configured chat-webhook destinations.
//!
//! ## Architecture
//!
//! One synchronization pass (a "tick") flows through a pipeline:
//!
//! ```text
//! Fetcher → Diff Engine → Formatter → Sink
//!                └── Cursor Store (committed last)
//! ```
//!
//! - [`fetcher`]: 4chan-compatible JSON API client producing thread
//!   snapshots
//! - [`engine`]: decides what each feed must deliver and drives delivery
//! - [`formatter`]: renders posts into plain text or rich cards
//! - [`sink`]: webhook delivery
//! - [`store`]: per-feed cursor persistence (SQLite)
//!
//! The cursor only advances after the sink accepts an item, so a crash
//! mid-tick re-delivers rather than loses (at-least-once delivery).
//!
//! ## Quick Start
//!
//! ```bash
//! # Watch a thread
//! threadcast add mything https://boards.4chan.org/g/thread/12345
//!
//! # Run one synchronization pass
//! threadcast tick
//!
//! # Keep synchronizing in the background
//! threadcast daemon start --interval 60s
//! ```
//!
//! ## Modules
//!
//! - [`app`]: application context and error types
//! - [`cli`]: command-line interface definitions
//! - [`config`]: toml configuration (daemon, source, destinations)
//! - [`domain`]: core domain models (FeedRecord, Post, ThreadSnapshot)
//! - [`daemon`]: background scheduler
//! - [`engine`]: diff engine, dispatcher, and feed operations
//! - [`fetcher`]: thread snapshot fetching
//! - [`formatter`]: payload rendering
//! - [`sink`]: delivery destinations
//! - [`store`]: cursor persistence

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together all
/// components: store, fetcher, sink, dispatcher.
pub mod app;

/// Command-line interface using clap.
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/threadcast/config.toml`: poll interval, source
/// API endpoints, and webhook destinations.
pub mod config;

/// Background daemon for continuous synchronization.
///
/// - `threadcast daemon start` - Start the scheduler
/// - `threadcast daemon stop` - Stop the daemon
/// - `threadcast daemon status` - Check if daemon is running
pub mod daemon;

/// Core domain models.
///
/// - [`FeedRecord`](domain::FeedRecord): persisted per-feed cursor state
/// - [`Post`](domain::Post): one deliverable item
/// - [`ThreadSnapshot`](domain::ThreadSnapshot): one fetched thread view
/// - [`ThreadUrl`](domain::ThreadUrl): board/thread resolved from a URL
pub mod domain;

/// The synchronization engine.
///
/// - [`compute_delivery`](engine::compute_delivery): pure diff of
///   snapshot against cursor
/// - [`Dispatcher`](engine::Dispatcher): one pass over all feeds with
///   per-tick fetch/profile caches
/// - [`ops`](engine::ops): typed add/remove/embed/list/stats/force
///   operations
pub mod engine;

/// Thread snapshot fetching.
///
/// - [`ThreadFetcher`](fetcher::ThreadFetcher): async trait for the
///   source
/// - [`HttpThreadFetcher`](fetcher::HttpThreadFetcher): reqwest-based
///   client for 4chan-compatible APIs
pub mod fetcher;

/// Renders posts into destination payloads: quote/cross-board link
/// rewriting, length capping, plain text or rich cards.
pub mod formatter;

/// Delivery destinations.
///
/// - [`Sink`](sink::Sink): async trait accepting rendered payloads
/// - [`WebhookSink`](sink::WebhookSink): Discord-compatible webhooks
pub mod sink;

/// Cursor persistence.
///
/// - [`CursorStore`](store::CursorStore): trait defining storage
///   operations
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;
