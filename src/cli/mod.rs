pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "threadcast")]
#[command(about = "Mirror imageboard threads to chat webhooks", long_about = None)]
pub struct Cli {
    /// Destination to operate on (defaults to the sole configured one)
    #[arg(short, long, global = true)]
    pub destination: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a thread feed
    Add {
        /// Unique feed name within the destination
        name: String,
        /// Thread URL, e.g. https://boards.4chan.org/g/thread/12345
        url: String,
    },
    /// Remove a feed
    Remove {
        /// Name of the feed to remove
        name: String,
    },
    /// Set a feed's embed mode
    Embed {
        /// Name of the feed
        name: String,
        /// on, off, or default (inherit the destination setting)
        mode: String,
    },
    /// List feeds for a destination
    List,
    /// Show stored state for one feed
    Stats {
        /// Name of the feed
        name: String,
    },
    /// Re-send the latest post of a feed
    Force {
        /// Name of the feed
        name: String,
    },
    /// Run one synchronization pass over all feeds
    Tick,
    /// Background daemon for continuous synchronization
    Daemon {
        #[command(subcommand)]
        action: DaemonAction,
    },
}

#[derive(Subcommand)]
pub enum DaemonAction {
    /// Start the daemon (runs in the foreground)
    Start {
        /// Poll interval (e.g., "60s", "5m"); overrides the config file
        #[arg(short, long)]
        interval: Option<String>,

        /// Skip the initial tick on start
        #[arg(long)]
        no_initial_tick: bool,

        /// Log file path (default: stdout)
        #[arg(short, long)]
        log: Option<std::path::PathBuf>,
    },
    /// Stop the running daemon
    Stop,
    /// Check daemon status
    Status,
}
