use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use threadcast::app::AppContext;
use threadcast::cli::{commands, Cli, Commands, DaemonAction};
use threadcast::config::Config;
use threadcast::daemon::{self, Daemon, DaemonConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Add { name, url } => {
            let destination = config.resolve_destination(cli.destination.as_deref())?;
            let ctx = AppContext::new(config, None)?;
            commands::add_feed(&ctx, &destination, &name, &url).await?;
        }
        Commands::Remove { name } => {
            let destination = config.resolve_destination(cli.destination.as_deref())?;
            let ctx = AppContext::new(config, None)?;
            commands::remove_feed(&ctx, &destination, &name)?;
        }
        Commands::Embed { name, mode } => {
            let destination = config.resolve_destination(cli.destination.as_deref())?;
            let ctx = AppContext::new(config, None)?;
            commands::set_embed(&ctx, &destination, &name, &mode)?;
        }
        Commands::List => {
            let destination = config.resolve_destination(cli.destination.as_deref())?;
            let ctx = AppContext::new(config, None)?;
            commands::list_feeds(&ctx, &destination)?;
        }
        Commands::Stats { name } => {
            let destination = config.resolve_destination(cli.destination.as_deref())?;
            let ctx = AppContext::new(config, None)?;
            commands::stats(&ctx, &destination, &name)?;
        }
        Commands::Force { name } => {
            let destination = config.resolve_destination(cli.destination.as_deref())?;
            let ctx = AppContext::new(config, None)?;
            commands::force_feed(&ctx, &destination, &name).await?;
        }
        Commands::Tick => {
            let ctx = AppContext::new(config, None)?;
            commands::tick(&ctx).await?;
        }
        Commands::Daemon { action } => match action {
            DaemonAction::Start {
                interval,
                no_initial_tick,
                log,
            } => {
                let interval_str = interval.unwrap_or_else(|| config.daemon.poll_interval.clone());
                let poll_interval_secs = DaemonConfig::parse_interval(&interval_str)
                    .map_err(|e| anyhow::anyhow!(e))?;

                let daemon_config = DaemonConfig {
                    poll_interval_secs,
                    tick_on_start: config.daemon.tick_on_start && !no_initial_tick,
                    log_file: log,
                };

                let ctx = AppContext::new(config, None)?;
                Daemon::new(Arc::new(ctx), daemon_config).run().await?;
            }
            DaemonAction::Stop => match daemon::stop_daemon() {
                Ok(()) => println!("Daemon stopped"),
                Err(e) => println!("{}", e),
            },
            DaemonAction::Status => {
                println!("{}", daemon::daemon_status());
            }
        },
    }

    Ok(())
}
