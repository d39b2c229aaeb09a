use crate::app::{AppContext, Result, ThreadcastError};
use crate::domain::EmbedMode;
use crate::engine::ops::{self, AddOutcome, EmbedOutcome, ForceOutcome, RemoveOutcome};

pub async fn add_feed(ctx: &AppContext, destination: &str, name: &str, url: &str) -> Result<()> {
    match ops::add_feed(ctx, destination, name, url).await? {
        AddOutcome::Created => {
            println!("Added feed {}: {}", name, url);
        }
        AddOutcome::NameConflict => {
            println!("{}: That name is already in use, choose another", name);
        }
        AddOutcome::InvalidThread => {
            println!(
                "That doesn't appear to be a valid thread. \
                 It is either archived, or the board/thread does not exist."
            );
        }
    }
    Ok(())
}

pub fn remove_feed(ctx: &AppContext, destination: &str, name: &str) -> Result<()> {
    match ops::remove_feed(ctx, destination, name)? {
        RemoveOutcome::Removed => println!("Removed feed {}", name),
        RemoveOutcome::NotFound => println!("{}: No feed with that name in {}", name, destination),
    }
    Ok(())
}

pub fn set_embed(ctx: &AppContext, destination: &str, name: &str, mode: &str) -> Result<()> {
    let mode: EmbedMode = mode.parse().map_err(ThreadcastError::Config)?;

    match ops::set_embed_mode(ctx, destination, name, mode)? {
        EmbedOutcome::Updated => println!("{}: embed mode set to {}", name, mode),
        EmbedOutcome::NotFound => println!("{}: No feed with that name in {}", name, destination),
    }
    Ok(())
}

pub fn list_feeds(ctx: &AppContext, destination: &str) -> Result<()> {
    let feeds = ops::list_feeds(ctx, destination)?;

    if feeds.is_empty() {
        println!("{}: No feeds.", destination);
        return Ok(());
    }

    for (name, record) in feeds {
        let archived = if record.is_archived { " [archived]" } else { "" };
        println!(
            "{}: {} - {} replies, last post {}{}",
            name, record.url, record.reply_count, record.last_post_id, archived
        );
    }

    Ok(())
}

pub fn stats(ctx: &AppContext, destination: &str, name: &str) -> Result<()> {
    let Some(record) = ops::feed_stats(ctx, destination, name)? else {
        println!("{}: No feed with that name in {}", name, destination);
        return Ok(());
    };

    println!("{}", name);
    println!("  url:             {}", record.url);
    println!("  embed mode:      {}", record.embed_override);
    println!("  last post id:    {}", record.last_post_id);
    println!("  replies:         {}", record.reply_count);
    match record.last_delivered_at {
        Some([y, mo, d, h, mi, s]) => println!(
            "  last delivered:  {:04}-{:02}-{:02} {:02}:{:02}:{:02} UTC",
            y, mo, d, h, mi, s
        ),
        None => println!("  last delivered:  never"),
    }
    println!("  images:          {}", record.image_count);
    println!("  archived:        {}", record.is_archived);
    println!("  sticky:          {}", record.is_sticky);
    println!("  bump limit:      {}", record.is_at_bump_limit);

    Ok(())
}

pub async fn force_feed(ctx: &AppContext, destination: &str, name: &str) -> Result<()> {
    match ops::force_feed(ctx, destination, name).await? {
        ForceOutcome::DeliveredOne => println!("Re-sent the latest post for {}", name),
        ForceOutcome::InvalidThread => {
            println!("That doesn't appear to be a valid thread anymore.")
        }
        ForceOutcome::NotFound => println!("{}: No feed with that name in {}", name, destination),
    }
    Ok(())
}

pub async fn tick(ctx: &AppContext) -> Result<()> {
    let summary = ctx.dispatcher.run_tick().await;
    println!(
        "Tick complete: {} feed(s), {} delivered, {} skipped, {} errors",
        summary.feeds, summary.delivered, summary.skipped, summary.errors
    );
    Ok(())
}
