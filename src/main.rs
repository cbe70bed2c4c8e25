mod blacklist;
mod config;
mod context;
mod cooldown;
mod dispatch;
mod event;
mod handler;
mod logging;
mod platform;
mod plugin;
mod report;
mod status;
#[cfg(test)]
mod testing;

use anyhow::Context as _;
use serenity::{all::GatewayIntents, Client};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let cfg = Arc::new(crate::config::Config::load().await?);
    let blacklist = crate::blacklist::FileBlacklist::new(cfg.state_path()?);

    let mut registry = crate::plugin::Registry::new();
    let report = crate::plugin::loader::load_extensions(
        cfg.extensions.directory.as_deref(),
        &crate::plugin::extensions(),
        &mut registry,
    )
    .await?;
    info!(
        "Loaded extensions: {}",
        report.registered().collect::<Vec<_>>().join(", ")
    );
    let failed = report.failed().count();
    if failed > 0 {
        warn!("{} extension(s) failed to load", failed);
    }
    if registry.is_empty() {
        warn!("No commands registered, only auto-replies will work");
    } else {
        info!("{} command(s) registered", registry.len());
    }

    let dispatcher = dispatch::Dispatcher::new(cfg.clone(), registry, Arc::new(blacklist));
    let rotator = Arc::new(status::StatusRotator::new(
        cfg.status.statuses.clone(),
        cfg.status_interval(),
    ));
    let handler = handler::Handler::new(cfg.clone(), dispatcher, rotator.clone());

    // Things we want discord to tell us about.
    let intents = GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&cfg.general.token, intents)
        .event_handler(handler)
        .await
        .context("Could not create Discord client")?;
    let shard_manager = client.shard_manager.clone();

    tokio::select! {
        result = client.start() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
            rotator.shutdown();
            shard_manager.shutdown_all().await;
        }
    }

    Ok(())
}
