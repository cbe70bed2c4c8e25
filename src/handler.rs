use crate::{
    config::Config,
    dispatch::Dispatcher,
    event::{Invocation, Message},
    platform::{InteractionPlatform, Platform, SerenityPlatform},
    status::StatusRotator,
};
use serenity::all::{Interaction, Ready};
use std::sync::Arc;
use tracing::{error, info};

/// Discord event handler
pub struct Handler {
    cfg: Arc<Config>,
    dispatcher: Dispatcher,
    rotator: Arc<StatusRotator>,
}

impl Handler {
    pub fn new(cfg: Arc<Config>, dispatcher: Dispatcher, rotator: Arc<StatusRotator>) -> Self {
        Self {
            cfg,
            dispatcher,
            rotator,
        }
    }

    /// Work done once the gateway session is up
    async fn start_up(&self, platform: Arc<dyn Platform>) {
        if self.rotator.start(platform.clone()) {
            info!("Started status rotation");
        }

        if self.cfg.general.sync_commands_globally {
            info!("Syncing commands globally...");
            let definitions = self.dispatcher.registry().definitions();
            if let Err(e) = platform.register_commands(&definitions).await {
                error!("Could not sync commands: {}", e);
            }
        }
    }
}

#[serenity::async_trait]
impl serenity::all::EventHandler for Handler {
    async fn ready(&self, discord_ctx: serenity::all::Context, ready: Ready) {
        info!("Logged in as {}", ready.user.name);
        info!("{} version: {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        info!(
            "Running on: {} ({})",
            std::env::consts::OS,
            std::env::consts::ARCH
        );
        info!("Connected to {} server(s)", ready.guilds.len());

        self.start_up(Arc::new(SerenityPlatform::new(discord_ctx)))
            .await;
    }

    async fn message(&self, discord_ctx: serenity::all::Context, msg: serenity::all::Message) {
        let me = discord_ctx.cache.current_user().id;
        let platform = SerenityPlatform::new(discord_ctx);
        self.dispatcher
            .dispatch(&platform, me, &Message::from(&msg))
            .await;
    }

    async fn interaction_create(&self, discord_ctx: serenity::all::Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };

        let invocation = Invocation::from_interaction(&command);
        let platform = InteractionPlatform::new(SerenityPlatform::new(discord_ctx), command);
        self.dispatcher
            .invoke_interaction(&platform, &invocation)
            .await;
    }
}
