//! Decides what happens to each inbound message: nothing, an auto-reply, a command, or an
//! auto-reply followed by a command attempt.

use crate::{
    blacklist::BlacklistStore,
    config::Config,
    context::Context,
    cooldown::Cooldowns,
    event::{mention_prefixes, Invocation, Message},
    platform::Platform,
    plugin::{Check, Command, Registry},
    report::{report, CommandError},
};
use serenity::all::{Permissions, UserId};
use std::{collections::HashSet, sync::Arc};
use tracing::{debug, error, info, warn};

const AUTO_REPLY_TRIGGER: &str = "Hello";
const AUTO_REPLY: &str = "Hello";

/// What the dispatcher did with a message
#[derive(Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Sent by this bot or another bot
    Ignored,
    Processed {
        auto_replied: bool,
        /// Name of the registered command that was attempted, if any
        command: Option<&'static str>,
    },
}

pub struct Dispatcher {
    cfg: Arc<Config>,
    registry: Registry,
    blacklist: Arc<dyn BlacklistStore>,
    owners: HashSet<UserId>,
    cooldowns: Cooldowns,
}

impl Dispatcher {
    pub fn new(cfg: Arc<Config>, registry: Registry, blacklist: Arc<dyn BlacklistStore>) -> Self {
        let owners = cfg.owners().collect();
        Self {
            cfg,
            registry,
            blacklist,
            owners,
            cooldowns: Cooldowns::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Handle one message.  `me` is the bot's own user id.
    pub async fn dispatch(&self, platform: &dyn Platform, me: UserId, msg: &Message) -> Dispatch {
        if msg.author.id == me || msg.author.bot {
            return Dispatch::Ignored;
        }

        let mut auto_replied = false;
        if !msg.content.starts_with(&self.cfg.general.prefix) {
            auto_replied = self.auto_reply(platform, msg).await;
        }

        let command = self.process_commands(platform, me, msg).await;
        Dispatch::Processed {
            auto_replied,
            command,
        }
    }

    /// Answer the trigger phrase.  Exact match only.
    async fn auto_reply(&self, platform: &dyn Platform, msg: &Message) -> bool {
        if msg.content != AUTO_REPLY_TRIGGER {
            return false;
        }

        match platform.send_message(msg.channel_id, AUTO_REPLY).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Could not auto-reply in {}: {}", msg.channel_id, e);
                false
            }
        }
    }

    async fn process_commands(
        &self,
        platform: &dyn Platform,
        me: UserId,
        msg: &Message,
    ) -> Option<&'static str> {
        let mut prefixes = vec![self.cfg.general.prefix.clone()];
        prefixes.extend(mention_prefixes(me));

        let invocation = Invocation::from_message(msg, &prefixes)?;
        self.invoke(platform, &invocation).await
    }

    /// Run a slash command.  Unlike text commands an interaction must always be answered, so an
    /// unknown name is reported instead of ignored.
    pub async fn invoke_interaction(
        &self,
        platform: &dyn Platform,
        invocation: &Invocation,
    ) -> Option<&'static str> {
        let name = self.invoke(platform, invocation).await;
        if name.is_none() {
            let err = CommandError::Unavailable(invocation.command.clone());
            if let Err(e) = report(platform, invocation.channel_id, err).await {
                warn!("Could not answer interaction for `{}`: {}", invocation.command, e);
            }
        }
        name
    }

    /// Run a parsed command call, reporting any failure to its channel.  Unknown commands are
    /// ignored.
    pub async fn invoke(
        &self,
        platform: &dyn Platform,
        invocation: &Invocation,
    ) -> Option<&'static str> {
        let Some(command) = self.registry.get(&invocation.command) else {
            debug!("Ignoring unknown command `{}`", invocation.command);
            return None;
        };
        let name = command.name();

        let ctx = Context {
            cfg: &self.cfg,
            registry: &self.registry,
            platform,
            invocation,
        };

        match self.run(command.as_ref(), &ctx).await {
            Ok(()) => info!("Executed {} command {}", name, location(platform, invocation)),
            Err(err) => {
                if let Err(err) = report(platform, invocation.channel_id, err).await {
                    error!(
                        "Unhandled error in {} command {}: {:#}",
                        name,
                        location(platform, invocation),
                        err
                    );
                }
            }
        }

        Some(name)
    }

    async fn run(&self, command: &dyn Command, ctx: &Context<'_>) -> Result<(), CommandError> {
        let invocation = ctx.invocation;

        for check in command.checks() {
            self.check(check, ctx).await?;
        }

        if let Some(per) = command.cooldown() {
            self.cooldowns
                .try_use(command.name(), invocation.author.id, per)
                .await
                .map_err(|retry_after| CommandError::Cooldown { retry_after })?;
        }

        if let Some(missing) = command
            .arguments()
            .iter()
            .filter(|arg| arg.required)
            .nth(invocation.args.len())
        {
            return Err(CommandError::MissingArgument(missing.name.to_owned()));
        }

        command.run(ctx).await
    }

    async fn check(&self, check: &Check, ctx: &Context<'_>) -> Result<(), CommandError> {
        let invocation = ctx.invocation;

        match check {
            Check::NotBlacklisted => {
                if self.blacklist.contains(invocation.author.id).await? {
                    return Err(CommandError::Blacklisted);
                }
            }
            Check::IsOwner => {
                if !self.owners.contains(&invocation.author.id) {
                    return Err(CommandError::NotOwner);
                }
            }
            Check::Permissions(required) => {
                let held = ctx.platform.permissions(invocation).await?;

                let missing = required.difference(held);
                if !missing.is_empty() {
                    return Err(CommandError::MissingPermissions(permission_names(missing)));
                }
            }
        }

        Ok(())
    }
}

fn location(platform: &dyn Platform, invocation: &Invocation) -> String {
    let guild_name = invocation
        .guild_id
        .and_then(|guild_id| platform.guild_name(guild_id));
    invocation.location(guild_name.as_deref())
}

/// Permission names in the snake_case form server admins know from Discord's API,
/// e.g. `manage_messages`
fn permission_names(permissions: Permissions) -> Vec<String> {
    permissions
        .get_permission_names()
        .into_iter()
        .map(|name| name.to_lowercase().replace(' ', "_"))
        .collect()
}
