//! What the bot needs from a chat platform, and the serenity implementation of it.

use crate::event::{Invocation, Membership};
use anyhow::{anyhow, Result};
use serenity::all::{
    ActivityData, ChannelId, CommandInteraction, CommandOptionType, CreateCommand,
    CreateCommandOption, CreateEmbed, CreateInteractionResponse,
    CreateInteractionResponseFollowup, CreateInteractionResponseMessage, CreateMessage, Guild,
    GuildId, Member, Permissions, RoleId, UserId,
};
use std::sync::atomic::{AtomicBool, Ordering};

/// A titled, coloured message.  Rendered as an embed on Discord.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub color: u32,
}

/// Platform-neutral description of a command, used to register slash commands
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandDefinition {
    pub name: String,
    pub description: String,
    pub options: Vec<OptionDefinition>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionDefinition {
    pub name: String,
    pub description: String,
    pub required: bool,
}

#[serenity::async_trait]
pub trait Platform: Send + Sync {
    async fn send_message(&self, channel_id: ChannelId, content: &str) -> Result<()>;
    async fn send_notice(&self, channel_id: ChannelId, notice: &Notice) -> Result<()>;
    /// Replace the "Playing ..." line shown next to the bot
    fn set_presence(&self, status: &str);
    /// Push command definitions platform-wide
    async fn register_commands(&self, commands: &[CommandDefinition]) -> Result<()>;
    /// Permissions the invoking user holds in the invoking channel.  Direct messages grant
    /// everything.
    async fn permissions(&self, invocation: &Invocation) -> Result<Permissions>;
    fn guild_name(&self, guild_id: GuildId) -> Option<String>;
}

impl From<&Notice> for CreateEmbed {
    fn from(notice: &Notice) -> Self {
        CreateEmbed::new()
            .title(&notice.title)
            .description(&notice.description)
            .colour(notice.color)
    }
}

impl From<&CommandDefinition> for CreateCommand {
    fn from(definition: &CommandDefinition) -> Self {
        definition.options.iter().fold(
            CreateCommand::new(&definition.name).description(&definition.description),
            |command, option| {
                command.add_option(
                    CreateCommandOption::new(
                        CommandOptionType::String,
                        &option.name,
                        &option.description,
                    )
                    .required(option.required),
                )
            },
        )
    }
}

/// Platform backed by a live serenity connection
#[derive(Clone)]
pub struct SerenityPlatform {
    ctx: serenity::all::Context,
}

impl SerenityPlatform {
    pub fn new(ctx: serenity::all::Context) -> Self {
        Self { ctx }
    }
}

#[serenity::async_trait]
impl Platform for SerenityPlatform {
    async fn send_message(&self, channel_id: ChannelId, content: &str) -> Result<()> {
        channel_id.say(&self.ctx.http, content).await?;
        Ok(())
    }

    async fn send_notice(&self, channel_id: ChannelId, notice: &Notice) -> Result<()> {
        let message = CreateMessage::new().embed(CreateEmbed::from(notice));
        channel_id.send_message(&self.ctx, message).await?;
        Ok(())
    }

    fn set_presence(&self, status: &str) {
        self.ctx.set_activity(Some(ActivityData::playing(status)));
    }

    async fn register_commands(&self, commands: &[CommandDefinition]) -> Result<()> {
        let commands = commands.iter().map(CreateCommand::from).collect();
        serenity::all::Command::set_global_commands(&self.ctx.http, commands).await?;
        Ok(())
    }

    async fn permissions(&self, invocation: &Invocation) -> Result<Permissions> {
        let Some(guild_id) = invocation.guild_id else {
            return Ok(Permissions::all());
        };

        let roles = match &invocation.member {
            Some(Membership::Resolved(permissions)) => return Ok(*permissions),
            Some(Membership::Roles(roles)) => roles.clone(),
            None => {
                guild_id
                    .member(&self.ctx, invocation.author.id)
                    .await?
                    .roles
            }
        };

        let guild = self
            .ctx
            .cache
            .guild(guild_id)
            .ok_or(anyhow!("Guild {} is not cached", guild_id))?;
        member_permissions_in(&guild, invocation.channel_id, invocation.author.id, &roles)
    }

    fn guild_name(&self, guild_id: GuildId) -> Option<String> {
        self.ctx.cache.guild(guild_id).map(|guild| guild.name.clone())
    }
}

/// Permissions of the member `user_id` with `roles` in `channel_id`.
///
/// Threads are not listed in `Guild::channels`; they use the overwrites of their parent channel.
pub fn member_permissions_in(
    guild: &Guild,
    channel_id: ChannelId,
    user_id: UserId,
    roles: &[RoleId],
) -> Result<Permissions> {
    let channel = guild
        .channels
        .get(&channel_id)
        .or_else(|| {
            guild
                .threads
                .iter()
                .find(|thread| thread.id == channel_id)
                .and_then(|thread| thread.parent_id)
                .and_then(|parent_id| guild.channels.get(&parent_id))
        })
        .ok_or(anyhow!("Channel {} is not cached", channel_id))?;

    // Member is non-exhaustive, so fill in a default one
    let mut member = Member::default();
    member.user.id = user_id;
    member.guild_id = guild.id;
    member.roles = roles.to_vec();

    Ok(guild.user_permissions_in(channel, &member))
}

/// Which kind of reply the next send on an interaction has to be
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Reply {
    Response,
    Followup,
}

/// An interaction is answered exactly once, everything after that is a follow-up
#[derive(Default)]
struct Replies(AtomicBool);

impl Replies {
    fn next(&self) -> Reply {
        if self.0.swap(true, Ordering::SeqCst) {
            Reply::Followup
        } else {
            Reply::Response
        }
    }
}

/// Answers a slash command.  The first send becomes the interaction response, later sends are
/// follow-ups.  Everything else goes to the underlying connection.
pub struct InteractionPlatform {
    inner: SerenityPlatform,
    interaction: CommandInteraction,
    replies: Replies,
}

impl InteractionPlatform {
    pub fn new(inner: SerenityPlatform, interaction: CommandInteraction) -> Self {
        Self {
            inner,
            interaction,
            replies: Replies::default(),
        }
    }

    async fn respond(
        &self,
        response: CreateInteractionResponseMessage,
        followup: CreateInteractionResponseFollowup,
    ) -> Result<()> {
        match self.replies.next() {
            Reply::Response => {
                self.interaction
                    .create_response(&self.inner.ctx, CreateInteractionResponse::Message(response))
                    .await?;
            }
            Reply::Followup => {
                self.interaction
                    .create_followup(&self.inner.ctx, followup)
                    .await?;
            }
        }
        Ok(())
    }
}

#[serenity::async_trait]
impl Platform for InteractionPlatform {
    async fn send_message(&self, _channel_id: ChannelId, content: &str) -> Result<()> {
        self.respond(
            CreateInteractionResponseMessage::new().content(content),
            CreateInteractionResponseFollowup::new().content(content),
        )
        .await
    }

    async fn send_notice(&self, _channel_id: ChannelId, notice: &Notice) -> Result<()> {
        self.respond(
            CreateInteractionResponseMessage::new().embed(CreateEmbed::from(notice)),
            CreateInteractionResponseFollowup::new().embed(CreateEmbed::from(notice)),
        )
        .await
    }

    fn set_presence(&self, status: &str) {
        self.inner.set_presence(status)
    }

    async fn register_commands(&self, commands: &[CommandDefinition]) -> Result<()> {
        self.inner.register_commands(commands).await
    }

    async fn permissions(&self, invocation: &Invocation) -> Result<Permissions> {
        self.inner.permissions(invocation).await
    }

    fn guild_name(&self, guild_id: GuildId) -> Option<String> {
        self.inner.guild_name(guild_id)
    }
}
