//! Serenity hands us its own, rather large, message and interaction types.  The dispatcher only
//! needs a handful of fields, so this module translates them into small owned types that are
//! also easy to build in tests.

use serenity::all::{ChannelId, CommandInteraction, GuildId, Permissions, RoleId, UserId};

/// Who sent a message or invoked a command
#[derive(Clone, Debug)]
pub struct Author {
    pub id: UserId,
    pub name: String,
    pub bot: bool,
}

/// Guild membership data that arrives with an event, so permission checks do not depend on the
/// member cache
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Membership {
    /// The author's roles, sent along with guild messages
    Roles(Vec<RoleId>),
    /// Permissions in the invoking channel, resolved by Discord for interactions
    Resolved(Permissions),
}

/// An inbound chat message
#[derive(Clone, Debug)]
pub struct Message {
    pub author: Author,
    pub content: String,
    pub channel_id: ChannelId,
    /// None for direct messages
    pub guild_id: Option<GuildId>,
    pub member: Option<Membership>,
}

impl From<&serenity::all::User> for Author {
    fn from(user: &serenity::all::User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            bot: user.bot,
        }
    }
}

impl From<&serenity::all::Message> for Message {
    fn from(msg: &serenity::all::Message) -> Self {
        Self {
            author: Author::from(&msg.author),
            content: msg.content.clone(),
            channel_id: msg.channel_id,
            guild_id: msg.guild_id,
            member: msg
                .member
                .as_ref()
                .map(|member| Membership::Roles(member.roles.clone())),
        }
    }
}

/// A parsed command call, from either a prefixed text message or a slash command
#[derive(Clone, Debug)]
pub struct Invocation {
    pub author: Author,
    pub channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
    pub member: Option<Membership>,
    pub command: String,
    pub args: Vec<String>,
    rest: String,
}

impl Invocation {
    /// Parse `msg` as a command call if it starts with one of `prefixes`.
    ///
    /// The command name must follow the prefix directly, e.g. `!ping`.  `! ping` is not a
    /// command.
    pub fn from_message(msg: &Message, prefixes: &[String]) -> Option<Self> {
        let body = prefixes
            .iter()
            .find_map(|prefix| msg.content.strip_prefix(prefix.as_str()))?;

        let name_end = body.find(char::is_whitespace).unwrap_or(body.len());
        let (command, rest) = body.split_at(name_end);
        if command.is_empty() {
            return None;
        }

        let rest = rest.trim();
        Some(Self {
            author: msg.author.clone(),
            channel_id: msg.channel_id,
            guild_id: msg.guild_id,
            member: msg.member.clone(),
            command: command.to_owned(),
            args: rest.split_whitespace().map(String::from).collect(),
            rest: rest.to_owned(),
        })
    }

    /// Slash command options arrive already split; positional order follows the options.
    pub fn from_interaction(interaction: &CommandInteraction) -> Self {
        let args: Vec<String> = interaction
            .data
            .options
            .iter()
            .filter_map(|option| option.value.as_str().map(String::from))
            .collect();

        Self {
            author: Author::from(&interaction.user),
            channel_id: interaction.channel_id,
            guild_id: interaction.guild_id,
            member: interaction
                .member
                .as_ref()
                .and_then(|member| member.permissions)
                .map(Membership::Resolved),
            command: interaction.data.name.clone(),
            rest: args.join(" "),
            args,
        }
    }

    /// Everything after the command name
    pub fn rest(&self) -> &str {
        &self.rest
    }

    /// Where the command ran, for log lines.  `guild_name` is the display name of the guild, if
    /// known.
    pub fn location(&self, guild_name: Option<&str>) -> String {
        match self.guild_id {
            Some(guild_id) => format!(
                "in {} (ID: {}) by {} (ID: {})",
                guild_name.unwrap_or("guild"),
                guild_id,
                self.author.name,
                self.author.id
            ),
            None => format!("by {} (ID: {}) in DMs", self.author.name, self.author.id),
        }
    }
}

/// Mention forms Discord uses for a user, usable as command prefixes
pub fn mention_prefixes(id: UserId) -> [String; 2] {
    [format!("<@{}> ", id), format!("<@!{}> ", id)]
}
