//! Test doubles shared by the unit tests

use crate::{
    blacklist::BlacklistStore,
    context::Context,
    event::{Author, Invocation, Message},
    platform::{CommandDefinition, Notice, Platform},
    plugin::Command,
    report::CommandError,
};
use anyhow::Result;
use serenity::all::{ChannelId, GuildId, Permissions, UserId};
use std::{collections::HashSet, sync::Mutex};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sent {
    Text { channel_id: ChannelId, content: String },
    Notice { channel_id: ChannelId, notice: Notice },
}

/// Records everything the bot asks the platform to do
pub struct MockPlatform {
    sent: Mutex<Vec<Sent>>,
    presences: Mutex<Vec<String>>,
    registered: Mutex<Vec<CommandDefinition>>,
    pub permissions: Permissions,
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self {
            sent: Mutex::default(),
            presences: Mutex::default(),
            registered: Mutex::default(),
            permissions: Permissions::all(),
        }
    }
}

impl MockPlatform {
    pub fn with_permissions(permissions: Permissions) -> Self {
        Self {
            permissions,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|sent| match sent {
                Sent::Text { content, .. } => Some(content),
                Sent::Notice { .. } => None,
            })
            .collect()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.sent()
            .into_iter()
            .filter_map(|sent| match sent {
                Sent::Notice { notice, .. } => Some(notice),
                Sent::Text { .. } => None,
            })
            .collect()
    }

    pub fn presences(&self) -> Vec<String> {
        self.presences.lock().unwrap().clone()
    }

    pub fn registered(&self) -> Vec<CommandDefinition> {
        self.registered.lock().unwrap().clone()
    }
}

#[serenity::async_trait]
impl Platform for MockPlatform {
    async fn send_message(&self, channel_id: ChannelId, content: &str) -> Result<()> {
        self.sent.lock().unwrap().push(Sent::Text {
            channel_id,
            content: content.to_owned(),
        });
        Ok(())
    }

    async fn send_notice(&self, channel_id: ChannelId, notice: &Notice) -> Result<()> {
        self.sent.lock().unwrap().push(Sent::Notice {
            channel_id,
            notice: notice.clone(),
        });
        Ok(())
    }

    fn set_presence(&self, status: &str) {
        self.presences.lock().unwrap().push(status.to_owned());
    }

    async fn register_commands(&self, commands: &[CommandDefinition]) -> Result<()> {
        *self.registered.lock().unwrap() = commands.to_vec();
        Ok(())
    }

    async fn permissions(&self, _invocation: &Invocation) -> Result<Permissions> {
        Ok(self.permissions)
    }

    fn guild_name(&self, _guild_id: GuildId) -> Option<String> {
        None
    }
}

#[derive(Default)]
pub struct MemoryBlacklist(pub HashSet<UserId>);

#[serenity::async_trait]
impl BlacklistStore for MemoryBlacklist {
    async fn contains(&self, user_id: UserId) -> Result<bool> {
        Ok(self.0.contains(&user_id))
    }
}

/// A direct message from a human user
pub fn message(author: u64, content: &str) -> Message {
    Message {
        author: Author {
            id: UserId::new(author),
            name: format!("user{}", author),
            bot: false,
        },
        content: content.to_owned(),
        channel_id: ChannelId::new(100),
        guild_id: None,
        member: None,
    }
}

/// Command that does nothing but exist under a name
pub struct Named(pub &'static str);

#[serenity::async_trait]
impl Command for Named {
    fn name(&self) -> &'static str {
        self.0
    }

    fn description(&self) -> &'static str {
        "test command"
    }

    async fn run(&self, _ctx: &Context<'_>) -> Result<(), CommandError> {
        Ok(())
    }
}
