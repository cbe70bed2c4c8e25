//! Turns command failures into notices for the channel the command came from.

use crate::platform::{Notice, Platform};
use serenity::all::ChannelId;
use std::time::Duration;

pub const ERROR_COLOR: u32 = 0xE02B2B;

/// Why a command did not run to completion
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("command is on cooldown, retry in {retry_after:?}")]
    Cooldown { retry_after: Duration },
    #[error("user is blacklisted")]
    Blacklisted,
    #[error("user is not an owner of the bot")]
    NotOwner,
    #[error("missing permission(s): {}", .0.join(", "))]
    MissingPermissions(Vec<String>),
    #[error("{0} is a required argument that is missing.")]
    MissingArgument(String),
    /// A slash command that is no longer registered, e.g. after its extension was disabled
    #[error("command `{0}` is not registered")]
    Unavailable(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CommandError {
    pub fn notice(&self) -> Notice {
        let (title, description) = match self {
            CommandError::Cooldown { retry_after } => (
                "Hey, please slow down!",
                format!(
                    "You can use this command again in {}.",
                    format_retry_after(*retry_after)
                ),
            ),
            CommandError::Blacklisted => (
                "Error!",
                "You are blacklisted from using the bot.".to_owned(),
            ),
            CommandError::NotOwner => ("Error!", "You are not the owner of the bot!".to_owned()),
            CommandError::MissingPermissions(missing) => (
                "Error!",
                format!(
                    "You are missing the permission(s) `{}` to execute this command!",
                    missing.join(", ")
                ),
            ),
            // Argument names are lower case in code
            CommandError::MissingArgument(_) => ("Error!", capitalize(&self.to_string())),
            CommandError::Unavailable(_) => (
                "Error!",
                "This command is no longer available.".to_owned(),
            ),
            CommandError::Other(_) => (
                "Error!",
                "Something went wrong while running this command.".to_owned(),
            ),
        };

        Notice {
            title: title.to_owned(),
            description,
            color: ERROR_COLOR,
        }
    }
}

/// Send the notice for `err` to `channel_id`.
///
/// Unclassified errors come back as `Err` once reported so the caller can log them.  Failing to
/// send the notice is logged here and otherwise ignored.
pub async fn report(
    platform: &dyn Platform,
    channel_id: ChannelId,
    err: CommandError,
) -> anyhow::Result<()> {
    if let Err(send_err) = platform.send_notice(channel_id, &err.notice()).await {
        tracing::warn!("Could not report command error to {}: {}", channel_id, send_err);
    }

    match err {
        CommandError::Other(err) => Err(err),
        _ => Ok(()),
    }
}

/// Render a wait as e.g. `1 hours 2 minutes 5 seconds`, leaving out units that round to zero
pub fn format_retry_after(retry_after: Duration) -> String {
    let secs = retry_after.as_secs_f64();
    let minutes = (secs / 60.0).floor();
    let seconds = secs - minutes * 60.0;
    let hours = (minutes / 60.0).floor();
    let minutes = minutes - hours * 60.0;

    let parts: Vec<String> = [(hours, "hours"), (minutes, "minutes"), (seconds, "seconds")]
        .into_iter()
        .map(|(value, unit)| (value.round() as u64, unit))
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{} {}", value, unit))
        .collect();

    if parts.is_empty() {
        "a moment".to_owned()
    } else {
        parts.join(" ")
    }
}

/// Upper-case the first character and lower-case the rest
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
