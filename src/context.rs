use crate::{config::Config, event::Invocation, platform::Platform, plugin::Registry};

/// Everything a command can see while it runs
pub struct Context<'a> {
    pub cfg: &'a Config,
    pub registry: &'a Registry,
    pub platform: &'a dyn Platform,
    pub invocation: &'a Invocation,
}

impl Context<'_> {
    /// Send text to the channel the command came from
    pub async fn say(&self, content: &str) -> anyhow::Result<()> {
        self.platform
            .send_message(self.invocation.channel_id, content)
            .await
    }
}
