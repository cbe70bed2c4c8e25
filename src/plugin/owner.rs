use crate::{context::Context, plugin::*};

pub fn setup(registry: &mut Registry) -> Result<()> {
    registry.register(SyncCommands)
}

/// Pushes slash command definitions to Discord
pub struct SyncCommands;

const SYNC_CHECKS: &[Check] = &[Check::IsOwner];

#[serenity::async_trait]
impl Command for SyncCommands {
    fn name(&self) -> &'static str {
        "sync"
    }

    fn description(&self) -> &'static str {
        "synchronize slash commands globally (bot owner only)"
    }

    fn checks(&self) -> &'static [Check] {
        SYNC_CHECKS
    }

    async fn run(&self, ctx: &Context<'_>) -> Result<(), CommandError> {
        ctx.platform
            .register_commands(&ctx.registry.definitions())
            .await?;
        ctx.say("Slash commands have been globally synchronized.")
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::test_config,
        event::Invocation,
        testing::{message, MockPlatform},
    };

    #[tokio::test]
    async fn test_sync_registers_every_command() {
        let cfg = test_config("!");
        let mut registry = Registry::new();
        for (_, setup) in extensions() {
            setup(&mut registry).unwrap();
        }
        let platform = MockPlatform::default();
        let invocation = Invocation::from_message(&message(1, "!sync"), &["!".to_owned()]).unwrap();
        let ctx = Context {
            cfg: &cfg,
            registry: &registry,
            platform: &platform,
            invocation: &invocation,
        };

        SyncCommands.run(&ctx).await.unwrap();

        assert_eq!(platform.registered(), registry.definitions());
        assert_eq!(
            platform.texts(),
            vec!["Slash commands have been globally synchronized."]
        );
    }
}
