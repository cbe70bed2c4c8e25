use crate::{context::Context, plugin::*};
use serenity::all::Permissions;

pub fn setup(registry: &mut Registry) -> Result<()> {
    registry.register(Help)?;
    registry.register(Ping)?;
    registry.register(Echo)?;
    Ok(())
}

/// Lists every registered command
pub struct Help;

#[serenity::async_trait]
impl Command for Help {
    fn name(&self) -> &'static str {
        "help"
    }

    fn description(&self) -> &'static str {
        "show this help message"
    }

    async fn run(&self, ctx: &Context<'_>) -> Result<(), CommandError> {
        let prefix = &ctx.cfg.general.prefix;

        let mut reply = String::new();
        reply.push_str("```\n");
        reply.push_str("Commands:\n");
        for command in ctx.registry.iter() {
            reply.push_str(&format!(
                "{}{} - {}\n",
                prefix,
                command.name(),
                command.description()
            ));
        }
        reply.push_str("```\n");

        ctx.say(&reply).await?;
        Ok(())
    }
}

pub struct Ping;

#[serenity::async_trait]
impl Command for Ping {
    fn name(&self) -> &'static str {
        "ping"
    }

    fn description(&self) -> &'static str {
        "check if the bot is alive"
    }

    async fn run(&self, ctx: &Context<'_>) -> Result<(), CommandError> {
        ctx.say("Pong!").await?;
        Ok(())
    }
}

/// Repeats a message as the bot
pub struct Echo;

const ECHO_ARGUMENTS: &[Argument] = &[Argument {
    name: "message",
    description: "what the bot should say",
    required: true,
}];

const ECHO_CHECKS: &[Check] = &[
    Check::NotBlacklisted,
    Check::Permissions(Permissions::MANAGE_MESSAGES),
];

#[serenity::async_trait]
impl Command for Echo {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn description(&self) -> &'static str {
        "make the bot say something"
    }

    fn arguments(&self) -> &'static [Argument] {
        ECHO_ARGUMENTS
    }

    fn checks(&self) -> &'static [Check] {
        ECHO_CHECKS
    }

    async fn run(&self, ctx: &Context<'_>) -> Result<(), CommandError> {
        ctx.say(ctx.invocation.rest()).await?;
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

    async fn run(command: &dyn Command, content: &str) -> MockPlatform {
        let cfg = test_config("!");
        let mut registry = Registry::new();
        setup(&mut registry).unwrap();
        let platform = MockPlatform::default();
        let invocation =
            Invocation::from_message(&message(5, content), &["!".to_owned()]).unwrap();

        let ctx = Context {
            cfg: &cfg,
            registry: &registry,
            platform: &platform,
            invocation: &invocation,
        };
        command.run(&ctx).await.unwrap();
        platform
    }

    #[tokio::test]
    async fn test_help_lists_commands_with_prefix() {
        let platform = run(&Help, "!help").await;

        let texts = platform.texts();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains("!echo - make the bot say something\n"));
        assert!(texts[0].contains("!help - show this help message\n"));
        assert!(texts[0].contains("!ping - "));
    }

    #[tokio::test]
    async fn test_ping() {
        assert_eq!(run(&Ping, "!ping").await.texts(), vec!["Pong!"]);
    }

    #[tokio::test]
    async fn test_echo_repeats_rest() {
        assert_eq!(
            run(&Echo, "!echo hello  there").await.texts(),
            vec!["hello  there"]
        );
    }
}
