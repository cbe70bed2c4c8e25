use crate::{
    context::Context,
    platform::{CommandDefinition, OptionDefinition},
    report::CommandError,
};
use anyhow::{bail, Result};
use serenity::all::Permissions;
use std::{collections::BTreeMap, sync::Arc, time::Duration};

mod custom;
mod general;
pub mod loader;
mod owner;

#[serenity::async_trait]
pub trait Command: Send + Sync {
    /// Name used to invoke the command, e.g. `ping` for `!ping`
    fn name(&self) -> &'static str;
    /// One line shown in help and in the slash command picker
    fn description(&self) -> &'static str;
    /// Positional arguments.  Required ones must come first.
    fn arguments(&self) -> &'static [Argument] {
        &[]
    }
    /// Conditions checked before the command runs, in order
    fn checks(&self) -> &'static [Check] {
        &[]
    }
    /// Minimum time between two uses by the same user
    fn cooldown(&self) -> Option<Duration> {
        None
    }
    async fn run(&self, ctx: &Context<'_>) -> Result<(), CommandError>;
}

pub struct Argument {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

pub enum Check {
    NotBlacklisted,
    IsOwner,
    Permissions(Permissions),
}

/// Commands by name
#[derive(Default)]
pub struct Registry {
    commands: BTreeMap<&'static str, Arc<dyn Command>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, command: impl Command + 'static) -> Result<()> {
        self.insert(Arc::new(command))
    }

    fn insert(&mut self, command: Arc<dyn Command>) -> Result<()> {
        let name = command.name();
        if self.commands.contains_key(name) {
            bail!("Command `{}` is already registered", name);
        }
        self.commands.insert(name, command);
        Ok(())
    }

    /// Move every command of `other` into `self`.  Nothing is moved if any name is taken.
    pub fn merge(&mut self, other: Registry) -> Result<()> {
        if let Some(name) = other
            .commands
            .keys()
            .find(|name| self.commands.contains_key(*name))
        {
            bail!("Command `{}` is already registered", name);
        }
        self.commands.extend(other.commands);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Command>> {
        self.commands.get(name)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Commands in name order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Command>> {
        self.commands.values()
    }

    pub fn definitions(&self) -> Vec<CommandDefinition> {
        self.iter()
            .map(|command| CommandDefinition {
                name: command.name().to_owned(),
                description: command.description().to_owned(),
                options: command
                    .arguments()
                    .iter()
                    .map(|arg| OptionDefinition {
                        name: arg.name.to_owned(),
                        description: arg.description.to_owned(),
                        required: arg.required,
                    })
                    .collect(),
            })
            .collect()
    }
}

/// Registers an extension's commands
pub type Setup = fn(&mut Registry) -> Result<()>;

/// Extensions compiled into the bot, by the name a manifest refers to them with
pub fn extensions() -> Vec<(&'static str, Setup)> {
    vec![
        ("general", general::setup as Setup),
        ("custom", custom::setup as Setup),
        ("owner", owner::setup as Setup),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Named;

    #[test]
    fn test_duplicate_name_is_rejected() {
        let mut registry = Registry::new();
        registry.register(Named("a")).unwrap();

        assert!(registry.register(Named("a")).is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_merge_is_all_or_nothing() {
        let mut registry = Registry::new();
        registry.register(Named("a")).unwrap();

        let mut clashing = Registry::new();
        clashing.register(Named("b")).unwrap();
        clashing.register(Named("a")).unwrap();
        assert!(registry.merge(clashing).is_err());
        assert!(registry.get("b").is_none());

        let mut fresh = Registry::new();
        fresh.register(Named("c")).unwrap();
        registry.merge(fresh).unwrap();
        assert_eq!(
            registry.iter().map(|c| c.name()).collect::<Vec<_>>(),
            vec!["a", "c"]
        );
    }

    #[test]
    fn test_builtin_extensions() {
        let mut registry = Registry::new();
        for (_, setup) in extensions() {
            setup(&mut registry).unwrap();
        }

        let names: Vec<_> = registry.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["echo", "help", "ping", "random_bs", "sync"]);

        let echo = registry
            .definitions()
            .into_iter()
            .find(|d| d.name == "echo")
            .unwrap();
        assert_eq!(echo.options.len(), 1);
        assert!(echo.options[0].required);
    }
}
