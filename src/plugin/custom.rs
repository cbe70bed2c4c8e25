use crate::{context::Context, plugin::*};
use anyhow::anyhow;
use rand::seq::SliceRandom;

pub fn setup(registry: &mut Registry) -> Result<()> {
    registry.register(RandomBs)
}

/// Prints a random line from the dataset file
pub struct RandomBs;

const RANDOM_BS_CHECKS: &[Check] = &[Check::NotBlacklisted];

#[serenity::async_trait]
impl Command for RandomBs {
    fn name(&self) -> &'static str {
        "random_bs"
    }

    fn description(&self) -> &'static str {
        "Prints out random bullshit from the dataset."
    }

    fn checks(&self) -> &'static [Check] {
        RANDOM_BS_CHECKS
    }

    fn cooldown(&self) -> Option<Duration> {
        Some(Duration::from_secs(3))
    }

    async fn run(&self, ctx: &Context<'_>) -> Result<(), CommandError> {
        let path = &ctx.cfg.random_bs.dataset;
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            anyhow!(
                "Could not read dataset at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })?;

        let line = pick_line(&contents)
            .ok_or(anyhow!("Dataset at `{}` is empty", path.to_string_lossy()))?;
        ctx.say(&line).await?;
        Ok(())
    }
}

/// One non-blank line, chosen uniformly.  The dataset stores `#` as `___`.
fn pick_line(contents: &str) -> Option<String> {
    let lines: Vec<&str> = contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect();

    lines
        .choose(&mut rand::thread_rng())
        .map(|line| line.replace("___", "#"))
}
