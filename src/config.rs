use anyhow::{anyhow, bail, Result};
use serenity::all::UserId;
use std::{path::PathBuf, time::Duration};
use tokio::io::AsyncReadExt;

const CONFIG_PATH_REL_HOME: &str = ".config/sakurabot/config.toml";
const STATE_PATH_REL_HOME: &str = ".config/sakurabot/state.toml";
const CONFIG_PATH_ENV: &str = "SAKURABOT_CONFIG";

/// Bot configuration
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct Config {
    pub general: General,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub extensions: Extensions,
    #[serde(default)]
    pub random_bs: RandomBs,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct General {
    pub token: String,
    pub prefix: String,
    #[serde(default)]
    pub sync_commands_globally: bool,
    /// User ids allowed to run owner-only commands
    #[serde(default)]
    pub owners: Vec<u64>,
    /// Where the blacklist lives.  Defaults to a file next to the configuration.
    #[serde(default)]
    pub state_path: Option<PathBuf>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct Status {
    #[serde(default = "default_status_interval")]
    pub interval_seconds: u64,
    #[serde(default = "default_statuses")]
    pub statuses: Vec<String>,
}

#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Extensions {
    /// Directory of extension manifests.  When unset every built-in extension is loaded.
    pub directory: Option<PathBuf>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct RandomBs {
    #[serde(default = "default_dataset")]
    pub dataset: PathBuf,
}

fn default_status_interval() -> u64 {
    60
}

fn default_statuses() -> Vec<String> {
    [
        "with Elissa!",
        "with JB!",
        "with Lucrious!",
        "with Tonster46346!",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_dataset() -> PathBuf {
    PathBuf::from("data/combined.txt")
}

impl Default for Status {
    fn default() -> Self {
        Self {
            interval_seconds: default_status_interval(),
            statuses: default_statuses(),
        }
    }
}

impl Default for RandomBs {
    fn default() -> Self {
        Self {
            dataset: default_dataset(),
        }
    }
}

impl Config {
    fn config_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        dirs::home_dir()
            .map(|p| p.join(CONFIG_PATH_REL_HOME))
            .ok_or(anyhow!("Could not find home directory"))
    }

    pub async fn load() -> Result<Self> {
        let path = Self::config_path()?;

        let mut file = tokio::fs::File::open(&path).await.map_err(|e| {
            anyhow!(
                "Could not open configuration at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })?;

        let mut contents = String::new();
        file.read_to_string(&mut contents).await.map_err(|e| {
            anyhow!(
                "Could not read configuration at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })?;

        Self::parse(&contents).map_err(|e| {
            anyhow!(
                "Could not parse configuration at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })
    }

    /// Parse and validate configuration text
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.general.token.trim().is_empty() {
            bail!("`general.token` must not be empty");
        }
        if self.general.prefix.is_empty() {
            bail!("`general.prefix` must not be empty");
        }
        if self.general.prefix.chars().any(char::is_whitespace) {
            bail!("`general.prefix` must not contain whitespace");
        }
        if self.status.interval_seconds == 0 {
            bail!("`status.interval_seconds` must be at least 1");
        }
        Ok(())
    }

    pub fn owners(&self) -> impl Iterator<Item = UserId> + '_ {
        self.general.owners.iter().copied().map(UserId::new)
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_secs(self.status.interval_seconds)
    }

    pub fn state_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.general.state_path {
            return Ok(path.clone());
        }

        dirs::home_dir()
            .map(|p| p.join(STATE_PATH_REL_HOME))
            .ok_or(anyhow!("Could not find home directory"))
    }
}

#[cfg(test)]
pub(crate) fn test_config(prefix: &str) -> Config {
    Config {
        general: General {
            token: "token".to_owned(),
            prefix: prefix.to_owned(),
            sync_commands_globally: false,
            owners: vec![1],
            state_path: None,
        },
        status: Status::default(),
        extensions: Extensions::default(),
        random_bs: RandomBs::default(),
    }
}
