use anyhow::{anyhow, Result};
use serenity::all::UserId;
use std::{collections::HashSet, io::ErrorKind, path::PathBuf};

/// Read side of the blacklist.  Adding and removing users is done out of band.
#[serenity::async_trait]
pub trait BlacklistStore: Send + Sync {
    async fn contains(&self, user_id: UserId) -> Result<bool>;
}

/// State which persists across sessions
#[derive(Default, serde::Serialize, serde::Deserialize)]
pub struct PersistentState {
    #[serde(default)]
    pub blacklisted_users: HashSet<u64>,
}

/// Blacklist kept in the TOML state file.  The file is re-read on every lookup so edits take
/// effect without a restart.
pub struct FileBlacklist {
    path: PathBuf,
}

impl FileBlacklist {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    async fn load(&self) -> Result<PersistentState> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            // Nobody has been blacklisted yet
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(PersistentState::default()),
            Err(e) => {
                return Err(anyhow!(
                    "Could not read state at `{}`: {}",
                    self.path.to_string_lossy(),
                    e
                ))
            }
        };

        toml::from_str(&contents).map_err(|e| {
            anyhow!(
                "Could not parse state at `{}`: {}",
                self.path.to_string_lossy(),
                e
            )
        })
    }
}

#[serenity::async_trait]
impl BlacklistStore for FileBlacklist {
    async fn contains(&self, user_id: UserId) -> Result<bool> {
        Ok(self.load().await?.blacklisted_users.contains(&user_id.get()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_empty_blacklist() {
        let dir = tempfile::tempdir().unwrap();
        let blacklist = FileBlacklist::new(dir.path().join("state.toml"));

        assert!(!blacklist.contains(UserId::new(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_reads_blacklisted_users() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.toml");
        std::fs::write(&path, "blacklisted_users = [42, 7]\n").unwrap();
        let blacklist = FileBlacklist::new(path.clone());

        assert!(blacklist.contains(UserId::new(42)).await.unwrap());
        assert!(!blacklist.contains(UserId::new(8)).await.unwrap());

        // Edits are visible on the next lookup
        std::fs::write(&path, "blacklisted_users = [8]\n").unwrap();
        assert!(!blacklist.contains(UserId::new(42)).await.unwrap());
        assert!(blacklist.contains(UserId::new(8)).await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_state_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.toml");
        std::fs::write(&path, "blacklisted_users = \"nope\"\n").unwrap();

        assert!(FileBlacklist::new(path).contains(UserId::new(1)).await.is_err());
    }
}
