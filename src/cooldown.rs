use serenity::all::UserId;
use std::{collections::HashMap, time::Duration};
use tokio::{sync::Mutex, time::Instant};

/// Per-command, per-user rate limit of one use per window
#[derive(Default)]
pub struct Cooldowns(Mutex<HashMap<(&'static str, UserId), Instant>>);

impl Cooldowns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a use of `command` by `user_id`.  Returns how long to wait instead if the previous
    /// use is still inside `per`.
    ///
    /// Expired entries of `command` are dropped on the way.
    pub async fn try_use(
        &self,
        command: &'static str,
        user_id: UserId,
        per: Duration,
    ) -> Result<(), Duration> {
        let now = Instant::now();
        let mut last_used = self.0.lock().await;
        last_used.retain(|(name, _), last| *name != command || now.duration_since(*last) < per);

        if let Some(last) = last_used.get(&(command, user_id)) {
            let elapsed = now.duration_since(*last);
            if elapsed < per {
                return Err(per - elapsed);
            }
        }

        last_used.insert((command, user_id), now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_window() {
        let cooldowns = Cooldowns::new();
        let user = UserId::new(1);
        let per = Duration::from_secs(10);

        assert!(cooldowns.try_use("ping", user, per).await.is_ok());

        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(
            cooldowns.try_use("ping", user, per).await,
            Err(Duration::from_secs(6))
        );

        // Other users and other commands have their own buckets
        assert!(cooldowns.try_use("ping", UserId::new(2), per).await.is_ok());
        assert!(cooldowns.try_use("echo", user, per).await.is_ok());

        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(cooldowns.try_use("ping", user, per).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entries_are_dropped() {
        let cooldowns = Cooldowns::new();
        let per = Duration::from_secs(10);

        for user in 1..=50 {
            cooldowns.try_use("ping", UserId::new(user), per).await.unwrap();
        }
        cooldowns.try_use("echo", UserId::new(1), per).await.unwrap();
        assert_eq!(cooldowns.0.lock().await.len(), 51);

        tokio::time::advance(per).await;
        cooldowns.try_use("ping", UserId::new(99), per).await.unwrap();

        // Only the fresh ping entry and the untouched echo entry remain
        let last_used = cooldowns.0.lock().await;
        assert_eq!(last_used.len(), 2);
        assert!(last_used.contains_key(&("ping", UserId::new(99))));
        assert!(last_used.contains_key(&("echo", UserId::new(1))));
    }
}
