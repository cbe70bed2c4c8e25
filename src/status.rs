use crate::platform::Platform;
use rand::{rngs::OsRng, seq::SliceRandom};
use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};
use tokio::{
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, warn};

/// Periodically changes the bot's presence to a random entry of a fixed list
pub struct StatusRotator {
    statuses: Arc<[String]>,
    period: Duration,
    task: OnceLock<JoinHandle<()>>,
}

impl StatusRotator {
    pub fn new(statuses: Vec<String>, period: Duration) -> Self {
        Self {
            statuses: statuses.into(),
            period,
            task: OnceLock::new(),
        }
    }

    /// Start rotating.  Returns false if rotation was already started or there is nothing to
    /// rotate through.
    pub fn start(&self, platform: Arc<dyn Platform>) -> bool {
        if self.statuses.is_empty() {
            warn!("No statuses configured, not rotating presence");
            return false;
        }

        let mut started = false;
        self.task.get_or_init(|| {
            started = true;
            tokio::spawn(rotate(platform, self.statuses.clone(), self.period))
        });
        started
    }

    /// Stop rotating for good
    pub fn shutdown(&self) {
        if let Some(task) = self.task.get() {
            task.abort();
        }
    }
}

async fn rotate(platform: Arc<dyn Platform>, statuses: Arc<[String]>, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        // The first tick completes immediately
        ticker.tick().await;

        if let Some(status) = statuses.choose(&mut OsRng) {
            debug!("Setting presence to \"{}\"", status);
            platform.set_presence(status);
        }
    }
}
