use crate::config::SchedulerConfig;
use crate::updater::EventUpdater;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info};

/// Periodic update runner for a fixed repository list
pub struct UpdateScheduler {
    config: SchedulerConfig,
    updater: Arc<EventUpdater>,
}

impl UpdateScheduler {
    /// Create a new scheduler
    pub fn new(config: SchedulerConfig, updater: Arc<EventUpdater>) -> Self {
        Self { config, updater }
    }

    /// Spawn the polling task. The first run happens one interval after start.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    async fn run(self) {
        let period = self.config.interval();
        let repositories: Vec<String> =
            self.config.repositories.iter().map(|repo| repo.to_string()).collect();

        info!(
            "Starting update scheduler for {} repositories every {:?}",
            repositories.len(),
            period
        );

        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.run_once(&repositories).await;
        }
    }

    async fn run_once(&self, repositories: &[String]) {
        match self.updater.update_from_store(repositories).await {
            Ok(summary) => {
                info!(
                    "Scheduled update completed: {} new events from {} repositories",
                    summary.new_events_count, summary.repositories_updated
                );
            }
            Err(e) => {
                error!("Scheduled update failed: {}", e);
            }
        }
    }
}
