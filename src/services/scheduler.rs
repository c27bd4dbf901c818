use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::codeforces::CodeforcesClient;
use crate::error::AppError;
use crate::mailer::Mailer;
use crate::services::batch::{BatchOutcome, BatchSync};

/// Runs the roster-wide batch sync on a fixed interval.
pub struct SyncScheduler {
    batch: BatchSync,
    interval: Duration,
}

impl SyncScheduler {
    pub fn new(
        db: SqlitePool,
        codeforces: Arc<dyn CodeforcesClient>,
        mailer: Arc<dyn Mailer>,
        interval_secs: u64,
    ) -> Self {
        Self {
            batch: BatchSync::new(db, codeforces, mailer),
            interval: Duration::from_secs(interval_secs),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Loops forever; the first run happens one interval after start.
    pub async fn start(self) {
        info!("Starting auto-sync scheduler (interval: {:?})", self.interval);

        loop {
            tokio::time::sleep(self.interval).await;

            match self.run_once().await {
                Ok(outcome) => {
                    info!(
                        "Auto-sync completed - synced {}/{} students, {} reminders sent",
                        outcome.synced_count, outcome.total_students, outcome.emails_sent
                    );
                }
                Err(e) => {
                    // Keep going; the next tick retries.
                    warn!("Auto-sync failed: {:?}", e);
                }
            }
        }
    }

    pub async fn run_once(&self) -> Result<BatchOutcome, AppError> {
        self.batch.run().await
    }
}
