use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::codeforces::CodeforcesClient;
use crate::db::repository;
use crate::error::AppError;
use crate::mailer::Mailer;
use crate::services::reminder::{ReminderService, is_inactive};
use crate::services::sync_service::SyncService;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub message: String,
    pub synced_count: usize,
    pub emails_sent: usize,
    pub total_students: usize,
}

/// Syncs the whole roster, one student at a time, and reminds the ones that
/// have gone quiet, whether or not their own sync succeeded.
pub struct BatchSync {
    db: SqlitePool,
    sync: SyncService,
    reminders: ReminderService,
}

impl BatchSync {
    pub fn new(db: SqlitePool, codeforces: Arc<dyn CodeforcesClient>, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            sync: SyncService::new(db.clone(), codeforces),
            reminders: ReminderService::new(db.clone(), mailer),
            db,
        }
    }

    pub async fn run(&self) -> Result<BatchOutcome, AppError> {
        info!("Starting batch sync...");
        let students = repository::fetch_students(&self.db).await?;
        let total_students = students.len();

        let mut synced_count = 0;
        let mut emails_sent = 0;

        for student in students {
            // A failed sync still falls through to the inactivity check.
            match self.sync.sync_student(&student.id, None).await {
                Ok(_) => synced_count += 1,
                Err(e) => warn!("Error syncing student {} ({}): {}", student.id, student.handle, e),
            }

            let refreshed = match repository::find_student_by_id(&self.db, &student.id).await {
                Ok(Some(s)) => s,
                Ok(None) => {
                    warn!("Student {} disappeared during batch sync", student.id);
                    continue;
                }
                Err(e) => {
                    warn!("Failed to reload student {}: {}", student.id, e);
                    continue;
                }
            };

            if !refreshed.emails_enabled || !is_inactive(&refreshed, Utc::now()) {
                continue;
            }

            match self.reminders.send_reminder(&refreshed.id).await {
                Ok(count) => {
                    info!("Inactivity reminder #{} sent to {}", count, refreshed.email);
                    emails_sent += 1;
                }
                Err(e) => warn!("Failed to send reminder to {}: {}", refreshed.email, e),
            }
        }

        let outcome = BatchOutcome {
            message: "Batch sync completed".to_string(),
            synced_count,
            emails_sent,
            total_students,
        };
        info!(
            "Batch sync completed: {}/{} synced, {} reminders sent",
            outcome.synced_count, outcome.total_students, outcome.emails_sent
        );
        Ok(outcome)
    }
}
