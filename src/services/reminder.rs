use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tracing::info;

use crate::db::repository;
use crate::error::AppError;
use crate::mailer::{Mailer, templates};
use crate::models::Student;

/// Days without a submission after which a student counts as inactive.
pub const INACTIVITY_DAYS: i64 = 7;

/// A student with no recorded submission, or none in the last
/// [`INACTIVITY_DAYS`] days, is inactive.
pub fn is_inactive(student: &Student, now: DateTime<Utc>) -> bool {
    let threshold = now - Duration::days(INACTIVITY_DAYS);
    match student.last_submission_date {
        Some(last) => last < threshold,
        None => true,
    }
}

pub struct ReminderService {
    db: SqlitePool,
    mailer: Arc<dyn Mailer>,
}

impl ReminderService {
    pub fn new(db: SqlitePool, mailer: Arc<dyn Mailer>) -> Self {
        Self { db, mailer }
    }

    /// Emails a reminder and records it, returning the new reminder count.
    /// The count is only bumped once the message has been handed off.
    pub async fn send_reminder(&self, student_id: &str) -> Result<i64, AppError> {
        let student = repository::find_student_by_id(&self.db, student_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !student.emails_enabled {
            return Err(AppError::PreconditionFailed(
                "Email notifications are disabled for this student".to_string(),
            ));
        }

        let email = templates::reminder(&student.email, &student.name, student.reminder_count + 1);
        self.mailer.send(email).await?;

        let reminder_count = repository::increment_reminder_count(&self.db, student_id)
            .await?
            .ok_or(AppError::NotFound)?;
        info!("Reminder #{} sent to {} ({})", reminder_count, student.name, student.handle);

        Ok(reminder_count)
    }
}
