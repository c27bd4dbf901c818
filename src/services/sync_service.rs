use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::codeforces::{CodeforcesClient, ContestResult, SubmissionPage, SubmissionResult};
use crate::db::repository;
use crate::error::AppError;
use crate::models::{Contest, Submission};

pub struct SyncService {
    db: SqlitePool,
    codeforces: Arc<dyn CodeforcesClient>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    pub student_id: String,
    pub handle: String,
    pub profile_updated: bool,
    pub contests_synced: usize,
    pub submissions_synced: usize,
    pub last_submission_date: Option<DateTime<Utc>>,
}

impl SyncService {
    pub fn new(db: SqlitePool, codeforces: Arc<dyn CodeforcesClient>) -> Self {
        Self { db, codeforces }
    }

    /// Pulls profile, rating history and submissions for one student and
    /// writes them to the store. `handle` overrides the stored handle.
    ///
    /// Writes are applied one by one; a failure part way through leaves the
    /// rows already written in place.
    pub async fn sync_student(
        &self,
        student_id: &str,
        handle: Option<&str>,
    ) -> Result<SyncOutcome, AppError> {
        let student = repository::find_student_by_id(&self.db, student_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let handle = handle.unwrap_or(&student.handle).to_string();
        if handle != student.handle {
            debug!(
                "Syncing {} with handle {} (stored handle {})",
                student.id, handle, student.handle
            );
        }
        info!("Syncing student {} ({})", student.name, handle);

        let (profile, contests, submissions) = tokio::join!(
            self.codeforces.fetch_profile(&handle),
            self.codeforces.fetch_rating_history(&handle),
            self.codeforces.fetch_submissions(&handle, SubmissionPage::default()),
        );

        let profile_updated = match profile {
            Some(profile) => repository::update_student_ratings(
                &self.db,
                &student.id,
                profile.rating,
                profile.max_rating,
                Utc::now(),
            )
            .await?,
            None => false,
        };

        for result in &contests {
            repository::upsert_contest(&self.db, &contest_row(&student.id, result)).await?;
        }

        for result in &submissions {
            repository::upsert_submission(&self.db, &submission_row(&student.id, result)).await?;
        }

        let mut last_submission_date = student.last_submission_date;
        if let Some(batch_latest) = submissions.iter().map(|s| s.submission_time).max() {
            // Never move the marker backwards when the batch is older than
            // what was recorded before.
            if last_submission_date.is_none_or(|previous| batch_latest > previous) {
                repository::set_last_submission_date(&self.db, &student.id, batch_latest).await?;
                last_submission_date = Some(batch_latest);
            }
        }

        let outcome = SyncOutcome {
            student_id: student.id,
            handle,
            profile_updated,
            contests_synced: contests.len(),
            submissions_synced: submissions.len(),
            last_submission_date,
        };
        info!(
            "Synced {}: profile_updated={}, {} contests, {} submissions",
            outcome.handle, outcome.profile_updated, outcome.contests_synced, outcome.submissions_synced
        );
        Ok(outcome)
    }
}

fn contest_row(student_id: &str, result: &ContestResult) -> Contest {
    Contest {
        student_id: student_id.to_string(),
        contest_id: result.contest_id,
        contest_name: result.contest_name.clone(),
        rank: result.rank,
        old_rating: result.old_rating,
        new_rating: result.new_rating,
        rating_change: result.rating_change,
        participation_type: result.participation_type.clone(),
        contest_time: result.contest_time,
    }
}

fn submission_row(student_id: &str, result: &SubmissionResult) -> Submission {
    Submission {
        submission_id: result.submission_id,
        student_id: student_id.to_string(),
        contest_id: result.contest_id,
        problem_name: result.problem_name.clone(),
        problem_rating: result.problem_rating,
        verdict: result.verdict.clone(),
        programming_language: result.programming_language.clone(),
        submission_time: result.submission_time,
    }
}
