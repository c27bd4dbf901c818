#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use progress_tracker::codeforces::{
    CodeforcesClient, ContestResult, Profile, SubmissionPage, SubmissionResult,
};
use progress_tracker::db::{self, repository};
use progress_tracker::mailer::{Email, MailError, Mailer};
use progress_tracker::models::{NewStudent, Student};
use sqlx::SqlitePool;

/// Remote data served for one handle.
#[derive(Clone, Default)]
pub struct HandleData {
    pub profile: Option<Profile>,
    pub contests: Vec<ContestResult>,
    pub submissions: Vec<SubmissionResult>,
}

/// In-memory judge keyed by handle. Unknown handles look like users that do
/// not exist.
#[derive(Default)]
pub struct FakeCodeforces {
    handles: Mutex<HashMap<String, HandleData>>,
}

impl FakeCodeforces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, handle: &str, data: HandleData) -> Self {
        self.set(handle, data);
        self
    }

    pub fn set(&self, handle: &str, data: HandleData) {
        self.handles.lock().unwrap().insert(handle.to_string(), data);
    }

    fn get(&self, handle: &str) -> HandleData {
        self.handles.lock().unwrap().get(handle).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl CodeforcesClient for FakeCodeforces {
    async fn fetch_profile(&self, handle: &str) -> Option<Profile> {
        self.get(handle).profile
    }

    async fn fetch_rating_history(&self, handle: &str) -> Vec<ContestResult> {
        self.get(handle).contests
    }

    async fn fetch_submissions(&self, handle: &str, _page: SubmissionPage) -> Vec<SubmissionResult> {
        self.get(handle).submissions
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<Email>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _email: Email) -> Result<(), MailError> {
        Err(MailError::Transport("connection refused".to_string()))
    }
}

pub async fn setup_db() -> SqlitePool {
    db::connect_in_memory().await.expect("Failed to create test db")
}

pub async fn seed_student(db: &SqlitePool, name: &str, handle: &str, emails_enabled: bool) -> Student {
    repository::insert_student(
        db,
        NewStudent {
            name: name.to_string(),
            email: format!("{}@example.com", handle),
            phone: "555-0100".to_string(),
            handle: handle.to_string(),
            emails_enabled,
        },
    )
    .await
    .expect("Failed to insert student")
}

pub fn profile(handle: &str, rating: i64, max_rating: i64) -> Profile {
    Profile {
        handle: handle.to_string(),
        rating,
        max_rating,
    }
}

pub fn contest(contest_id: i64, old_rating: i64, new_rating: i64, contest_time: DateTime<Utc>) -> ContestResult {
    ContestResult {
        contest_id,
        contest_name: format!("Codeforces Round {}", contest_id),
        rank: 100,
        old_rating,
        new_rating,
        rating_change: new_rating - old_rating,
        participation_type: "CONTESTANT".to_string(),
        contest_time,
    }
}

pub fn submission(
    submission_id: i64,
    problem_name: &str,
    problem_rating: Option<i64>,
    verdict: &str,
    submission_time: DateTime<Utc>,
) -> SubmissionResult {
    SubmissionResult {
        submission_id,
        contest_id: Some(1000),
        problem_name: problem_name.to_string(),
        problem_rating,
        verdict: verdict.to_string(),
        programming_language: "GNU C++17".to_string(),
        submission_time,
    }
}

/// Whole-second "now", matching what the store round-trips.
pub fn now() -> DateTime<Utc> {
    DateTime::from_timestamp(Utc::now().timestamp(), 0).unwrap()
}

pub fn days_ago(days: i64) -> DateTime<Utc> {
    now() - Duration::days(days)
}
