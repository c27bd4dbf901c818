pub mod dto;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://codeforces.com/api";

/// Participation type recorded when the rating feed does not report one.
const DEFAULT_PARTICIPATION_TYPE: &str = "CONTESTANT";

/// Verdict recorded for submissions the judge has not finished testing.
const PENDING_VERDICT: &str = "TESTING";

#[derive(Debug, Error)]
pub enum CodeforcesError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to parse response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("api error: {0}")]
    Api(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub handle: String,
    pub rating: i64,
    pub max_rating: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContestResult {
    pub contest_id: i64,
    pub contest_name: String,
    pub rank: i64,
    pub old_rating: i64,
    pub new_rating: i64,
    pub rating_change: i64,
    pub participation_type: String,
    pub contest_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionResult {
    pub submission_id: i64,
    pub contest_id: Option<i64>,
    pub problem_name: String,
    pub problem_rating: Option<i64>,
    pub verdict: String,
    pub programming_language: String,
    pub submission_time: DateTime<Utc>,
}

/// Window into a user's submission history. `from` is 1-based; a `count` of
/// `None` asks for everything from `from` onwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionPage {
    pub from: u32,
    pub count: Option<u32>,
}

impl Default for SubmissionPage {
    fn default() -> Self {
        Self { from: 1, count: None }
    }
}

/// Read-only view of the remote judge. Implementations never fail: a call
/// that cannot be completed yields an absent profile or an empty history.
#[async_trait]
pub trait CodeforcesClient: Send + Sync {
    async fn fetch_profile(&self, handle: &str) -> Option<Profile>;
    async fn fetch_rating_history(&self, handle: &str) -> Vec<ContestResult>;
    async fn fetch_submissions(&self, handle: &str, page: SubmissionPage) -> Vec<SubmissionResult>;
}

pub struct CodeforcesHttpClient {
    client: Client,
    base_url: String,
}

impl CodeforcesHttpClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, CodeforcesError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> Result<T, CodeforcesError> {
        let url = Url::parse_with_params(&format!("{}/{}", self.base_url, method), params)
            .map_err(|e| CodeforcesError::Api(format!("invalid url for {}: {}", method, e)))?;
        debug!("GET {}", url);

        // Failed calls still carry the JSON envelope, so the body is decoded
        // regardless of the HTTP status.
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        parse_envelope(&body).map_err(|e| match e {
            CodeforcesError::Decode(_) if !status.is_success() => {
                CodeforcesError::Api(format!("http status {}", status))
            }
            other => other,
        })
    }

    async fn get_user(&self, handle: &str) -> Result<Option<dto::User>, CodeforcesError> {
        let users: Vec<dto::User> = self
            .call("user.info", &[("handles", handle.to_string())])
            .await?;
        Ok(users.into_iter().next())
    }

    async fn get_rating(&self, handle: &str) -> Result<Vec<dto::RatingChange>, CodeforcesError> {
        self.call("user.rating", &[("handle", handle.to_string())]).await
    }

    async fn get_status(
        &self,
        handle: &str,
        page: SubmissionPage,
    ) -> Result<Vec<dto::Submission>, CodeforcesError> {
        let mut params = vec![("handle", handle.to_string()), ("from", page.from.to_string())];
        if let Some(count) = page.count {
            params.push(("count", count.to_string()));
        }
        self.call("user.status", &params).await
    }
}

fn parse_envelope<T: DeserializeOwned>(body: &str) -> Result<T, CodeforcesError> {
    let envelope: dto::ApiResponse<T> = serde_json::from_str(body)?;
    if envelope.status != "OK" {
        return Err(CodeforcesError::Api(
            envelope.comment.unwrap_or_else(|| envelope.status.clone()),
        ));
    }
    envelope
        .result
        .ok_or_else(|| CodeforcesError::Api("response has no result".to_string()))
}

fn from_unix(seconds: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, 0)
}

impl From<dto::User> for Profile {
    fn from(user: dto::User) -> Self {
        Self {
            handle: user.handle,
            rating: user.rating.unwrap_or(0),
            max_rating: user.max_rating.unwrap_or(0),
        }
    }
}

fn contest_from_dto(change: dto::RatingChange) -> Option<ContestResult> {
    let contest_time = from_unix(change.rating_update_time_seconds)?;
    Some(ContestResult {
        contest_id: change.contest_id,
        contest_name: change.contest_name,
        rank: change.rank,
        old_rating: change.old_rating,
        new_rating: change.new_rating,
        rating_change: change.new_rating - change.old_rating,
        participation_type: change
            .participation_type
            .unwrap_or_else(|| DEFAULT_PARTICIPATION_TYPE.to_string()),
        contest_time,
    })
}

fn submission_from_dto(submission: dto::Submission) -> Option<SubmissionResult> {
    let submission_time = from_unix(submission.creation_time_seconds)?;
    Some(SubmissionResult {
        submission_id: submission.id,
        contest_id: submission.contest_id.or(submission.problem.contest_id),
        problem_name: submission.problem.name,
        problem_rating: submission.problem.rating,
        verdict: submission
            .verdict
            .unwrap_or_else(|| PENDING_VERDICT.to_string()),
        programming_language: submission.programming_language,
        submission_time,
    })
}

#[async_trait]
impl CodeforcesClient for CodeforcesHttpClient {
    async fn fetch_profile(&self, handle: &str) -> Option<Profile> {
        match self.get_user(handle).await {
            Ok(user) => user.map(Profile::from),
            Err(e) => {
                warn!("Failed to fetch profile for {}: {}", handle, e);
                None
            }
        }
    }

    async fn fetch_rating_history(&self, handle: &str) -> Vec<ContestResult> {
        match self.get_rating(handle).await {
            Ok(changes) => changes.into_iter().filter_map(contest_from_dto).collect(),
            Err(e) => {
                warn!("Failed to fetch rating history for {}: {}", handle, e);
                Vec::new()
            }
        }
    }

    async fn fetch_submissions(&self, handle: &str, page: SubmissionPage) -> Vec<SubmissionResult> {
        match self.get_status(handle, page).await {
            Ok(submissions) => submissions.into_iter().filter_map(submission_from_dto).collect(),
            Err(e) => {
                warn!("Failed to fetch submissions for {}: {}", handle, e);
                Vec::new()
            }
        }
    }
}

pub struct NoopCodeforcesClient;

#[async_trait]
impl CodeforcesClient for NoopCodeforcesClient {
    async fn fetch_profile(&self, _handle: &str) -> Option<Profile> {
        None
    }

    async fn fetch_rating_history(&self, _handle: &str) -> Vec<ContestResult> {
        Vec::new()
    }

    async fn fetch_submissions(&self, _handle: &str, _page: SubmissionPage) -> Vec<SubmissionResult> {
        Vec::new()
    }
}
