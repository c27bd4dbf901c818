use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Verdict string the judge reports for an accepted submission.
pub const VERDICT_ACCEPTED: &str = "OK";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub submission_id: i64,
    pub student_id: String,
    pub contest_id: Option<i64>,
    pub problem_name: String,
    pub problem_rating: Option<i64>,
    pub verdict: String,
    pub programming_language: String,
    pub submission_time: DateTime<Utc>,
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        self.verdict == VERDICT_ACCEPTED
    }
}
