use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub handle: String,
    pub current_rating: i64,
    pub max_rating: i64,
    pub last_data_update: DateTime<Utc>,
    pub last_submission_date: Option<DateTime<Utc>>,
    pub reminder_count: i64,
    pub emails_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /students`. Every field is optional at the serde level so
/// that missing fields surface as a 400 from validation rather than a 422
/// from the JSON extractor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudentRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(alias = "codeforcesHandle")]
    pub handle: Option<String>,
    pub emails_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(alias = "codeforcesHandle")]
    pub handle: Option<String>,
    pub emails_enabled: Option<bool>,
}

/// Validated registration data, ready for insertion.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub handle: String,
    pub emails_enabled: bool,
}
