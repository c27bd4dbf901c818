use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Contest {
    pub student_id: String,
    pub contest_id: i64,
    pub contest_name: String,
    pub rank: i64,
    pub old_rating: i64,
    pub new_rating: i64,
    pub rating_change: i64,
    pub participation_type: String,
    pub contest_time: DateTime<Utc>,
}
