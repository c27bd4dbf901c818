mod email;
mod students;
mod sync;

use std::sync::LazyLock;

use axum::routing::{get, post};
use axum::{Router, extract::State, http::StatusCode};
use regex::Regex;

use crate::error::AppError;
use crate::state::AppState;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/students", get(students::list_students).post(students::create_student))
        .route(
            "/students/{id}",
            get(students::get_student)
                .put(students::update_student)
                .delete(students::delete_student),
        )
        .route("/students/{id}/contests", get(students::list_contests))
        .route("/students/{id}/problems", get(students::problem_stats))
        .route("/students/{id}/send-reminder", post(students::send_reminder))
        .route("/sync/student", post(sync::sync_student))
        .route("/sync/all", post(sync::sync_all))
        .route("/sync/queue", get(sync::queue_stats))
        .route("/test-email", post(email::send_test_email))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Trims `value` and rejects it when missing or blank.
fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
