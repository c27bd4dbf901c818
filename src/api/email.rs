use axum::Json;
use axum::extract::State;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{is_valid_email, required};
use crate::error::AppError;
use crate::mailer::templates;
use crate::state::AppState;

#[derive(Deserialize)]
pub(super) struct TestEmailRequest {
    email: Option<String>,
}

#[derive(Serialize)]
pub(super) struct TestEmailResponse {
    message: &'static str,
    details: &'static str,
}

pub(super) async fn send_test_email(
    State(state): State<AppState>,
    Json(req): Json<TestEmailRequest>,
) -> Result<Json<TestEmailResponse>, AppError> {
    let email = required(req.email)
        .ok_or_else(|| AppError::BadRequest("Email is required".to_string()))?;
    if !is_valid_email(&email) {
        return Err(AppError::BadRequest("Invalid email format".to_string()));
    }

    state.mailer.send(templates::test_email(&email, Utc::now())).await?;
    Ok(Json(TestEmailResponse {
        message: "Test email sent successfully",
        details: "Check your inbox (and spam folder) for the test email.",
    }))
}
