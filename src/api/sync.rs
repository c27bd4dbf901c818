use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, header};
use serde::{Deserialize, Serialize};

use super::required;
use crate::error::AppError;
use crate::services::{BatchOutcome, BatchSync, QueueStats, SyncOutcome, SyncService};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SyncStudentRequest {
    student_id: Option<String>,
    handle: Option<String>,
}

#[derive(Serialize)]
pub(super) struct SyncStudentResponse {
    message: &'static str,
    #[serde(flatten)]
    outcome: SyncOutcome,
}

pub(super) async fn sync_student(
    State(state): State<AppState>,
    Json(req): Json<SyncStudentRequest>,
) -> Result<Json<SyncStudentResponse>, AppError> {
    let student_id = required(req.student_id)
        .ok_or_else(|| AppError::BadRequest("studentId is required".to_string()))?;
    let handle = required(req.handle);

    let service = SyncService::new(state.db.clone(), state.codeforces.clone());
    let outcome = service.sync_student(&student_id, handle.as_deref()).await?;
    Ok(Json(SyncStudentResponse {
        message: "Sync completed successfully",
        outcome,
    }))
}

pub(super) async fn sync_all(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<BatchOutcome>, AppError> {
    authorize(&state, &headers)?;

    let batch = BatchSync::new(state.db.clone(), state.codeforces.clone(), state.mailer.clone());
    let outcome = batch.run().await?;
    Ok(Json(outcome))
}

pub(super) async fn queue_stats(State(state): State<AppState>) -> Json<QueueStats> {
    Json(state.sync_queue.stats())
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(key) = &state.sync_api_key else {
        return Ok(());
    };
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    match presented {
        Some(token) if token == key.as_str() => Ok(()),
        _ => Err(AppError::Unauthorized),
    }
}
