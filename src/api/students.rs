use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::{is_valid_email, required};
use crate::db::repository;
use crate::error::AppError;
use crate::models::{Contest, NewStudent, NewStudentRequest, ProblemStats, Student, UpdateStudentRequest};
use crate::services::ReminderService;
use crate::services::analytics::{self, DEFAULT_WINDOW_DAYS};
use crate::state::AppState;

const DUPLICATE_STUDENT: &str = "Student with this email or Codeforces handle already exists";

#[derive(Deserialize)]
pub(super) struct ProblemsQueryParams {
    days: Option<u32>,
}

#[derive(Serialize)]
pub(super) struct MessageResponse {
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ReminderResponse {
    message: String,
    reminder_count: i64,
}

pub(super) async fn list_students(State(state): State<AppState>) -> Result<Json<Vec<Student>>, AppError> {
    let students = repository::fetch_students(&state.db).await?;
    Ok(Json(students))
}

pub(super) async fn create_student(
    State(state): State<AppState>,
    Json(req): Json<NewStudentRequest>,
) -> Result<Json<Student>, AppError> {
    let (Some(name), Some(email), Some(phone), Some(handle)) = (
        required(req.name),
        required(req.email),
        required(req.phone),
        required(req.handle),
    ) else {
        return Err(AppError::BadRequest("All fields are required".to_string()));
    };
    if !is_valid_email(&email) {
        return Err(AppError::BadRequest("Invalid email format".to_string()));
    }

    if repository::find_student_by_email_or_handle(&state.db, &email, &handle)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(DUPLICATE_STUDENT.to_string()));
    }

    let student = repository::insert_student(
        &state.db,
        NewStudent {
            name,
            email,
            phone,
            handle,
            emails_enabled: req.emails_enabled.unwrap_or(true),
        },
    )
    .await
    .map_err(|e| duplicate_student(e.into()))?;
    info!("Registered student {} ({})", student.name, student.handle);

    if let Err(e) = state.sync_queue.enqueue(&student.id, None) {
        error!("Initial sync for {} was not queued: {}", student.id, e);
    }

    Ok(Json(student))
}

pub(super) async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Student>, AppError> {
    let student = repository::find_student_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(student))
}

pub(super) async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut req): Json<UpdateStudentRequest>,
) -> Result<Json<Student>, AppError> {
    for (field, value) in [
        ("name", &mut req.name),
        ("email", &mut req.email),
        ("phone", &mut req.phone),
        ("handle", &mut req.handle),
    ] {
        if value.is_some() {
            *value = Some(
                required(value.take())
                    .ok_or_else(|| AppError::BadRequest(format!("{} must not be empty", field)))?,
            );
        }
    }
    if let Some(email) = &req.email {
        if !is_valid_email(email) {
            return Err(AppError::BadRequest("Invalid email format".to_string()));
        }
    }

    let existing = repository::find_student_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    let student = repository::update_student(&state.db, &id, req)
        .await
        .map_err(|e| duplicate_student(e.into()))?
        .ok_or(AppError::NotFound)?;

    if student.handle != existing.handle {
        info!("Handle for {} changed from {} to {}", id, existing.handle, student.handle);
        if let Err(e) = state.sync_queue.enqueue(&student.id, Some(&student.handle)) {
            error!("Sync after handle change for {} was not queued: {}", student.id, e);
        }
    }

    Ok(Json(student))
}

/// Names the student fields behind a unique violation.
fn duplicate_student(err: AppError) -> AppError {
    match err {
        AppError::Conflict(_) => AppError::Conflict(DUPLICATE_STUDENT.to_string()),
        other => other,
    }
}

pub(super) async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    if !repository::delete_student(&state.db, &id).await? {
        return Err(AppError::NotFound);
    }
    info!("Deleted student {}", id);
    Ok(Json(MessageResponse {
        message: "Student deleted successfully".to_string(),
    }))
}

pub(super) async fn list_contests(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Contest>>, AppError> {
    repository::find_student_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    let contests = repository::fetch_contests_for_student(&state.db, &id).await?;
    Ok(Json(contests))
}

pub(super) async fn problem_stats(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ProblemsQueryParams>,
) -> Result<Json<ProblemStats>, AppError> {
    let days = params.days.unwrap_or(DEFAULT_WINDOW_DAYS);
    if days == 0 {
        return Err(AppError::BadRequest("days must be at least 1".to_string()));
    }

    let now = Utc::now();
    let since = analytics::window_start(now, days)
        .ok_or_else(|| AppError::BadRequest("days is out of range".to_string()))?;

    repository::find_student_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    let submissions = repository::fetch_submissions_since(&state.db, &id, since).await?;
    Ok(Json(analytics::compute_stats(&submissions, days, now)))
}

pub(super) async fn send_reminder(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReminderResponse>, AppError> {
    let service = ReminderService::new(state.db.clone(), state.mailer.clone());
    let reminder_count = service.send_reminder(&id).await?;
    Ok(Json(ReminderResponse {
        message: "Reminder email sent successfully".to_string(),
        reminder_count,
    }))
}
