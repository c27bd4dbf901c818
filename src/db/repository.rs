use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{Contest, NewStudent, Student, Submission, UpdateStudentRequest};

const STUDENT_COLUMNS: &str = "id, name, email, phone, handle, current_rating, max_rating, \
    last_data_update, last_submission_date, reminder_count, emails_enabled, created_at, updated_at";

const CONTEST_COLUMNS: &str = "student_id, contest_id, contest_name, rank, old_rating, new_rating, \
    rating_change, participation_type, contest_time";

const SUBMISSION_COLUMNS: &str = "submission_id, student_id, contest_id, problem_name, problem_rating, \
    verdict, programming_language, submission_time";

pub async fn fetch_students(db: &SqlitePool) -> Result<Vec<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "SELECT {STUDENT_COLUMNS} FROM students ORDER BY created_at DESC"
    ))
    .fetch_all(db)
    .await
}

pub async fn find_student_by_id(db: &SqlitePool, id: &str) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_student_by_email_or_handle(
    db: &SqlitePool,
    email: &str,
    handle: &str,
) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "SELECT {STUDENT_COLUMNS} FROM students WHERE email = ?1 OR handle = ?2 LIMIT 1"
    ))
    .bind(email)
    .bind(handle)
    .fetch_optional(db)
    .await
}

pub async fn insert_student(db: &SqlitePool, new: NewStudent) -> Result<Student, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO students
            (id, name, email, phone, handle, current_rating, max_rating,
            last_data_update, last_submission_date, reminder_count, emails_enabled,
            created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, 0, 0, ?6, NULL, 0, ?7, ?6, ?6)
        "#,
    )
    .bind(&id)
    .bind(&new.name)
    .bind(&new.email)
    .bind(&new.phone)
    .bind(&new.handle)
    .bind(now)
    .bind(new.emails_enabled)
    .execute(db)
    .await?;

    Ok(Student {
        id,
        name: new.name,
        email: new.email,
        phone: new.phone,
        handle: new.handle,
        current_rating: 0,
        max_rating: 0,
        last_data_update: now,
        last_submission_date: None,
        reminder_count: 0,
        emails_enabled: new.emails_enabled,
        created_at: now,
        updated_at: now,
    })
}

/// Applies the fields present in `req` and returns the stored result, or
/// `None` when the student does not exist.
pub async fn update_student(
    db: &SqlitePool,
    id: &str,
    req: UpdateStudentRequest,
) -> Result<Option<Student>, sqlx::Error> {
    let mut current = match find_student_by_id(db, id).await? {
        Some(s) => s,
        None => return Ok(None),
    };

    if let Some(name) = req.name {
        current.name = name;
    }
    if let Some(email) = req.email {
        current.email = email;
    }
    if let Some(phone) = req.phone {
        current.phone = phone;
    }
    if let Some(handle) = req.handle {
        current.handle = handle;
    }
    if let Some(emails_enabled) = req.emails_enabled {
        current.emails_enabled = emails_enabled;
    }
    current.updated_at = Utc::now();

    sqlx::query(
        r#"
        UPDATE students
        SET name = ?1,
            email = ?2,
            phone = ?3,
            handle = ?4,
            emails_enabled = ?5,
            updated_at = ?6
        WHERE id = ?7
        "#,
    )
    .bind(&current.name)
    .bind(&current.email)
    .bind(&current.phone)
    .bind(&current.handle)
    .bind(current.emails_enabled)
    .bind(current.updated_at)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

/// Contest and submission rows go with the student (`ON DELETE CASCADE`).
pub async fn delete_student(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM students WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn update_student_ratings(
    db: &SqlitePool,
    id: &str,
    current_rating: i64,
    max_rating: i64,
    updated_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE students SET current_rating = ?1, max_rating = ?2, last_data_update = ?3 WHERE id = ?4",
    )
    .bind(current_rating)
    .bind(max_rating)
    .bind(updated_at)
    .bind(id)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}

pub async fn set_last_submission_date(
    db: &SqlitePool,
    id: &str,
    last_submission_date: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE students SET last_submission_date = ?1 WHERE id = ?2")
        .bind(last_submission_date)
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

/// Atomically bumps the reminder counter, returning the new value.
pub async fn increment_reminder_count(db: &SqlitePool, id: &str) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "UPDATE students SET reminder_count = reminder_count + 1 WHERE id = ? RETURNING reminder_count",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn upsert_contest(db: &SqlitePool, contest: &Contest) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO contests
            (student_id, contest_id, contest_name, rank, old_rating, new_rating,
            rating_change, participation_type, contest_time)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT (student_id, contest_id) DO UPDATE SET
            contest_name = excluded.contest_name,
            rank = excluded.rank,
            old_rating = excluded.old_rating,
            new_rating = excluded.new_rating,
            rating_change = excluded.rating_change,
            participation_type = excluded.participation_type,
            contest_time = excluded.contest_time
        "#,
    )
    .bind(&contest.student_id)
    .bind(contest.contest_id)
    .bind(&contest.contest_name)
    .bind(contest.rank)
    .bind(contest.old_rating)
    .bind(contest.new_rating)
    .bind(contest.rating_change)
    .bind(&contest.participation_type)
    .bind(contest.contest_time)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn fetch_contests_for_student(
    db: &SqlitePool,
    student_id: &str,
) -> Result<Vec<Contest>, sqlx::Error> {
    sqlx::query_as::<_, Contest>(&format!(
        "SELECT {CONTEST_COLUMNS} FROM contests WHERE student_id = ? ORDER BY contest_time DESC"
    ))
    .bind(student_id)
    .fetch_all(db)
    .await
}

pub async fn count_contests_for_student(db: &SqlitePool, student_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM contests WHERE student_id = ?")
        .bind(student_id)
        .fetch_one(db)
        .await
}

/// Keyed on the global submission id; `student_id` is overwritten along with
/// every other column.
pub async fn upsert_submission(db: &SqlitePool, submission: &Submission) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO submissions
            (submission_id, student_id, contest_id, problem_name, problem_rating,
            verdict, programming_language, submission_time)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ON CONFLICT (submission_id) DO UPDATE SET
            student_id = excluded.student_id,
            contest_id = excluded.contest_id,
            problem_name = excluded.problem_name,
            problem_rating = excluded.problem_rating,
            verdict = excluded.verdict,
            programming_language = excluded.programming_language,
            submission_time = excluded.submission_time
        "#,
    )
    .bind(submission.submission_id)
    .bind(&submission.student_id)
    .bind(submission.contest_id)
    .bind(&submission.problem_name)
    .bind(submission.problem_rating)
    .bind(&submission.verdict)
    .bind(&submission.programming_language)
    .bind(submission.submission_time)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn fetch_submissions_for_student(
    db: &SqlitePool,
    student_id: &str,
) -> Result<Vec<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE student_id = ? ORDER BY submission_time DESC"
    ))
    .bind(student_id)
    .fetch_all(db)
    .await
}

/// Submissions at or after `since`, newest first.
///
/// Times are stored as whole-second RFC 3339 strings in UTC, so the string
/// comparison orders them chronologically.
pub async fn fetch_submissions_since(
    db: &SqlitePool,
    student_id: &str,
    since: DateTime<Utc>,
) -> Result<Vec<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {SUBMISSION_COLUMNS} FROM submissions \
         WHERE student_id = ?1 AND submission_time >= ?2 \
         ORDER BY submission_time DESC"
    ))
    .bind(student_id)
    .bind(since)
    .fetch_all(db)
    .await
}

pub async fn count_submissions_for_student(
    db: &SqlitePool,
    student_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM submissions WHERE student_id = ?")
        .bind(student_id)
        .fetch_one(db)
        .await
}
