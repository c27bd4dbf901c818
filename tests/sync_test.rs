mod common;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use common::{FakeCodeforces, HandleData, contest, now, profile, seed_student, setup_db, submission};
use progress_tracker::db::repository;
use progress_tracker::error::AppError;
use progress_tracker::services::SyncService;

fn alice_data(now: DateTime<Utc>) -> HandleData {
    let days_ago = |days| now - Duration::days(days);
    HandleData {
        profile: Some(profile("alice", 1500, 1620)),
        contests: vec![contest(1, 1400, 1500, days_ago(20)), contest(2, 1500, 1450, days_ago(10))],
        submissions: vec![
            submission(101, "A. Watermelon", Some(800), "OK", days_ago(3)),
            submission(102, "B. Queue", Some(1200), "WRONG_ANSWER", days_ago(2)),
        ],
    }
}

#[tokio::test]
async fn test_sync_writes_profile_contests_and_submissions() {
    let t = now();
    let db = setup_db().await;
    let student = seed_student(&db, "Alice", "alice", true).await;
    let codeforces = Arc::new(FakeCodeforces::new().with("alice", alice_data(t)));
    let service = SyncService::new(db.clone(), codeforces);

    let outcome = service.sync_student(&student.id, None).await.expect("sync failed");
    assert!(outcome.profile_updated);
    assert_eq!(outcome.contests_synced, 2);
    assert_eq!(outcome.submissions_synced, 2);
    assert_eq!(outcome.last_submission_date, Some(t - Duration::days(2)));

    let stored = repository::find_student_by_id(&db, &student.id).await.unwrap().unwrap();
    assert_eq!(stored.current_rating, 1500);
    assert_eq!(stored.max_rating, 1620);
    assert_eq!(stored.last_submission_date, Some(t - Duration::days(2)));

    let contests = repository::fetch_contests_for_student(&db, &student.id).await.unwrap();
    assert_eq!(contests.len(), 2);
    assert_eq!(contests[0].contest_id, 2);
    assert_eq!(contests[0].rating_change, -50);
}

#[tokio::test]
async fn test_sync_twice_does_not_duplicate_rows() {
    let t = now();
    let db = setup_db().await;
    let student = seed_student(&db, "Alice", "alice", true).await;
    let codeforces = Arc::new(FakeCodeforces::new().with("alice", alice_data(t)));
    let service = SyncService::new(db.clone(), codeforces);

    service.sync_student(&student.id, None).await.unwrap();
    service.sync_student(&student.id, None).await.unwrap();

    assert_eq!(repository::count_contests_for_student(&db, &student.id).await.unwrap(), 2);
    assert_eq!(repository::count_submissions_for_student(&db, &student.id).await.unwrap(), 2);
}

#[tokio::test]
async fn test_last_submission_date_never_moves_backwards() {
    let t = now();
    let db = setup_db().await;
    let student = seed_student(&db, "Alice", "alice", true).await;
    let codeforces = Arc::new(FakeCodeforces::new().with("alice", alice_data(t)));
    let service = SyncService::new(db.clone(), codeforces.clone());
    service.sync_student(&student.id, None).await.unwrap();

    // A later fetch that only returns an older page.
    codeforces.set(
        "alice",
        HandleData {
            profile: Some(profile("alice", 1500, 1620)),
            contests: Vec::new(),
            submissions: vec![submission(90, "C. Old", Some(1000), "OK", t - Duration::days(30))],
        },
    );
    let outcome = service.sync_student(&student.id, None).await.unwrap();
    assert_eq!(outcome.last_submission_date, Some(t - Duration::days(2)));

    let stored = repository::find_student_by_id(&db, &student.id).await.unwrap().unwrap();
    assert_eq!(stored.last_submission_date, Some(t - Duration::days(2)));
}

#[tokio::test]
async fn test_unknown_handle_leaves_student_untouched() {
    let db = setup_db().await;
    let student = seed_student(&db, "Ghost", "ghost", true).await;
    let service = SyncService::new(db.clone(), Arc::new(FakeCodeforces::new()));

    let before = repository::find_student_by_id(&db, &student.id).await.unwrap().unwrap();
    let outcome = service.sync_student(&student.id, None).await.unwrap();
    assert!(!outcome.profile_updated);
    assert_eq!(outcome.contests_synced, 0);
    assert_eq!(outcome.last_submission_date, None);

    let stored = repository::find_student_by_id(&db, &student.id).await.unwrap().unwrap();
    assert_eq!(stored.current_rating, 0);
    assert_eq!(stored.last_data_update, before.last_data_update);
}

#[tokio::test]
async fn test_sync_missing_student_is_not_found() {
    let db = setup_db().await;
    let service = SyncService::new(db, Arc::new(FakeCodeforces::new()));

    let err = service.sync_student("missing", None).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));
}

#[tokio::test]
async fn test_handle_override_is_used_for_fetching() {
    let t = now();
    let db = setup_db().await;
    let student = seed_student(&db, "Alice", "alice", true).await;
    let codeforces = Arc::new(FakeCodeforces::new().with("alice_new", alice_data(t)));
    let service = SyncService::new(db.clone(), codeforces);

    let outcome = service.sync_student(&student.id, Some("alice_new")).await.unwrap();
    assert_eq!(outcome.handle, "alice_new");
    assert!(outcome.profile_updated);
    assert_eq!(repository::count_submissions_for_student(&db, &student.id).await.unwrap(), 2);
}

#[tokio::test]
async fn test_failed_write_keeps_earlier_rows() {
    let t = now();
    let db = setup_db().await;
    let student = seed_student(&db, "Alice", "alice", true).await;
    let mut data = alice_data(t);
    data.submissions.push(submission(103, "", None, "OK", t - Duration::days(1)));
    let service = SyncService::new(db.clone(), Arc::new(FakeCodeforces::new().with("alice", data)));

    let err = service.sync_student(&student.id, None).await.unwrap_err();
    assert!(matches!(err, AppError::Database(_)));

    let stored = repository::find_student_by_id(&db, &student.id).await.unwrap().unwrap();
    assert_eq!(stored.current_rating, 1500);
    assert_eq!(repository::count_contests_for_student(&db, &student.id).await.unwrap(), 2);
    assert_eq!(repository::count_submissions_for_student(&db, &student.id).await.unwrap(), 2);
    assert_eq!(stored.last_submission_date, None);
}

#[tokio::test]
async fn test_shared_submission_moves_to_latest_owner() {
    let t = now();
    let db = setup_db().await;
    let alice = seed_student(&db, "Alice", "alice", true).await;
    let bob = seed_student(&db, "Bob", "bob", true).await;
    let codeforces = Arc::new(
        FakeCodeforces::new()
            .with("alice", alice_data(t))
            .with("bob", HandleData {
                submissions: vec![submission(101, "A. Watermelon", Some(800), "OK", t - Duration::days(3))],
                ..HandleData::default()
            }),
    );
    let service = SyncService::new(db.clone(), codeforces);

    service.sync_student(&alice.id, None).await.unwrap();
    service.sync_student(&bob.id, None).await.unwrap();

    let alice_rows = repository::fetch_submissions_for_student(&db, &alice.id).await.unwrap();
    assert_eq!(alice_rows.len(), 1);
    assert_eq!(alice_rows[0].submission_id, 102);

    let bob_rows = repository::fetch_submissions_for_student(&db, &bob.id).await.unwrap();
    assert_eq!(bob_rows.len(), 1);
    assert_eq!(bob_rows[0].submission_id, 101);
}
