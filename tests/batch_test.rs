mod common;

use std::sync::Arc;

use common::{
    FailingMailer, FakeCodeforces, HandleData, RecordingMailer, days_ago, profile, seed_student,
    setup_db, submission,
};
use progress_tracker::db::repository;
use progress_tracker::services::BatchSync;

fn active(handle: &str) -> HandleData {
    HandleData {
        profile: Some(profile(handle, 1400, 1400)),
        contests: Vec::new(),
        submissions: vec![submission(1, "A. Active", Some(800), "OK", days_ago(1))],
    }
}

fn idle(handle: &str) -> HandleData {
    HandleData {
        profile: Some(profile(handle, 1200, 1300)),
        contests: Vec::new(),
        submissions: vec![submission(2, "B. Idle", Some(900), "OK", days_ago(20))],
    }
}

#[tokio::test]
async fn test_batch_reminds_only_inactive_students() {
    let db = setup_db().await;
    seed_student(&db, "Alice", "alice", true).await;
    let bob = seed_student(&db, "Bob", "bob", true).await;
    let mailer = Arc::new(RecordingMailer::default());
    let codeforces = Arc::new(FakeCodeforces::new().with("alice", active("alice")).with("bob", idle("bob")));

    let outcome = BatchSync::new(db.clone(), codeforces, mailer.clone()).run().await.unwrap();
    assert_eq!(outcome.total_students, 2);
    assert_eq!(outcome.synced_count, 2);
    assert_eq!(outcome.emails_sent, 1);

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "bob@example.com");

    let bob = repository::find_student_by_id(&db, &bob.id).await.unwrap().unwrap();
    assert_eq!(bob.reminder_count, 1);
}

#[tokio::test]
async fn test_batch_skips_students_with_emails_disabled() {
    let db = setup_db().await;
    let carol = seed_student(&db, "Carol", "carol", false).await;
    let mailer = Arc::new(RecordingMailer::default());
    let codeforces = Arc::new(FakeCodeforces::new().with("carol", idle("carol")));

    let outcome = BatchSync::new(db.clone(), codeforces, mailer.clone()).run().await.unwrap();
    assert_eq!(outcome.synced_count, 1);
    assert_eq!(outcome.emails_sent, 0);
    assert!(mailer.sent().is_empty());

    let carol = repository::find_student_by_id(&db, &carol.id).await.unwrap().unwrap();
    assert_eq!(carol.reminder_count, 0);
}

#[tokio::test]
async fn test_one_failing_student_does_not_stop_the_batch() {
    let db = setup_db().await;
    seed_student(&db, "Alice", "alice", true).await;
    let broken = seed_student(&db, "Broken", "broken", true).await;
    seed_student(&db, "Bob", "bob", true).await;

    let mut bad = idle("broken");
    bad.submissions = vec![submission(3, "", None, "OK", days_ago(20))];
    let codeforces = Arc::new(
        FakeCodeforces::new()
            .with("alice", active("alice"))
            .with("broken", bad)
            .with("bob", idle("bob")),
    );
    let mailer = Arc::new(RecordingMailer::default());

    let outcome = BatchSync::new(db.clone(), codeforces, mailer.clone()).run().await.unwrap();
    assert_eq!(outcome.total_students, 3);
    assert_eq!(outcome.synced_count, 2);
    // Bob is idle, and Broken has no recorded submission after the failed sync.
    assert_eq!(outcome.emails_sent, 2);

    let broken = repository::find_student_by_id(&db, &broken.id).await.unwrap().unwrap();
    assert_eq!(broken.reminder_count, 1);
    assert!(mailer.sent().iter().any(|e| e.to == "broken@example.com"));
}

#[tokio::test]
async fn test_failed_sync_of_active_student_sends_no_reminder() {
    let db = setup_db().await;
    let alice = seed_student(&db, "Alice", "alice", true).await;
    let codeforces = Arc::new(FakeCodeforces::new().with("alice", active("alice")));
    let mailer = Arc::new(RecordingMailer::default());
    BatchSync::new(db.clone(), codeforces.clone(), mailer.clone()).run().await.unwrap();

    // The next sync fails, but the stored submission date is still recent.
    let mut bad = active("alice");
    bad.submissions.push(submission(9, "", None, "OK", days_ago(1)));
    codeforces.set("alice", bad);

    let outcome = BatchSync::new(db.clone(), codeforces, mailer.clone()).run().await.unwrap();
    assert_eq!(outcome.synced_count, 0);
    assert_eq!(outcome.emails_sent, 0);

    let alice = repository::find_student_by_id(&db, &alice.id).await.unwrap().unwrap();
    assert_eq!(alice.reminder_count, 0);
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn test_mail_failures_are_not_counted() {
    let db = setup_db().await;
    let bob = seed_student(&db, "Bob", "bob", true).await;
    let codeforces = Arc::new(FakeCodeforces::new().with("bob", idle("bob")));

    let outcome = BatchSync::new(db.clone(), codeforces, Arc::new(FailingMailer)).run().await.unwrap();
    assert_eq!(outcome.synced_count, 1);
    assert_eq!(outcome.emails_sent, 0);

    let bob = repository::find_student_by_id(&db, &bob.id).await.unwrap().unwrap();
    assert_eq!(bob.reminder_count, 0);
}

#[tokio::test]
async fn test_empty_roster() {
    let db = setup_db().await;
    let outcome = BatchSync::new(db, Arc::new(FakeCodeforces::new()), Arc::new(RecordingMailer::default()))
        .run()
        .await
        .unwrap();
    assert_eq!(outcome.total_students, 0);
    assert_eq!(outcome.synced_count, 0);
}
