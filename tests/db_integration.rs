//! Store-level integration tests for the submissions database layer.
//!
//! Exercises insert, the duplicate-window probe, paginated listing, and
//! status updates directly against PostgreSQL, without the HTTP layer.
//! Gated on `TEST_DATABASE_URL`; run single-threaded:
//!
//! ```bash
//! TEST_DATABASE_URL=postgres://... cargo test --test db_integration -- --test-threads=1
//! ```

mod common;

use chrono::{Duration, Utc};
use leadgate::submission::{FormType, NewSubmission, SubmissionStatus};
use uuid::Uuid;

macro_rules! require_db {
    () => {
        if !common::has_test_db() {
            eprintln!("Skipping: TEST_DATABASE_URL not set");
            return;
        }
    };
}

fn new_submission(email: &str, phone: &str) -> NewSubmission {
    NewSubmission {
        name: "Jane Doe".to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        message: "Interested in your product".to_string(),
        form_type: FormType::Hero,
    }
}

#[tokio::test]
async fn insert_assigns_id_timestamp_and_new_status() {
    require_db!();
    let db = common::setup_test_db().await;
    let stored = db
        .insert_submission(&new_submission("jane@x.com", "9876543210"))
        .await
        .unwrap();

    assert_ne!(stored.id, Uuid::nil());
    assert_eq!(stored.status, "new");
    assert_eq!(stored.form_type, "hero");
    assert!((Utc::now() - stored.submitted_at).num_seconds() < 10);
}

#[tokio::test]
async fn find_recent_matches_email_or_phone_inside_window() {
    require_db!();
    let db = common::setup_test_db().await;
    db.insert_submission(&new_submission("jane@x.com", "9876543210"))
        .await
        .unwrap();
    let window_start = Utc::now() - Duration::hours(1);

    let by_email = db
        .find_recent_by_contact("jane@x.com", "1111111111", window_start)
        .await
        .unwrap();
    assert!(by_email.is_some());

    let by_phone = db
        .find_recent_by_contact("other@x.com", "9876543210", window_start)
        .await
        .unwrap();
    assert!(by_phone.is_some());

    let neither = db
        .find_recent_by_contact("other@x.com", "1111111111", window_start)
        .await
        .unwrap();
    assert!(neither.is_none());
}

#[tokio::test]
async fn submissions_older_than_the_window_are_not_duplicates() {
    require_db!();
    let db = common::setup_test_db().await;
    let stored = db
        .insert_submission(&new_submission("jane@x.com", "9876543210"))
        .await
        .unwrap();
    common::backdate_submission(db.pool(), stored.id, 61).await;

    let window_start = Utc::now() - Duration::hours(1);
    let found = db
        .find_recent_by_contact("jane@x.com", "9876543210", window_start)
        .await
        .unwrap();
    assert!(found.is_none());

    // Nothing blocks an identical re-insert once the window has elapsed.
    db.insert_submission(&new_submission("jane@x.com", "9876543210"))
        .await
        .unwrap();
    let (_, total) = db.list_submissions(1, 10).await.unwrap();
    assert_eq!(total, 2);
}

#[tokio::test]
async fn list_orders_by_submitted_at_descending_with_totals() {
    require_db!();
    let db = common::setup_test_db().await;
    let mut ids = Vec::new();
    for (i, email) in ["a@x.com", "b@x.com", "c@x.com", "d@x.com", "e@x.com"]
        .iter()
        .enumerate()
    {
        let stored = db
            .insert_submission(&new_submission(email, &format!("900000000{i}")))
            .await
            .unwrap();
        ids.push(stored.id);
    }
    for (i, id) in ids.iter().enumerate() {
        // a oldest (50 min ago) ... e newest (10 min ago)
        common::backdate_submission(db.pool(), *id, 50 - (i as i64) * 10).await;
    }

    let (page1, total) = db.list_submissions(1, 2).await.unwrap();
    assert_eq!(total, 5);
    assert_eq!(page1.len(), 2);
    assert_eq!(page1[0].email, "e@x.com");
    assert_eq!(page1[1].email, "d@x.com");

    let (page3, total) = db.list_submissions(3, 2).await.unwrap();
    assert_eq!(total, 5);
    assert_eq!(page3.len(), 1);
    assert_eq!(page3[0].email, "a@x.com");

    // Out-of-range pages fail closed with an empty page.
    let (page9, total) = db.list_submissions(9, 2).await.unwrap();
    assert_eq!(total, 5);
    assert!(page9.is_empty());
}

#[tokio::test]
async fn update_status_mutates_only_the_status_field() {
    require_db!();
    let db = common::setup_test_db().await;
    let stored = db
        .insert_submission(&new_submission("jane@x.com", "9876543210"))
        .await
        .unwrap();

    let updated = db
        .update_status(stored.id, SubmissionStatus::Contacted)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, "contacted");
    assert_eq!(updated.id, stored.id);
    assert_eq!(updated.submitted_at, stored.submitted_at);
    assert_eq!(updated.email, stored.email);

    // Status transitions are unconstrained within the enumerated set.
    let back = db
        .update_status(stored.id, SubmissionStatus::New)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(back.status, "new");
}

#[tokio::test]
async fn update_status_on_unknown_id_returns_none() {
    require_db!();
    let db = common::setup_test_db().await;
    let missing = db
        .update_status(Uuid::new_v4(), SubmissionStatus::Contacted)
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn health_check_succeeds_against_live_database() {
    require_db!();
    let db = common::setup_test_db().await;
    assert!(db.health_check().await.is_ok());
}
