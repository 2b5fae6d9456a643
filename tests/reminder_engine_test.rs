mod common;

use chrono::{DateTime, Duration, Utc};
use jobastra_backend::services::email_service::EmailService;
use jobastra_backend::services::reminder_service::ReminderEngine;
use sqlx::PgPool;
use uuid::Uuid;

use common::{seed, setup_app, Fixture};

async fn insert_interview(
    pool: &PgPool,
    fixture: &Fixture,
    scheduled_at: DateTime<Utc>,
    status: &str,
) -> Uuid {
    sqlx::query_scalar(
        r#"
        INSERT INTO interviews
            (job_id, company_id, candidate_id, title, status, scheduled_at,
             meeting_id, meeting_password, join_url)
        VALUES ($1, $2, $3, 'Screening', $4, $5, '111222333', 'pw', 'https://zoom.us/j/111222333?pwd=pw')
        RETURNING id
        "#,
    )
    .bind(fixture.job_id)
    .bind(fixture.company_id)
    .bind(fixture.candidate_id)
    .bind(status)
    .bind(scheduled_at)
    .fetch_one(pool)
    .await
    .expect("seed interview")
}

async fn flag(pool: &PgPool, id: Uuid, column: &str) -> bool {
    sqlx::query_scalar(&format!("SELECT {column} FROM interviews WHERE id = $1"))
        .bind(id)
        .fetch_one(pool)
        .await
        .expect("flag")
}

#[tokio::test]
async fn urgent_sweep_flags_each_interview_once() {
    let Some((_app, pool)) = setup_app().await else {
        return;
    };
    let fixture = seed(&pool).await;
    let now = Utc::now() + Duration::days(400);
    let engine = ReminderEngine::new(pool.clone(), EmailService::disabled());

    let due = insert_interview(&pool, &fixture, now + Duration::minutes(45), "scheduled").await;
    let far = insert_interview(&pool, &fixture, now + Duration::hours(3), "scheduled").await;
    let cancelled =
        insert_interview(&pool, &fixture, now + Duration::minutes(30), "cancelled").await;

    let processed = engine.run_urgent_sweep(now).await.expect("sweep");
    assert!(processed >= 1);
    assert!(flag(&pool, due, "reminder_sent").await);
    assert!(!flag(&pool, far, "reminder_sent").await);
    assert!(!flag(&pool, cancelled, "reminder_sent").await);

    // Second run finds nothing new.
    let processed = engine.run_urgent_sweep(now).await.expect("sweep");
    assert_eq!(processed, 0);
}

#[tokio::test]
async fn advance_sweep_covers_the_day_ahead_window_once() {
    let Some((_app, pool)) = setup_app().await else {
        return;
    };
    let fixture = seed(&pool).await;
    let now = Utc::now() + Duration::days(500);
    let engine = ReminderEngine::new(pool.clone(), EmailService::disabled());

    let in_window =
        insert_interview(&pool, &fixture, now + Duration::minutes(23 * 60 + 30), "rescheduled")
            .await;
    let too_soon = insert_interview(&pool, &fixture, now + Duration::hours(20), "scheduled").await;
    let too_late = insert_interview(&pool, &fixture, now + Duration::hours(25), "scheduled").await;

    let processed = engine.run_advance_sweep(now).await.expect("sweep");
    assert!(processed >= 1);
    assert!(flag(&pool, in_window, "advance_reminder_sent").await);
    assert!(!flag(&pool, too_soon, "advance_reminder_sent").await);
    assert!(!flag(&pool, too_late, "advance_reminder_sent").await);

    let processed = engine.run_advance_sweep(now).await.expect("sweep");
    assert_eq!(processed, 0);

    // The urgent flag is independent of the advance one.
    assert!(!flag(&pool, in_window, "reminder_sent").await);
}

#[tokio::test]
async fn reconciliation_completes_stale_in_progress_interviews() {
    let Some((_app, pool)) = setup_app().await else {
        return;
    };
    let fixture = seed(&pool).await;
    let now = Utc::now() + Duration::days(600);
    let engine = ReminderEngine::new(pool.clone(), EmailService::disabled());

    let stale =
        insert_interview(&pool, &fixture, now - Duration::minutes(45), "in-progress").await;
    let fresh =
        insert_interview(&pool, &fixture, now - Duration::minutes(10), "in-progress").await;
    let scheduled =
        insert_interview(&pool, &fixture, now - Duration::hours(2), "scheduled").await;

    let completed = engine.reconcile_statuses(now).await.expect("reconcile");
    assert!(completed >= 1);

    let status: String = sqlx::query_scalar("SELECT status FROM interviews WHERE id = $1")
        .bind(stale)
        .fetch_one(&pool)
        .await
        .expect("status");
    assert_eq!(status, "completed");

    for untouched in [fresh, scheduled] {
        let status: String = sqlx::query_scalar("SELECT status FROM interviews WHERE id = $1")
            .bind(untouched)
            .fetch_one(&pool)
            .await
            .expect("status");
        assert_ne!(status, "completed");
    }
}
