use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tracing::{error, info};

use crate::error::Result;
use crate::models::interview::InterviewDetail;
use crate::services::email_service::{EmailService, ReminderKind};

const DETAIL_SELECT: &str = "SELECT i.*, \
        u.name AS candidate_name, u.email AS candidate_email, \
        j.title AS job_title, \
        c.name AS company_name, c.email AS company_email \
    FROM interviews i \
    JOIN users u ON u.id = i.candidate_id \
    JOIN jobs j ON j.id = i.job_id \
    JOIN companies c ON c.id = i.company_id";

/// Periodic sweeps over the interview table: urgent (1 hour) reminders,
/// day-ahead reminders, and flipping stale in-progress interviews to
/// completed. Every sweep takes `now` explicitly so tests can drive the
/// windows without a scheduler.
#[derive(Clone)]
pub struct ReminderEngine {
    pool: PgPool,
    mailer: EmailService,
}

impl ReminderEngine {
    pub fn new(pool: PgPool, mailer: EmailService) -> Self {
        Self { pool, mailer }
    }

    /// Interviews starting within the next hour that have not been
    /// reminded yet. The flag is set after the attempt whether or not the
    /// mail went out, so a broken mailer cannot make the sweep re-spam.
    pub async fn run_urgent_sweep(&self, now: DateTime<Utc>) -> Result<u64> {
        let due = sqlx::query_as::<_, InterviewDetail>(&format!(
            "{} WHERE i.status IN ('scheduled', 'rescheduled') \
                AND i.reminder_sent = FALSE \
                AND i.scheduled_at > $1 \
                AND i.scheduled_at <= $1 + interval '1 hour' \
              ORDER BY i.scheduled_at ASC",
            DETAIL_SELECT
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        let mut processed = 0;
        for detail in due {
            let id = detail.interview.id;
            if !self.mailer.send_reminder(&detail, ReminderKind::Imminent).await {
                error!(interview = %id, "urgent reminder not sent");
            }
            let flagged = sqlx::query(
                r#"UPDATE interviews SET reminder_sent = TRUE, updated_at = NOW() WHERE id = $1"#,
            )
            .bind(id)
            .execute(&self.pool)
            .await;
            if let Err(err) = flagged {
                error!(interview = %id, error = ?err, "failed to mark reminder as sent");
                continue;
            }
            processed += 1;
        }
        if processed > 0 {
            info!(count = processed, "urgent interview reminders processed");
        }
        Ok(processed)
    }

    /// Interviews starting 23 to 24 hours out, deduplicated with their own
    /// flag rather than resent on every run inside the window.
    pub async fn run_advance_sweep(&self, now: DateTime<Utc>) -> Result<u64> {
        let due = sqlx::query_as::<_, InterviewDetail>(&format!(
            "{} WHERE i.status IN ('scheduled', 'rescheduled') \
                AND i.advance_reminder_sent = FALSE \
                AND i.scheduled_at >= $1 + interval '23 hours' \
                AND i.scheduled_at <= $1 + interval '24 hours' \
              ORDER BY i.scheduled_at ASC",
            DETAIL_SELECT
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        let mut processed = 0;
        for detail in due {
            let id = detail.interview.id;
            if !self.mailer.send_reminder(&detail, ReminderKind::DayAhead).await {
                error!(interview = %id, "advance reminder not sent");
            }
            let flagged = sqlx::query(
                r#"UPDATE interviews SET advance_reminder_sent = TRUE, updated_at = NOW() WHERE id = $1"#,
            )
            .bind(id)
            .execute(&self.pool)
            .await;
            if let Err(err) = flagged {
                error!(interview = %id, error = ?err, "failed to mark advance reminder as sent");
                continue;
            }
            processed += 1;
        }
        if processed > 0 {
            info!(count = processed, "advance interview reminders processed");
        }
        Ok(processed)
    }

    /// In-progress interviews whose start is more than 30 minutes past are
    /// considered finished.
    pub async fn reconcile_statuses(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE interviews
            SET status = 'completed', updated_at = NOW()
            WHERE status = 'in-progress'
              AND scheduled_at < $1 - interval '30 minutes'
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;
        let completed = result.rows_affected();
        if completed > 0 {
            info!(count = completed, "stale in-progress interviews completed");
        }
        Ok(completed)
    }
}

/// Registers the reminder jobs on a cron scheduler. The returned handle
/// must be kept alive for the lifetime of the process.
pub async fn spawn_reminder_jobs(
    engine: ReminderEngine,
) -> std::result::Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    let sweeps = engine.clone();
    scheduler
        .add(Job::new_async("0 */15 * * * *", move |_id, _sched| {
            let engine = sweeps.clone();
            Box::pin(async move {
                let now = Utc::now();
                if let Err(err) = engine.run_urgent_sweep(now).await {
                    error!(error = ?err, "urgent reminder sweep failed");
                }
                if let Err(err) = engine.run_advance_sweep(now).await {
                    error!(error = ?err, "advance reminder sweep failed");
                }
            })
        })?)
        .await?;

    let hourly = engine.clone();
    scheduler
        .add(Job::new_async("0 0 * * * *", move |_id, _sched| {
            let engine = hourly.clone();
            Box::pin(async move {
                if let Err(err) = engine.reconcile_statuses(Utc::now()).await {
                    error!(error = ?err, "hourly status reconciliation failed");
                }
            })
        })?)
        .await?;

    let daily = engine;
    scheduler
        .add(Job::new_async("0 0 0 * * *", move |_id, _sched| {
            let engine = daily.clone();
            Box::pin(async move {
                if let Err(err) = engine.reconcile_statuses(Utc::now()).await {
                    error!(error = ?err, "daily status reconciliation failed");
                }
            })
        })?)
        .await?;

    scheduler.start().await?;
    Ok(scheduler)
}
