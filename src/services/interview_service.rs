use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::interview_dto::{
    InterviewListQuery, ReschedulePayload, ScheduleInterviewPayload, UpdateStatusPayload,
};
use crate::error::{Error, Result};
use crate::middleware::auth::AuthParty;
use crate::models::interview::{Interview, InterviewDetail, RescheduleEntry};
use crate::models::job::Job;
use crate::services::account_service::AccountService;
use crate::services::email_service::{EmailService, InterviewEvent};

const DEFAULT_UPCOMING_LIMIT: i64 = 5;

/// Interview rows joined with the display names the frontend needs.
fn detail_select(tail: &str) -> String {
    format!(
        "SELECT i.*, \
                u.name AS candidate_name, u.email AS candidate_email, \
                j.title AS job_title, \
                c.name AS company_name, c.email AS company_email \
         FROM interviews i \
         JOIN users u ON u.id = i.candidate_id \
         JOIN jobs j ON j.id = i.job_id \
         JOIN companies c ON c.id = i.company_id \
         {}",
        tail
    )
}

/// Zoom join link derived from the meeting credentials when the recruiter
/// does not pass one explicitly.
pub fn default_join_url(meeting_id: &str, password: &str) -> String {
    format!("https://zoom.us/j/{}?pwd={}", meeting_id, password)
}

/// Appends a note line, keeping earlier notes intact.
pub fn append_note(existing: Option<&str>, note: &str) -> String {
    match existing {
        Some(current) if !current.is_empty() => format!("{}\n{}", current, note),
        _ => note.to_string(),
    }
}

#[derive(Clone)]
pub struct InterviewService {
    pool: PgPool,
    accounts: AccountService,
    mailer: EmailService,
}

impl InterviewService {
    pub fn new(pool: PgPool, accounts: AccountService, mailer: EmailService) -> Self {
        Self {
            pool,
            accounts,
            mailer,
        }
    }

    /// Conflict check for one participant (candidate or company) at an
    /// exact start instant. Deliberately not interval overlap: interviews
    /// collide only when they share the identical start timestamp, matching
    /// the portal's original booking rule.
    pub async fn has_conflict(
        &self,
        participant_id: Uuid,
        start: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"SELECT EXISTS(
                   SELECT 1 FROM interviews
                   WHERE (candidate_id = $1 OR company_id = $1)
                     AND scheduled_at = $2
                     AND status IN ('scheduled', 'rescheduled')
                     AND ($3::uuid IS NULL OR id <> $3)
               )"#,
        )
        .bind(participant_id)
        .bind(start)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Interview> {
        sqlx::query_as::<_, Interview>(r#"SELECT * FROM interviews WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Interview not found".to_string()))
    }

    pub async fn get_detail(&self, id: Uuid) -> Result<InterviewDetail> {
        sqlx::query_as::<_, InterviewDetail>(&detail_select("WHERE i.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Interview not found".to_string()))
    }

    pub async fn schedule(
        &self,
        company_id: Uuid,
        payload: ScheduleInterviewPayload,
    ) -> Result<InterviewDetail> {
        self.accounts
            .get_company(company_id)
            .await?
            .ok_or_else(|| Error::NotFound("Company account not found".to_string()))?;
        self.accounts
            .get_candidate(payload.candidate_id)
            .await?
            .ok_or_else(|| Error::NotFound("Candidate not found".to_string()))?;

        sqlx::query_as::<_, Job>(r#"SELECT * FROM jobs WHERE id = $1 AND company_id = $2"#)
            .bind(payload.job_id)
            .bind(company_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Job not found for this company".to_string()))?;

        if self
            .has_conflict(payload.candidate_id, payload.scheduled_date, None)
            .await?
        {
            return Err(Error::Conflict(
                "The candidate already has an interview scheduled at this time".to_string(),
            ));
        }
        if self
            .has_conflict(company_id, payload.scheduled_date, None)
            .await?
        {
            return Err(Error::Conflict(
                "You already have an interview scheduled at this time".to_string(),
            ));
        }

        let join_url = payload
            .zoom_join_url
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| default_join_url(&payload.zoom_meeting_id, &payload.zoom_password));
        let interview_type = payload
            .interview_type
            .map(|t| t.as_str())
            .unwrap_or("technical");

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO interviews (
                job_id, company_id, candidate_id, title, description, notes,
                interview_type, status, scheduled_at, duration_minutes, time_zone,
                meeting_id, meeting_password, join_url, start_url
            ) VALUES (
                $1, $2, $3, $4, $5, $6,
                $7, 'scheduled', $8, $9, $10,
                $11, $12, $13, $14
            )
            RETURNING id
            "#,
        )
        .bind(payload.job_id)
        .bind(company_id)
        .bind(payload.candidate_id)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(&payload.notes)
        .bind(interview_type)
        .bind(payload.scheduled_date)
        .bind(payload.duration.unwrap_or(60))
        .bind(payload.time_zone.as_deref().unwrap_or("UTC"))
        .bind(&payload.zoom_meeting_id)
        .bind(&payload.zoom_password)
        .bind(&join_url)
        .bind(&payload.zoom_start_url)
        .fetch_one(&self.pool)
        .await?;

        let mut detail = self.get_detail(id).await?;
        self.dispatch_event(&mut detail, InterviewEvent::Scheduled)
            .await;
        Ok(detail)
    }

    pub async fn reschedule(
        &self,
        id: Uuid,
        party: AuthParty,
        payload: ReschedulePayload,
    ) -> Result<InterviewDetail> {
        let interview = self.get_by_id(id).await?;
        self.authorize_party(&interview, party)?;

        if self
            .has_conflict(interview.candidate_id, payload.new_date, Some(id))
            .await?
        {
            return Err(Error::Conflict(
                "The candidate already has an interview scheduled at this time".to_string(),
            ));
        }
        if self
            .has_conflict(interview.company_id, payload.new_date, Some(id))
            .await?
        {
            return Err(Error::Conflict(
                "The recruiter already has an interview scheduled at this time".to_string(),
            ));
        }

        let entry = RescheduleEntry {
            previous_date: interview.scheduled_at,
            new_date: payload.new_date,
            reason: payload.reason,
            changed_by: party.id(),
            changed_by_role: party.role().to_string(),
            changed_at: Utc::now(),
        };

        // Append-only: history rows are only ever concatenated, never
        // rewritten.
        sqlx::query(
            r#"
            UPDATE interviews
            SET scheduled_at = $2,
                status = 'rescheduled',
                reschedule_history = reschedule_history || $3::jsonb,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(payload.new_date)
        .bind(Json(&entry))
        .execute(&self.pool)
        .await?;

        let mut detail = self.get_detail(id).await?;
        self.dispatch_event(&mut detail, InterviewEvent::Rescheduled)
            .await;
        Ok(detail)
    }

    pub async fn cancel(&self, id: Uuid, party: AuthParty, reason: &str) -> Result<Interview> {
        let interview = self.get_by_id(id).await?;
        self.authorize_party(&interview, party)?;

        let notes = append_note(
            interview.notes.as_deref(),
            &format!("Cancellation reason: {}", reason),
        );
        let cancelled = sqlx::query_as::<_, Interview>(
            r#"
            UPDATE interviews
            SET status = 'cancelled', notes = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(cancelled)
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        company_id: Uuid,
        payload: UpdateStatusPayload,
    ) -> Result<InterviewDetail> {
        if let Some(feedback) = &payload.feedback {
            if let Some(rating) = feedback.rating {
                if !(1..=5).contains(&rating) {
                    return Err(Error::BadRequest(
                        "Feedback rating must be between 1 and 5".to_string(),
                    ));
                }
            }
        }

        sqlx::query_as::<_, Interview>(
            r#"SELECT * FROM interviews WHERE id = $1 AND company_id = $2"#,
        )
        .bind(id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Interview not found".to_string()))?;

        sqlx::query(
            r#"
            UPDATE interviews
            SET status = COALESCE($2, status),
                feedback = COALESCE($3, feedback),
                notes = COALESCE($4, notes),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(payload.status.map(|s| s.as_str()))
        .bind(payload.feedback.map(Json))
        .bind(payload.notes)
        .execute(&self.pool)
        .await?;

        self.get_detail(id).await
    }

    pub async fn delete(&self, id: Uuid, company_id: Uuid) -> Result<()> {
        let interview = self.get_by_id(id).await?;
        if interview.company_id != company_id {
            return Err(Error::Forbidden(
                "Only the recruiter who owns this interview can delete it".to_string(),
            ));
        }
        if interview.status != "cancelled" {
            return Err(Error::InvalidState(
                "Only cancelled interviews can be deleted".to_string(),
            ));
        }

        sqlx::query(r#"DELETE FROM interviews WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn list_for_candidate(
        &self,
        candidate_id: Uuid,
        query: InterviewListQuery,
    ) -> Result<Vec<InterviewDetail>> {
        let interviews = sqlx::query_as::<_, InterviewDetail>(&detail_select(
            "WHERE i.candidate_id = $1 \
               AND ($2::timestamptz IS NULL OR i.scheduled_at >= $2) \
               AND ($3::timestamptz IS NULL OR i.scheduled_at <= $3) \
               AND ($4::text IS NULL OR i.status = $4) \
             ORDER BY i.scheduled_at ASC",
        ))
        .bind(candidate_id)
        .bind(query.start_date)
        .bind(query.end_date)
        .bind(query.status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;
        Ok(interviews)
    }

    pub async fn list_for_recruiter(
        &self,
        company_id: Uuid,
        query: InterviewListQuery,
    ) -> Result<Vec<InterviewDetail>> {
        let interviews = sqlx::query_as::<_, InterviewDetail>(&detail_select(
            "WHERE i.company_id = $1 \
               AND ($2::timestamptz IS NULL OR i.scheduled_at >= $2) \
               AND ($3::timestamptz IS NULL OR i.scheduled_at <= $3) \
               AND ($4::text IS NULL OR i.status = $4) \
               AND ($5::uuid IS NULL OR i.job_id = $5) \
             ORDER BY i.scheduled_at ASC",
        ))
        .bind(company_id)
        .bind(query.start_date)
        .bind(query.end_date)
        .bind(query.status.map(|s| s.as_str()))
        .bind(query.job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(interviews)
    }

    pub async fn list_upcoming(
        &self,
        party: AuthParty,
        limit: Option<i64>,
    ) -> Result<Vec<InterviewDetail>> {
        let limit = limit.unwrap_or(DEFAULT_UPCOMING_LIMIT).clamp(1, 50);
        let interviews = sqlx::query_as::<_, InterviewDetail>(&detail_select(
            "WHERE (i.candidate_id = $1 OR i.company_id = $1) \
               AND i.scheduled_at >= NOW() \
               AND i.status IN ('scheduled', 'rescheduled') \
             ORDER BY i.scheduled_at ASC \
             LIMIT $2",
        ))
        .bind(party.id())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(interviews)
    }

    fn authorize_party(&self, interview: &Interview, party: AuthParty) -> Result<()> {
        let is_party = match party {
            AuthParty::Candidate(id) => interview.candidate_id == id,
            AuthParty::Recruiter(id) => interview.company_id == id,
        };
        if is_party {
            Ok(())
        } else {
            Err(Error::Forbidden(
                "You are not a participant in this interview".to_string(),
            ))
        }
    }

    /// Email failures never fail the mutation; the flag is simply left
    /// false and the problem is logged.
    async fn dispatch_event(&self, detail: &mut InterviewDetail, event: InterviewEvent) {
        if self.mailer.send_event(detail, event).await {
            let updated = sqlx::query(
                r#"UPDATE interviews SET email_sent = TRUE, updated_at = NOW() WHERE id = $1"#,
            )
            .bind(detail.interview.id)
            .execute(&self.pool)
            .await;
            match updated {
                Ok(_) => detail.interview.email_sent = true,
                Err(err) => {
                    tracing::error!(interview = %detail.interview.id, error = ?err, "failed to record email_sent flag")
                }
            }
        } else {
            tracing::warn!(interview = %detail.interview.id, "interview email not sent");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_is_derived_from_meeting_credentials() {
        assert_eq!(
            default_join_url("123456789", "s3cret"),
            "https://zoom.us/j/123456789?pwd=s3cret"
        );
    }

    #[test]
    fn append_note_preserves_existing_notes() {
        assert_eq!(append_note(None, "Cancellation reason: sick"), "Cancellation reason: sick");
        assert_eq!(append_note(Some(""), "a"), "a");
        assert_eq!(
            append_note(Some("bring laptop"), "Cancellation reason: position filled"),
            "bring laptop\nCancellation reason: position filled"
        );
    }
}
