use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Statuses that participate in conflict checks and reminder sweeps.
pub const ACTIVE_STATUSES: [&str; 2] = ["scheduled", "rescheduled"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterviewStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
    Rescheduled,
    NoShow,
}

impl InterviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewStatus::Scheduled => "scheduled",
            InterviewStatus::InProgress => "in-progress",
            InterviewStatus::Completed => "completed",
            InterviewStatus::Cancelled => "cancelled",
            InterviewStatus::Rescheduled => "rescheduled",
            InterviewStatus::NoShow => "no-show",
        }
    }
}

impl std::str::FromStr for InterviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(InterviewStatus::Scheduled),
            "in-progress" => Ok(InterviewStatus::InProgress),
            "completed" => Ok(InterviewStatus::Completed),
            "cancelled" => Ok(InterviewStatus::Cancelled),
            "rescheduled" => Ok(InterviewStatus::Rescheduled),
            "no-show" => Ok(InterviewStatus::NoShow),
            other => Err(format!("Unknown interview status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewType {
    Technical,
    Hr,
    Behavioral,
    Final,
    Screening,
}

impl InterviewType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewType::Technical => "technical",
            InterviewType::Hr => "hr",
            InterviewType::Behavioral => "behavioral",
            InterviewType::Final => "final",
            InterviewType::Screening => "screening",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleEntry {
    pub previous_date: DateTime<Utc>,
    pub new_date: DateTime<Utc>,
    pub reason: String,
    pub changed_by: Uuid,
    pub changed_by_role: String,
    pub changed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewFeedback {
    pub rating: Option<i32>,
    pub comments: Option<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Interview {
    pub id: Uuid,
    pub job_id: Uuid,
    pub company_id: Uuid,
    pub candidate_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub interview_type: String,
    pub status: String,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub time_zone: String,
    pub meeting_id: String,
    pub meeting_password: String,
    pub join_url: String,
    pub start_url: Option<String>,
    pub feedback: Option<Json<InterviewFeedback>>,
    pub reschedule_history: Json<Vec<RescheduleEntry>>,
    pub attachments: JsonValue,
    pub reminder_sent: bool,
    pub advance_reminder_sent: bool,
    pub email_sent: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Interview {
    /// End time is always derived from the start and duration, never stored.
    pub fn end_at(&self) -> DateTime<Utc> {
        self.scheduled_at + Duration::minutes(self.duration_minutes as i64)
    }

    pub fn is_active(&self) -> bool {
        ACTIVE_STATUSES.contains(&self.status.as_str())
    }
}

/// Interview row joined with candidate, job and company names for display.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InterviewDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub interview: Interview,
    pub candidate_name: String,
    pub candidate_email: String,
    pub job_title: String,
    pub company_name: String,
    pub company_email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(status: &str) -> Interview {
        Interview {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            candidate_id: Uuid::new_v4(),
            title: "Technical interview".into(),
            description: None,
            notes: None,
            interview_type: "technical".into(),
            status: status.into(),
            scheduled_at: Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap(),
            duration_minutes: 60,
            time_zone: "UTC".into(),
            meeting_id: "123456789".into(),
            meeting_password: "secret".into(),
            join_url: "https://zoom.us/j/123456789?pwd=secret".into(),
            start_url: None,
            feedback: None,
            reschedule_history: Json(Vec::new()),
            attachments: serde_json::json!([]),
            reminder_sent: false,
            advance_reminder_sent: false,
            email_sent: false,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn end_is_start_plus_duration() {
        let interview = sample("scheduled");
        assert_eq!(
            interview.end_at(),
            Utc.with_ymd_and_hms(2025, 3, 1, 11, 0, 0).unwrap()
        );
    }

    #[test]
    fn only_scheduled_and_rescheduled_are_active() {
        assert!(sample("scheduled").is_active());
        assert!(sample("rescheduled").is_active());
        assert!(!sample("cancelled").is_active());
        assert!(!sample("completed").is_active());
        assert!(!sample("no-show").is_active());
        assert!(!sample("in-progress").is_active());
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            InterviewStatus::Scheduled,
            InterviewStatus::InProgress,
            InterviewStatus::Completed,
            InterviewStatus::Cancelled,
            InterviewStatus::Rescheduled,
            InterviewStatus::NoShow,
        ] {
            assert_eq!(status.as_str().parse::<InterviewStatus>(), Ok(status));
        }
        assert!("unknown".parse::<InterviewStatus>().is_err());
    }
}
