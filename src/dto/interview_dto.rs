use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::interview::{InterviewDetail, InterviewFeedback, InterviewStatus, InterviewType};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInterviewPayload {
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub scheduled_date: DateTime<Utc>,
    #[validate(range(min = 1, message = "Duration must be at least 1 minute"))]
    pub duration: Option<i32>,
    pub time_zone: Option<String>,
    pub interview_type: Option<InterviewType>,
    pub description: Option<String>,
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "Zoom meeting id is required"))]
    pub zoom_meeting_id: String,
    #[validate(length(min = 1, message = "Zoom password is required"))]
    pub zoom_password: String,
    pub zoom_join_url: Option<String>,
    pub zoom_start_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReschedulePayload {
    pub new_date: DateTime<Utc>,
    #[validate(length(min = 1, message = "Reason is required"))]
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CancelPayload {
    #[validate(length(min = 1, message = "Reason is required"))]
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusPayload {
    pub status: Option<InterviewStatus>,
    pub feedback: Option<InterviewFeedback>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewListQuery {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: Option<InterviewStatus>,
    pub job_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpcomingQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct InterviewEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub interview: InterviewDetail,
}

impl InterviewEnvelope {
    pub fn new(interview: InterviewDetail) -> Self {
        Self {
            success: true,
            message: None,
            interview,
        }
    }

    pub fn with_message(interview: InterviewDetail, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            interview,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InterviewListEnvelope {
    pub success: bool,
    pub count: usize,
    pub interviews: Vec<InterviewDetail>,
}

impl InterviewListEnvelope {
    pub fn new(interviews: Vec<InterviewDetail>) -> Self {
        Self {
            success: true,
            count: interviews.len(),
            interviews,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageEnvelope {
    pub success: bool,
    pub message: String,
}

impl MessageEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_payload_rejects_empty_required_fields() {
        let payload: ScheduleInterviewPayload = serde_json::from_value(serde_json::json!({
            "jobId": Uuid::new_v4(),
            "candidateId": Uuid::new_v4(),
            "title": "",
            "scheduledDate": "2025-03-01T10:00:00Z",
            "zoomMeetingId": "",
            "zoomPassword": "pw",
        }))
        .unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn schedule_payload_accepts_camel_case_body() {
        let payload: ScheduleInterviewPayload = serde_json::from_value(serde_json::json!({
            "jobId": Uuid::new_v4(),
            "candidateId": Uuid::new_v4(),
            "title": "Technical interview",
            "scheduledDate": "2025-03-01T10:00:00Z",
            "duration": 45,
            "interviewType": "technical",
            "zoomMeetingId": "987",
            "zoomPassword": "pw",
        }))
        .unwrap();
        assert!(payload.validate().is_ok());
        assert_eq!(payload.duration, Some(45));
        assert_eq!(payload.interview_type, Some(InterviewType::Technical));
    }

    #[test]
    fn status_query_parses_kebab_case_values() {
        let query: InterviewListQuery =
            serde_json::from_value(serde_json::json!({ "status": "in-progress" })).unwrap();
        assert_eq!(query.status, Some(InterviewStatus::InProgress));
    }
}
