use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::Config;
use crate::models::interview::InterviewDetail;
use crate::utils::calendar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterviewEvent {
    Scheduled,
    Rescheduled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderKind {
    Imminent,
    DayAhead,
}

/// Outbound email capability. Carries an explicit unconfigured state: when
/// SMTP settings are absent every send is a logged no-op returning `false`,
/// and callers treat the mail as simply not sent.
#[derive(Clone)]
pub struct EmailService {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Option<Mailbox>,
}

impl EmailService {
    pub fn from_config(config: &Config) -> Self {
        let (Some(host), Some(from_raw)) = (&config.smtp_host, &config.email_from) else {
            tracing::warn!("SMTP not configured; interview emails are disabled");
            return Self::disabled();
        };

        let from = match from_raw.parse::<Mailbox>() {
            Ok(mailbox) => mailbox,
            Err(err) => {
                tracing::warn!(error = %err, "Invalid EMAIL_FROM; interview emails are disabled");
                return Self::disabled();
            }
        };

        let mut builder = match AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host) {
            Ok(builder) => builder.port(config.smtp_port),
            Err(err) => {
                tracing::warn!(error = %err, "Invalid SMTP host; interview emails are disabled");
                return Self::disabled();
            }
        };
        if let (Some(user), Some(pass)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Self {
            transport: Some(builder.build()),
            from: Some(from),
        }
    }

    pub fn disabled() -> Self {
        Self {
            transport: None,
            from: None,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.transport.is_some()
    }

    /// Sends the schedule/reschedule email with the calendar attachment.
    /// Returns whether the mail went out; failures are logged, never raised.
    pub async fn send_event(&self, detail: &InterviewDetail, event: InterviewEvent) -> bool {
        let (Some(transport), Some(from)) = (&self.transport, &self.from) else {
            tracing::debug!(interview = %detail.interview.id, "mailer disabled, skipping event email");
            return false;
        };

        let message = match build_event_message(from, detail, event) {
            Ok(message) => message,
            Err(err) => {
                tracing::error!(interview = %detail.interview.id, error = %err, "failed to compose interview email");
                return false;
            }
        };

        match transport.send(message).await {
            Ok(_) => true,
            Err(err) => {
                tracing::error!(interview = %detail.interview.id, error = %err, "failed to send interview email");
                false
            }
        }
    }

    /// Sends a reminder to the candidate with the recruiter in cc.
    pub async fn send_reminder(&self, detail: &InterviewDetail, kind: ReminderKind) -> bool {
        let (Some(transport), Some(from)) = (&self.transport, &self.from) else {
            tracing::debug!(interview = %detail.interview.id, "mailer disabled, skipping reminder");
            return false;
        };

        let message = match build_reminder_message(from, detail, kind) {
            Ok(message) => message,
            Err(err) => {
                tracing::error!(interview = %detail.interview.id, error = %err, "failed to compose reminder email");
                return false;
            }
        };

        match transport.send(message).await {
            Ok(_) => true,
            Err(err) => {
                tracing::error!(interview = %detail.interview.id, error = %err, "failed to send reminder email");
                false
            }
        }
    }
}

fn participant_mailboxes(detail: &InterviewDetail) -> anyhow::Result<(Mailbox, Mailbox)> {
    let candidate: Mailbox =
        format!("{} <{}>", detail.candidate_name, detail.candidate_email).parse()?;
    let recruiter: Mailbox =
        format!("{} <{}>", detail.company_name, detail.company_email).parse()?;
    Ok((candidate, recruiter))
}

fn build_event_message(
    from: &Mailbox,
    detail: &InterviewDetail,
    event: InterviewEvent,
) -> anyhow::Result<Message> {
    let (candidate, recruiter) = participant_mailboxes(detail)?;
    let invite = calendar::interview_invite(detail);
    let content_type = ContentType::parse("text/calendar; charset=utf-8; method=REQUEST")?;

    let message = Message::builder()
        .from(from.clone())
        .to(candidate)
        .cc(recruiter)
        .subject(event_subject(detail, event))
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(event_body(detail, event)))
                .singlepart(Attachment::new("interview.ics".to_string()).body(invite, content_type)),
        )?;
    Ok(message)
}

fn build_reminder_message(
    from: &Mailbox,
    detail: &InterviewDetail,
    kind: ReminderKind,
) -> anyhow::Result<Message> {
    let (candidate, recruiter) = participant_mailboxes(detail)?;
    let message = Message::builder()
        .from(from.clone())
        .to(candidate)
        .cc(recruiter)
        .subject(reminder_subject(detail, kind))
        .singlepart(SinglePart::plain(reminder_body(detail, kind)))?;
    Ok(message)
}

pub fn event_subject(detail: &InterviewDetail, event: InterviewEvent) -> String {
    match event {
        InterviewEvent::Scheduled => format!("Interview scheduled: {}", detail.interview.title),
        InterviewEvent::Rescheduled => format!("Interview rescheduled: {}", detail.interview.title),
    }
}

pub fn event_body(detail: &InterviewDetail, event: InterviewEvent) -> String {
    let interview = &detail.interview;
    let lead = match event {
        InterviewEvent::Scheduled => "your interview has been scheduled",
        InterviewEvent::Rescheduled => "your interview has been rescheduled",
    };
    format!(
        "Hi {},\n\n\
         For the {} position at {}, {}.\n\n\
         When: {} ({})\n\
         Duration: {} minutes\n\
         Meeting ID: {}\n\
         Password: {}\n\
         Join: {}\n\n\
         A calendar invite is attached.\n",
        detail.candidate_name,
        detail.job_title,
        detail.company_name,
        lead,
        interview.scheduled_at.to_rfc3339(),
        interview.time_zone,
        interview.duration_minutes,
        interview.meeting_id,
        interview.meeting_password,
        interview.join_url,
    )
}

pub fn reminder_subject(detail: &InterviewDetail, kind: ReminderKind) -> String {
    match kind {
        ReminderKind::Imminent => {
            format!("Starting soon: {}", detail.interview.title)
        }
        ReminderKind::DayAhead => {
            format!("Tomorrow: {}", detail.interview.title)
        }
    }
}

pub fn reminder_body(detail: &InterviewDetail, kind: ReminderKind) -> String {
    let interview = &detail.interview;
    let when = match kind {
        ReminderKind::Imminent => "starts within the next hour",
        ReminderKind::DayAhead => "is coming up in about 24 hours",
    };
    format!(
        "Hi {},\n\n\
         Your {} interview for {} at {} {}.\n\n\
         When: {} ({})\n\
         Join: {}\n\
         Meeting ID: {}  Password: {}\n",
        detail.candidate_name,
        interview.interview_type,
        detail.job_title,
        detail.company_name,
        when,
        interview.scheduled_at.to_rfc3339(),
        interview.time_zone,
        interview.join_url,
        interview.meeting_id,
        interview.meeting_password,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::interview::Interview;
    use chrono::{TimeZone, Utc};
    use sqlx::types::Json;
    use uuid::Uuid;

    fn detail() -> InterviewDetail {
        InterviewDetail {
            interview: Interview {
                id: Uuid::new_v4(),
                job_id: Uuid::new_v4(),
                company_id: Uuid::new_v4(),
                candidate_id: Uuid::new_v4(),
                title: "Screening call".into(),
                description: None,
                notes: None,
                interview_type: "screening".into(),
                status: "scheduled".into(),
                scheduled_at: Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap(),
                duration_minutes: 30,
                time_zone: "Europe/Berlin".into(),
                meeting_id: "314159".into(),
                meeting_password: "hunter2".into(),
                join_url: "https://zoom.us/j/314159?pwd=hunter2".into(),
                start_url: None,
                feedback: None,
                reschedule_history: Json(Vec::new()),
                attachments: serde_json::json!([]),
                reminder_sent: false,
                advance_reminder_sent: false,
                email_sent: false,
                created_at: None,
                updated_at: None,
            },
            candidate_name: "Bob".into(),
            candidate_email: "bob@example.com".into(),
            job_title: "Data Engineer".into(),
            company_name: "Initech".into(),
            company_email: "hr@initech.test".into(),
        }
    }

    #[test]
    fn event_body_carries_meeting_credentials() {
        let body = event_body(&detail(), InterviewEvent::Scheduled);
        assert!(body.contains("314159"));
        assert!(body.contains("hunter2"));
        assert!(body.contains("https://zoom.us/j/314159?pwd=hunter2"));
        assert!(body.contains("Europe/Berlin"));
    }

    #[test]
    fn subjects_distinguish_events_and_reminder_tiers() {
        let d = detail();
        assert!(event_subject(&d, InterviewEvent::Scheduled).starts_with("Interview scheduled"));
        assert!(event_subject(&d, InterviewEvent::Rescheduled).starts_with("Interview rescheduled"));
        assert!(reminder_subject(&d, ReminderKind::Imminent).starts_with("Starting soon"));
        assert!(reminder_subject(&d, ReminderKind::DayAhead).starts_with("Tomorrow"));
    }

    #[test]
    fn messages_address_candidate_with_recruiter_in_cc() {
        let from: Mailbox = "JobAstra <noreply@jobastra.test>".parse().unwrap();
        let message = build_event_message(&from, &detail(), InterviewEvent::Scheduled).unwrap();
        let rendered = String::from_utf8(message.formatted()).unwrap();
        assert!(rendered.contains("bob@example.com"));
        assert!(rendered.contains("hr@initech.test"));
        assert!(rendered.contains("text/calendar"));
    }

    #[tokio::test]
    async fn disabled_mailer_is_a_noop_returning_false() {
        let mailer = EmailService::disabled();
        assert!(!mailer.is_configured());
        assert!(!mailer.send_event(&detail(), InterviewEvent::Scheduled).await);
        assert!(!mailer.send_reminder(&detail(), ReminderKind::Imminent).await);
    }
}
