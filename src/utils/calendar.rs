use icalendar::{Calendar, Component, Event, EventLike, Property};

use crate::models::interview::InterviewDetail;

/// Builds the `.ics` payload attached to interview emails. One VEVENT:
/// organizer is the recruiter, the candidate is the single attendee, and
/// the meeting credentials ride in the description.
pub fn interview_invite(detail: &InterviewDetail) -> String {
    let interview = &detail.interview;

    let mut description = format!(
        "Interview for {} at {}\nMeeting ID: {}\nPassword: {}\nJoin: {}",
        detail.job_title,
        detail.company_name,
        interview.meeting_id,
        interview.meeting_password,
        interview.join_url,
    );
    if let Some(extra) = interview.description.as_deref() {
        if !extra.is_empty() {
            description.push_str("\n\n");
            description.push_str(extra);
        }
    }

    let mut event = Event::new();
    event
        .uid(&format!("{}@jobastra", interview.id))
        .summary(&interview.title)
        .description(&description)
        .starts(interview.scheduled_at)
        .ends(interview.end_at());
    event.append_property(
        Property::new(
            "ORGANIZER",
            &format!("mailto:{}", detail.company_email),
        )
        .add_parameter("CN", &detail.company_name)
        .done(),
    );
    event.append_property(
        Property::new(
            "ATTENDEE",
            &format!("mailto:{}", detail.candidate_email),
        )
        .add_parameter("CN", &detail.candidate_name)
        .add_parameter("RSVP", "TRUE")
        .done(),
    );

    let mut calendar = Calendar::new();
    calendar.name("JobAstra Interviews").push(event.done());
    calendar.to_string()
}
