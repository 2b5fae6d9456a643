use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::interview_dto::{
        CancelPayload, InterviewEnvelope, InterviewListEnvelope, InterviewListQuery,
        MessageEnvelope, ReschedulePayload, ScheduleInterviewPayload, UpcomingQuery,
        UpdateStatusPayload,
    },
    error::Result,
    middleware::auth::AuthParty,
    AppState,
};

#[utoipa::path(
    post,
    path = "/interview/schedule",
    request_body = ScheduleInterviewPayload,
    responses(
        (status = 201, description = "Interview scheduled"),
        (status = 404, description = "Job or candidate not found"),
        (status = 409, description = "Slot conflict for candidate or recruiter")
    )
)]
#[axum::debug_handler]
pub async fn schedule_interview(
    State(state): State<AppState>,
    Extension(party): Extension<AuthParty>,
    Json(payload): Json<ScheduleInterviewPayload>,
) -> Result<impl IntoResponse> {
    let company_id = party.require_recruiter()?;
    payload.validate()?;
    let interview = state.interview_service.schedule(company_id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(InterviewEnvelope::with_message(
            interview,
            "Interview scheduled successfully",
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/interview/candidate",
    params(
        ("startDate" = Option<String>, Query, description = "Lower bound on start time"),
        ("endDate" = Option<String>, Query, description = "Upper bound on start time"),
        ("status" = Option<String>, Query, description = "Filter by status")
    ),
    responses((status = 200, description = "Candidate's interviews, ascending by start"))
)]
#[axum::debug_handler]
pub async fn list_candidate_interviews(
    State(state): State<AppState>,
    Extension(party): Extension<AuthParty>,
    Query(query): Query<InterviewListQuery>,
) -> Result<impl IntoResponse> {
    let candidate_id = party.require_candidate()?;
    let interviews = state
        .interview_service
        .list_for_candidate(candidate_id, query)
        .await?;
    Ok(Json(InterviewListEnvelope::new(interviews)))
}

#[utoipa::path(
    get,
    path = "/interview/recruiter",
    params(
        ("startDate" = Option<String>, Query, description = "Lower bound on start time"),
        ("endDate" = Option<String>, Query, description = "Upper bound on start time"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("jobId" = Option<Uuid>, Query, description = "Filter by job")
    ),
    responses((status = 200, description = "Recruiter's interviews, ascending by start"))
)]
#[axum::debug_handler]
pub async fn list_recruiter_interviews(
    State(state): State<AppState>,
    Extension(party): Extension<AuthParty>,
    Query(query): Query<InterviewListQuery>,
) -> Result<impl IntoResponse> {
    let company_id = party.require_recruiter()?;
    let interviews = state
        .interview_service
        .list_for_recruiter(company_id, query)
        .await?;
    Ok(Json(InterviewListEnvelope::new(interviews)))
}

#[utoipa::path(
    put,
    path = "/interview/status/{id}",
    params(("id" = Uuid, Path, description = "Interview ID")),
    request_body = UpdateStatusPayload,
    responses(
        (status = 200, description = "Interview updated"),
        (status = 404, description = "Interview not found")
    )
)]
#[axum::debug_handler]
pub async fn update_interview_status(
    State(state): State<AppState>,
    Extension(party): Extension<AuthParty>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<impl IntoResponse> {
    let company_id = party.require_recruiter()?;
    let interview = state
        .interview_service
        .update_status(id, company_id, payload)
        .await?;
    Ok(Json(InterviewEnvelope::with_message(
        interview,
        "Interview updated",
    )))
}

#[utoipa::path(
    put,
    path = "/interview/reschedule/{id}",
    params(("id" = Uuid, Path, description = "Interview ID")),
    request_body = ReschedulePayload,
    responses(
        (status = 200, description = "Interview rescheduled"),
        (status = 403, description = "Requester is not a participant"),
        (status = 409, description = "New slot conflicts")
    )
)]
#[axum::debug_handler]
pub async fn reschedule_interview(
    State(state): State<AppState>,
    Extension(party): Extension<AuthParty>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReschedulePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let interview = state.interview_service.reschedule(id, party, payload).await?;
    Ok(Json(InterviewEnvelope::with_message(
        interview,
        "Interview rescheduled successfully",
    )))
}

#[utoipa::path(
    delete,
    path = "/interview/candidate/{id}/cancel",
    params(("id" = Uuid, Path, description = "Interview ID")),
    request_body = CancelPayload,
    responses((status = 200, description = "Interview cancelled"))
)]
#[axum::debug_handler]
pub async fn cancel_interview_as_candidate(
    State(state): State<AppState>,
    Extension(party): Extension<AuthParty>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CancelPayload>,
) -> Result<impl IntoResponse> {
    let candidate_id = party.require_candidate()?;
    payload.validate()?;
    state
        .interview_service
        .cancel(id, AuthParty::Candidate(candidate_id), &payload.reason)
        .await?;
    Ok(Json(MessageEnvelope::new("Interview cancelled")))
}

#[utoipa::path(
    delete,
    path = "/interview/recruiter/{id}/cancel",
    params(("id" = Uuid, Path, description = "Interview ID")),
    request_body = CancelPayload,
    responses((status = 200, description = "Interview cancelled"))
)]
#[axum::debug_handler]
pub async fn cancel_interview_as_recruiter(
    State(state): State<AppState>,
    Extension(party): Extension<AuthParty>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CancelPayload>,
) -> Result<impl IntoResponse> {
    let company_id = party.require_recruiter()?;
    payload.validate()?;
    state
        .interview_service
        .cancel(id, AuthParty::Recruiter(company_id), &payload.reason)
        .await?;
    Ok(Json(MessageEnvelope::new("Interview cancelled")))
}

#[utoipa::path(
    delete,
    path = "/interview/cancel/{id}",
    params(("id" = Uuid, Path, description = "Interview ID")),
    request_body = CancelPayload,
    responses((status = 200, description = "Interview cancelled"))
)]
#[axum::debug_handler]
pub async fn cancel_interview(
    State(state): State<AppState>,
    Extension(party): Extension<AuthParty>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CancelPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    state
        .interview_service
        .cancel(id, party, &payload.reason)
        .await?;
    Ok(Json(MessageEnvelope::new("Interview cancelled")))
}

#[utoipa::path(
    delete,
    path = "/interview/delete/{id}",
    params(("id" = Uuid, Path, description = "Interview ID")),
    responses(
        (status = 200, description = "Interview deleted"),
        (status = 400, description = "Interview is not cancelled"),
        (status = 403, description = "Recruiter does not own this interview")
    )
)]
#[axum::debug_handler]
pub async fn delete_interview(
    State(state): State<AppState>,
    Extension(party): Extension<AuthParty>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let company_id = party.require_recruiter()?;
    state.interview_service.delete(id, company_id).await?;
    Ok(Json(MessageEnvelope::new("Interview deleted")))
}

#[utoipa::path(
    get,
    path = "/interview/upcoming",
    params(("limit" = Option<i64>, Query, description = "Max rows, default 5")),
    responses((status = 200, description = "Upcoming active interviews for the requester"))
)]
#[axum::debug_handler]
pub async fn upcoming_interviews(
    State(state): State<AppState>,
    Extension(party): Extension<AuthParty>,
    Query(query): Query<UpcomingQuery>,
) -> Result<impl IntoResponse> {
    let interviews = state
        .interview_service
        .list_upcoming(party, query.limit)
        .await?;
    Ok(Json(InterviewListEnvelope::new(interviews)))
}
