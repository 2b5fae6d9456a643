use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::job_dto::{ApplyPayload, CreateJobPayload, JobListQuery},
    error::{Error, Result},
    middleware::auth::AuthParty,
    AppState,
};

#[utoipa::path(
    post,
    path = "/job",
    request_body = CreateJobPayload,
    responses(
        (status = 201, description = "Job created"),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    Extension(party): Extension<AuthParty>,
    Json(payload): Json<CreateJobPayload>,
) -> Result<impl IntoResponse> {
    let company_id = party.require_recruiter()?;
    payload.validate()?;
    let job = state.job_service.create(company_id, payload).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

#[utoipa::path(
    get,
    path = "/jobs",
    params(
        ("search" = Option<String>, Query, description = "Title/description search"),
        ("location" = Option<String>, Query, description = "Location filter")
    ),
    responses((status = 200, description = "Open jobs"))
)]
#[axum::debug_handler]
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> Result<impl IntoResponse> {
    let jobs = state.job_service.list_open(query).await?;
    Ok(Json(jobs))
}

#[utoipa::path(
    get,
    path = "/job/{id}",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job detail"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state
        .job_service
        .get(id)
        .await?
        .ok_or_else(|| Error::NotFound("Job not found".to_string()))?;
    Ok(Json(job))
}

#[utoipa::path(
    get,
    path = "/job/mine",
    responses((status = 200, description = "Jobs owned by the requesting recruiter"))
)]
#[axum::debug_handler]
pub async fn my_jobs(
    State(state): State<AppState>,
    Extension(party): Extension<AuthParty>,
) -> Result<impl IntoResponse> {
    let company_id = party.require_recruiter()?;
    let jobs = state.job_service.list_for_company(company_id).await?;
    Ok(Json(jobs))
}

#[utoipa::path(
    post,
    path = "/job/{id}/apply",
    params(("id" = Uuid, Path, description = "Job ID")),
    request_body = ApplyPayload,
    responses(
        (status = 201, description = "Application created"),
        (status = 409, description = "Already applied")
    )
)]
#[axum::debug_handler]
pub async fn apply_to_job(
    State(state): State<AppState>,
    Extension(party): Extension<AuthParty>,
    Path(id): Path<Uuid>,
    payload: Option<Json<ApplyPayload>>,
) -> Result<impl IntoResponse> {
    let candidate_id = party.require_candidate()?;
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let application = state
        .job_service
        .apply(id, candidate_id, payload.cover_letter)
        .await?;
    Ok((StatusCode::CREATED, Json(application)))
}

#[utoipa::path(
    get,
    path = "/job/{id}/applications",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Applications for a job the recruiter owns"),
        (status = 404, description = "Job not found for this company")
    )
)]
#[axum::debug_handler]
pub async fn job_applications(
    State(state): State<AppState>,
    Extension(party): Extension<AuthParty>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let company_id = party.require_recruiter()?;
    state.job_service.find_owned(id, company_id).await?;
    let applications = state.job_service.list_applications_for_job(id).await?;
    Ok(Json(applications))
}

#[utoipa::path(
    get,
    path = "/applications",
    responses((status = 200, description = "The requesting candidate's applications"))
)]
#[axum::debug_handler]
pub async fn my_applications(
    State(state): State<AppState>,
    Extension(party): Extension<AuthParty>,
) -> Result<impl IntoResponse> {
    let candidate_id = party.require_candidate()?;
    let applications = state
        .job_service
        .list_applications_for_candidate(candidate_id)
        .await?;
    Ok(Json(applications))
}
