pub mod health;
pub mod interview_routes;
pub mod job_routes;

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::middleware::{auth, rate_limit};
use crate::AppState;

/// Full API surface. Public routes are unauthenticated; everything else
/// goes through bearer auth, which resolves the requester into an
/// `AuthParty` extension before handlers run.
pub fn router(rps: u32) -> Router<AppState> {
    let public = Router::new()
        .route("/health", get(health::health))
        .route("/jobs", get(job_routes::list_jobs))
        .route("/job/:id", get(job_routes::get_job));

    let protected = Router::new()
        .route(
            "/interview/schedule",
            post(interview_routes::schedule_interview),
        )
        .route(
            "/interview/candidate",
            get(interview_routes::list_candidate_interviews),
        )
        .route(
            "/interview/recruiter",
            get(interview_routes::list_recruiter_interviews),
        )
        .route(
            "/interview/status/:id",
            put(interview_routes::update_interview_status),
        )
        .route(
            "/interview/reschedule/:id",
            put(interview_routes::reschedule_interview),
        )
        .route(
            "/interview/candidate/:id/cancel",
            delete(interview_routes::cancel_interview_as_candidate),
        )
        .route(
            "/interview/recruiter/:id/cancel",
            delete(interview_routes::cancel_interview_as_recruiter),
        )
        .route(
            "/interview/cancel/:id",
            delete(interview_routes::cancel_interview),
        )
        .route(
            "/interview/delete/:id",
            delete(interview_routes::delete_interview),
        )
        .route(
            "/interview/upcoming",
            get(interview_routes::upcoming_interviews),
        )
        .route("/job", post(job_routes::create_job))
        .route("/job/mine", get(job_routes::my_jobs))
        .route("/job/:id/apply", post(job_routes::apply_to_job))
        .route("/job/:id/applications", get(job_routes::job_applications))
        .route("/applications", get(job_routes::my_applications))
        .layer(axum::middleware::from_fn(auth::authenticate));

    public.merge(protected).layer(axum::middleware::from_fn_with_state(
        rate_limit::new_rps_state(rps),
        rate_limit::rps_middleware,
    ))
}
