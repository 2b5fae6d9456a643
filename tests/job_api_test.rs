mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use common::{bearer_token, seed, setup_app};

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn recruiter_posts_a_job_and_candidates_can_browse_it() {
    let Some((app, pool)) = setup_app().await else {
        return;
    };
    let fixture = seed(&pool).await;
    let recruiter = bearer_token(fixture.company_id, "recruiter");
    let marker = Uuid::new_v4().simple().to_string();

    let (status, job) = send(
        &app,
        "POST",
        "/job",
        Some(&recruiter),
        Some(json!({
            "title": format!("Platform Engineer {marker}"),
            "description": "Own the deploy pipeline",
            "location": "Remote",
            "employmentType": "full-time",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(job["isActive"], json!(true));
    let job_id = job["id"].as_str().unwrap().to_string();

    // The open listing is public and the search filter finds the job.
    let (status, jobs) = send(
        &app,
        "GET",
        &format!("/jobs?search=Platform%20Engineer%20{marker}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(jobs
        .as_array()
        .unwrap()
        .iter()
        .any(|j| j["id"] == json!(job_id)));

    let (status, detail) = send(&app, "GET", &format!("/job/{job_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["companyId"], json!(fixture.company_id));

    let (status, mine) = send(&app, "GET", "/job/mine", Some(&recruiter), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(mine
        .as_array()
        .unwrap()
        .iter()
        .any(|j| j["id"] == json!(job_id)));

    // Creating a job needs a recruiter token.
    let candidate = bearer_token(fixture.candidate_id, "candidate");
    let (status, _) = send(
        &app,
        "POST",
        "/job",
        Some(&candidate),
        Some(json!({ "title": "Not allowed" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn candidate_applies_once_and_the_recruiter_sees_it() {
    let Some((app, pool)) = setup_app().await else {
        return;
    };
    let fixture = seed(&pool).await;
    let recruiter = bearer_token(fixture.company_id, "recruiter");
    let candidate = bearer_token(fixture.candidate_id, "candidate");

    let (status, application) = send(
        &app,
        "POST",
        &format!("/job/{}/apply", fixture.job_id),
        Some(&candidate),
        Some(json!({ "coverLetter": "I have shipped three Rust services." })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(application["status"], json!("applied"));
    assert_eq!(application["candidateId"], json!(fixture.candidate_id));

    // A second application to the same job is rejected.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/job/{}/apply", fixture.job_id),
        Some(&candidate),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], json!(false));

    let (status, applications) = send(
        &app,
        "GET",
        &format!("/job/{}/applications", fixture.job_id),
        Some(&recruiter),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(applications.as_array().unwrap().len(), 1);

    let (status, own) = send(&app, "GET", "/applications", Some(&candidate), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(own
        .as_array()
        .unwrap()
        .iter()
        .any(|a| a["jobId"] == json!(fixture.job_id)));

    // Another company cannot read applications for a job it does not own.
    let outsider_company: Uuid = sqlx::query_scalar(
        "INSERT INTO companies (name, email) VALUES ($1, $2) RETURNING id",
    )
    .bind("Globex")
    .bind(format!("hr+{}@globex.test", Uuid::new_v4().simple()))
    .fetch_one(&pool)
    .await
    .expect("outsider company");
    let outsider = bearer_token(outsider_company, "recruiter");
    let (status, _) = send(
        &app,
        "GET",
        &format!("/job/{}/applications", fixture.job_id),
        Some(&outsider),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn applying_to_a_closed_job_is_rejected() {
    let Some((app, pool)) = setup_app().await else {
        return;
    };
    let fixture = seed(&pool).await;
    let candidate = bearer_token(fixture.candidate_id, "candidate");

    sqlx::query("UPDATE jobs SET is_active = FALSE WHERE id = $1")
        .bind(fixture.job_id)
        .execute(&pool)
        .await
        .expect("close job");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/job/{}/apply", fixture.job_id),
        Some(&candidate),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}
