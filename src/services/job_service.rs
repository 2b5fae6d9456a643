use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::job_dto::{CreateJobPayload, JobListQuery};
use crate::error::{Error, Result};
use crate::models::application::Application;
use crate::models::job::Job;

#[derive(Clone)]
pub struct JobService {
    pool: PgPool,
}

impl JobService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, company_id: Uuid, payload: CreateJobPayload) -> Result<Job> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (company_id, title, description, location, employment_type, salary_range)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(payload.title)
        .bind(payload.description)
        .bind(payload.location)
        .bind(payload.employment_type)
        .bind(payload.salary_range)
        .fetch_one(&self.pool)
        .await?;
        Ok(job)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Job>> {
        let job = sqlx::query_as::<_, Job>(r#"SELECT * FROM jobs WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(job)
    }

    pub async fn list_open(&self, query: JobListQuery) -> Result<Vec<Job>> {
        let search = query.search.map(|s| format!("%{}%", s));
        let location = query.location.map(|l| format!("%{}%", l));
        let jobs = sqlx::query_as::<_, Job>(
            r#"
            SELECT * FROM jobs
            WHERE is_active = TRUE
              AND ($1::text IS NULL OR title ILIKE $1 OR description ILIKE $1)
              AND ($2::text IS NULL OR location ILIKE $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(search)
        .bind(location)
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }

    pub async fn list_for_company(&self, company_id: Uuid) -> Result<Vec<Job>> {
        let jobs = sqlx::query_as::<_, Job>(
            r#"SELECT * FROM jobs WHERE company_id = $1 ORDER BY created_at DESC"#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }

    /// Ownership-scoped lookup used before mutating anything under a job.
    pub async fn find_owned(&self, job_id: Uuid, company_id: Uuid) -> Result<Job> {
        sqlx::query_as::<_, Job>(r#"SELECT * FROM jobs WHERE id = $1 AND company_id = $2"#)
            .bind(job_id)
            .bind(company_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Job not found for this company".to_string()))
    }

    pub async fn apply(
        &self,
        job_id: Uuid,
        candidate_id: Uuid,
        cover_letter: Option<String>,
    ) -> Result<Application> {
        let job = self
            .get(job_id)
            .await?
            .ok_or_else(|| Error::NotFound("Job not found".to_string()))?;
        if !job.is_active {
            return Err(Error::BadRequest(
                "This job is no longer accepting applications".to_string(),
            ));
        }

        let already_applied: bool = sqlx::query_scalar(
            r#"SELECT EXISTS(SELECT 1 FROM applications WHERE job_id = $1 AND candidate_id = $2)"#,
        )
        .bind(job_id)
        .bind(candidate_id)
        .fetch_one(&self.pool)
        .await?;
        if already_applied {
            return Err(Error::Conflict(
                "You have already applied to this job".to_string(),
            ));
        }

        let application = sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications (job_id, candidate_id, status, cover_letter)
            VALUES ($1, $2, 'applied', $3)
            RETURNING *
            "#,
        )
        .bind(job_id)
        .bind(candidate_id)
        .bind(cover_letter)
        .fetch_one(&self.pool)
        .await?;
        Ok(application)
    }

    pub async fn list_applications_for_job(&self, job_id: Uuid) -> Result<Vec<Application>> {
        let applications = sqlx::query_as::<_, Application>(
            r#"SELECT * FROM applications WHERE job_id = $1 ORDER BY created_at DESC"#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(applications)
    }

    pub async fn list_applications_for_candidate(
        &self,
        candidate_id: Uuid,
    ) -> Result<Vec<Application>> {
        let applications = sqlx::query_as::<_, Application>(
            r#"SELECT * FROM applications WHERE candidate_id = $1 ORDER BY created_at DESC"#,
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(applications)
    }
}
