pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    account_service::AccountService, email_service::EmailService,
    interview_service::InterviewService, job_service::JobService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub interview_service: InterviewService,
    pub job_service: JobService,
    pub account_service: AccountService,
    pub email_service: EmailService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let email_service = EmailService::from_config(config);

        let account_service = AccountService::new(pool.clone());
        let interview_service =
            InterviewService::new(pool.clone(), account_service.clone(), email_service.clone());
        let job_service = JobService::new(pool.clone());

        Self {
            pool,
            interview_service,
            job_service,
            account_service,
            email_service,
        }
    }
}
