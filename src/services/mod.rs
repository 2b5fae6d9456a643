pub mod account_service;
pub mod email_service;
pub mod interview_service;
pub mod job_service;
pub mod reminder_service;
