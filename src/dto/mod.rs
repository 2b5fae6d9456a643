pub mod interview_dto;
pub mod job_dto;
