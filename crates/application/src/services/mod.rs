mod application_service;
mod auth_service;
mod job_service;

#[cfg(test)]
mod test_support;


pub use application_service::{
    ApplicationService, ApplicationServiceDependencies, SubmitApplicationRequest,
};
pub use auth_service::{
    AuthService, AuthServiceDependencies, LoginOutcome, LoginRequest, RegisterEmployerRequest,
    MIN_PASSWORD_LEN,
};
pub use job_service::{
    CreateJobRequest, JobDraft, JobSearchRequest, JobService, JobServiceDependencies, JobUpdate,
    SalaryRangeInput, UpdateJobRequest,
};
