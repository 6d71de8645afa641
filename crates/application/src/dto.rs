use domain::{Employer, Job, JobApplication, SalaryRange, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 雇主对外视图，不包含密码哈希
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: Timestamp,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: Timestamp,
}

impl From<&Employer> for EmployerDto {
    fn from(employer: &Employer) -> Self {
        Self {
            id: Uuid::from(employer.id),
            name: employer.name.as_str().to_owned(),
            email: employer.email.as_str().to_owned(),
            created_at: employer.created_at,
            updated_at: employer.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub salary_range: SalaryRange,
    pub employer_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: Timestamp,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: Timestamp,
}

impl From<&Job> for JobDto {
    fn from(job: &Job) -> Self {
        Self {
            id: Uuid::from(job.id),
            title: job.title.clone(),
            description: job.description.clone(),
            location: job.location.clone(),
            salary_range: job.salary_range,
            employer_id: Uuid::from(job.employer_id),
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplicationDto {
    pub id: Uuid,
    pub job_id: Uuid,
    pub candidate_name: String,
    pub candidate_email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub application_date: Timestamp,
}

impl From<&JobApplication> for JobApplicationDto {
    fn from(application: &JobApplication) -> Self {
        Self {
            id: Uuid::from(application.id),
            job_id: Uuid::from(application.job_id),
            candidate_name: application.candidate_name.as_str().to_owned(),
            candidate_email: application.candidate_email.as_str().to_owned(),
            application_date: application.application_date,
        }
    }
}
