use std::sync::Arc;

use domain::{Job, JobApplication, JobId, JobPatch, RepositoryError, SalaryRange};

use crate::{
    clock::Clock,
    error::{ApplicationError, ValidationErrors},
    repository::{JobApplicationRepository, JobRepository, JobSearch},
    token::Identity,
};

/// 请求中的薪资范围，缺失字段在校验阶段报告
#[derive(Debug, Clone, Copy, Default)]
pub struct SalaryRangeInput {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub salary_range: Option<SalaryRangeInput>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub salary_range: Option<SalaryRangeInput>,
}

/// 查询参数保持原始字符串，数字解析失败时按字段报告
#[derive(Debug, Clone, Default)]
pub struct JobSearchRequest {
    pub title: Option<String>,
    pub location: Option<String>,
    pub min_salary: Option<String>,
    pub max_salary: Option<String>,
}

pub struct JobServiceDependencies {
    pub job_repository: Arc<dyn JobRepository>,
    pub application_repository: Arc<dyn JobApplicationRepository>,
    pub clock: Arc<dyn Clock>,
}

pub struct JobService {
    deps: JobServiceDependencies,
}

/// 通过校验、等待落库的新职位
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDraft {
    title: String,
    description: String,
    location: String,
    salary_range: SalaryRange,
}

/// 通过校验的更新请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobUpdate {
    pub job_id: JobId,
    pub patch: JobPatch,
}

impl JobService {
    pub fn new(deps: JobServiceDependencies) -> Self {
        Self { deps }
    }

    /// 校验发布请求。只检查输入，不涉及身份与存储。
    pub fn draft(request: CreateJobRequest) -> Result<JobDraft, ApplicationError> {
        let mut errors = ValidationErrors::new();
        let title = required(&mut errors, "title", request.title, Job::validate_title);
        let description = required(
            &mut errors,
            "description",
            request.description,
            Job::validate_description,
        );
        let location = required(&mut errors, "location", request.location, Job::validate_location);
        let salary_range = match request.salary_range {
            Some(input) => parse_salary_range(&mut errors, input),
            None => {
                errors.push("salaryRange", "is required");
                None
            }
        };
        let (Some(title), Some(description), Some(location), Some(salary_range)) =
            (title, description, location, salary_range)
        else {
            return Err(ApplicationError::Validation(errors));
        };

        Ok(JobDraft {
            title,
            description,
            location,
            salary_range,
        })
    }

    /// 校验更新请求，规则同 [`JobService::draft`]，所有字段可选。
    pub fn prepare_update(
        job_id: &str,
        request: UpdateJobRequest,
    ) -> Result<JobUpdate, ApplicationError> {
        let mut errors = ValidationErrors::new();
        let job_id = errors.check(JobId::parse(job_id));
        let patch = JobPatch {
            title: optional(&mut errors, request.title, Job::validate_title),
            description: optional(&mut errors, request.description, Job::validate_description),
            location: optional(&mut errors, request.location, Job::validate_location),
            salary_range: request
                .salary_range
                .and_then(|input| parse_salary_range(&mut errors, input)),
        };
        let Some(job_id) = job_id else {
            return Err(ApplicationError::Validation(errors));
        };
        errors.finish()?;

        Ok(JobUpdate { job_id, patch })
    }

    pub async fn create_job(
        &self,
        identity: &Identity,
        draft: JobDraft,
    ) -> Result<Job, ApplicationError> {
        let job = Job::post(
            JobId::generate(),
            identity.employer_id,
            draft.title,
            draft.description,
            draft.location,
            draft.salary_range,
            self.deps.clock.now(),
        )?;
        let stored = self.deps.job_repository.create(job).await?;

        tracing::info!(job_id = %stored.id, employer_id = %stored.employer_id, "职位已发布");
        Ok(stored)
    }

    pub async fn get_job(&self, job_id: &str) -> Result<Job, ApplicationError> {
        let job_id = JobId::parse(job_id)?;
        self.deps
            .job_repository
            .find_by_id(job_id)
            .await?
            .ok_or(ApplicationError::not_found("job"))
    }

    pub async fn search_jobs(&self, request: JobSearchRequest) -> Result<Vec<Job>, ApplicationError> {
        let mut errors = ValidationErrors::new();
        let min_salary = parse_amount(&mut errors, "minSalary", request.min_salary);
        let max_salary = parse_amount(&mut errors, "maxSalary", request.max_salary);
        errors.finish()?;

        let text = [request.title, request.location]
            .into_iter()
            .flatten()
            .map(|part| part.trim().to_owned())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let query = JobSearch {
            text: (!text.is_empty()).then_some(text),
            min_salary,
            max_salary,
        };
        Ok(self.deps.job_repository.search(query).await?)
    }

    pub async fn update_job(
        &self,
        identity: &Identity,
        update: JobUpdate,
    ) -> Result<Job, ApplicationError> {
        let mut job = self.load_owned_job(identity, update.job_id).await?;
        job.apply(update.patch, self.deps.clock.now())?;

        let updated = self
            .deps
            .job_repository
            .update(job)
            .await
            .map_err(job_not_found)?;

        tracing::info!(job_id = %updated.id, "职位已更新");
        Ok(updated)
    }

    pub async fn delete_job(&self, identity: &Identity, job_id: JobId) -> Result<(), ApplicationError> {
        self.load_owned_job(identity, job_id).await?;
        self.deps
            .job_repository
            .delete(job_id)
            .await
            .map_err(job_not_found)?;

        tracing::info!(job_id = %job_id, "职位已删除");
        Ok(())
    }

    /// 职位所有者查看收到的投递
    pub async fn list_applications(
        &self,
        identity: &Identity,
        job_id: JobId,
    ) -> Result<Vec<JobApplication>, ApplicationError> {
        self.load_owned_job(identity, job_id).await?;
        Ok(self.deps.application_repository.list_by_job(job_id).await?)
    }

    async fn load_owned_job(
        &self,
        identity: &Identity,
        job_id: JobId,
    ) -> Result<Job, ApplicationError> {
        let job = self
            .deps
            .job_repository
            .find_by_id(job_id)
            .await?
            .ok_or(ApplicationError::not_found("job"))?;

        if !identity.owns(job.employer_id) {
            tracing::warn!(
                job_id = %job_id,
                employer_id = %identity.employer_id,
                owner_id = %job.employer_id,
                "非所有者尝试操作职位"
            );
            return Err(ApplicationError::Forbidden);
        }
        Ok(job)
    }
}

fn job_not_found(err: RepositoryError) -> ApplicationError {
    match err {
        RepositoryError::NotFound => ApplicationError::not_found("job"),
        other => ApplicationError::Repository(other),
    }
}

fn required(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<String>,
    validate: fn(String) -> Result<String, domain::DomainError>,
) -> Option<String> {
    match value {
        Some(value) => errors.check(validate(value)),
        None => {
            errors.push(field, "is required");
            None
        }
    }
}

fn optional(
    errors: &mut ValidationErrors,
    value: Option<String>,
    validate: fn(String) -> Result<String, domain::DomainError>,
) -> Option<String> {
    value.and_then(|value| errors.check(validate(value)))
}

fn parse_salary_range(errors: &mut ValidationErrors, input: SalaryRangeInput) -> Option<SalaryRange> {
    if input.min.is_none() {
        errors.push("salaryRange.min", "is required");
    }
    if input.max.is_none() {
        errors.push("salaryRange.max", "is required");
    }
    Some(SalaryRange::new(input.min?, input.max?))
}

fn parse_amount(errors: &mut ValidationErrors, field: &str, raw: Option<String>) -> Option<i64> {
    let raw = raw?;
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<i64>() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.push(field, "must be a whole number");
            None
        }
    }
}
