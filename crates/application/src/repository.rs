use async_trait::async_trait;
use domain::{
    EmailAddress, Employer, EmployerId, Job, JobApplication, JobId, RepositoryError,
};

#[async_trait]
pub trait EmployerRepository: Send + Sync {
    /// 邮箱重复时返回 `RepositoryError::Conflict`
    async fn create(&self, employer: Employer) -> Result<Employer, RepositoryError>;
    async fn find_by_id(&self, id: EmployerId) -> Result<Option<Employer>, RepositoryError>;
    async fn find_by_email(&self, email: &EmailAddress)
        -> Result<Option<Employer>, RepositoryError>;
}

/// 职位归属投影，只包含投递流程需要的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobOwner {
    pub job_id: JobId,
    pub employer_id: EmployerId,
}

/// 职位搜索条件。
///
/// `text` 由 title 与 location 拼接而成，任一词命中标题或地点即匹配。
/// 薪资条件是子区间过滤：`min_salary` 要求存储的下限不低于它，
/// `max_salary` 要求存储的上限不高于它，并不是区间重叠。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobSearch {
    pub text: Option<String>,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
}

impl JobSearch {
    /// 拆分出小写、去重的检索词，只保留字母数字。
    pub fn terms(&self) -> Vec<String> {
        let mut terms: Vec<String> = Vec::new();
        let Some(text) = self.text.as_deref() else {
            return terms;
        };
        for term in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
        {
            if !terms.contains(&term) {
                terms.push(term);
            }
        }
        terms
    }

    pub fn matches(&self, job: &Job) -> bool {
        let terms = self.terms();
        if !terms.is_empty() {
            let words: Vec<String> = job
                .title
                .split(|c: char| !c.is_alphanumeric())
                .chain(job.location.split(|c: char| !c.is_alphanumeric()))
                .filter(|w| !w.is_empty())
                .map(str::to_lowercase)
                .collect();
            if !terms.iter().any(|term| words.contains(term)) {
                return false;
            }
        }
        if let Some(min) = self.min_salary {
            if job.salary_range.min < min {
                return false;
            }
        }
        if let Some(max) = self.max_salary {
            if job.salary_range.max > max {
                return false;
            }
        }
        true
    }
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: Job) -> Result<Job, RepositoryError>;
    async fn find_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError>;
    async fn find_owner(&self, id: JobId) -> Result<Option<JobOwner>, RepositoryError>;
    /// 记录不存在时返回 `RepositoryError::NotFound`
    async fn update(&self, job: Job) -> Result<Job, RepositoryError>;
    /// 记录不存在时返回 `RepositoryError::NotFound`
    async fn delete(&self, id: JobId) -> Result<(), RepositoryError>;
    async fn search(&self, query: JobSearch) -> Result<Vec<Job>, RepositoryError>;
}

#[async_trait]
pub trait JobApplicationRepository: Send + Sync {
    /// 无条件插入，不检查 (candidate_email, job_id) 唯一性
    async fn create(&self, application: JobApplication)
        -> Result<JobApplication, RepositoryError>;
    async fn list_by_job(&self, job_id: JobId) -> Result<Vec<JobApplication>, RepositoryError>;
}
