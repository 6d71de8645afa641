//! 内存实现的仓储（用于测试）

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use domain::{
    EmailAddress, Employer, EmployerId, Job, JobApplication, JobId, RepositoryError,
};
use tokio::sync::RwLock;

use crate::repository::{
    EmployerRepository, JobApplicationRepository, JobOwner, JobRepository, JobSearch,
};

#[derive(Default, Clone)]
pub struct InMemoryEmployerRepository {
    data: Arc<RwLock<HashMap<EmployerId, Employer>>>,
}

impl InMemoryEmployerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EmployerRepository for InMemoryEmployerRepository {
    async fn create(&self, employer: Employer) -> Result<Employer, RepositoryError> {
        let mut guard = self.data.write().await;
        if guard.contains_key(&employer.id)
            || guard.values().any(|e| e.email == employer.email)
        {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(employer.id, employer.clone());
        Ok(employer)
    }

    async fn find_by_id(&self, id: EmployerId) -> Result<Option<Employer>, RepositoryError> {
        Ok(self.data.read().await.get(&id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Employer>, RepositoryError> {
        let guard = self.data.read().await;
        Ok(guard.values().find(|e| &e.email == email).cloned())
    }
}

/// 按插入顺序保存，搜索结果顺序稳定
#[derive(Default, Clone)]
pub struct InMemoryJobRepository {
    data: Arc<RwLock<Vec<Job>>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn create(&self, job: Job) -> Result<Job, RepositoryError> {
        let mut guard = self.data.write().await;
        if guard.iter().any(|j| j.id == job.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(job.clone());
        Ok(job)
    }

    async fn find_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(self.data.read().await.iter().find(|j| j.id == id).cloned())
    }

    async fn find_owner(&self, id: JobId) -> Result<Option<JobOwner>, RepositoryError> {
        Ok(self
            .data
            .read()
            .await
            .iter()
            .find(|j| j.id == id)
            .map(|j| JobOwner {
                job_id: j.id,
                employer_id: j.employer_id,
            }))
    }

    async fn update(&self, job: Job) -> Result<Job, RepositoryError> {
        let mut guard = self.data.write().await;
        let slot = guard
            .iter_mut()
            .find(|j| j.id == job.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = job.clone();
        Ok(job)
    }

    async fn delete(&self, id: JobId) -> Result<(), RepositoryError> {
        let mut guard = self.data.write().await;
        let before = guard.len();
        guard.retain(|j| j.id != id);
        if guard.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn search(&self, query: JobSearch) -> Result<Vec<Job>, RepositoryError> {
        let guard = self.data.read().await;
        Ok(guard.iter().filter(|j| query.matches(j)).cloned().collect())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryJobApplicationRepository {
    data: Arc<RwLock<Vec<JobApplication>>>,
}

impl InMemoryJobApplicationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<JobApplication> {
        self.data.read().await.clone()
    }
}

#[async_trait]
impl JobApplicationRepository for InMemoryJobApplicationRepository {
    async fn create(
        &self,
        application: JobApplication,
    ) -> Result<JobApplication, RepositoryError> {
        self.data.write().await.push(application.clone());
        Ok(application)
    }

    async fn list_by_job(&self, job_id: JobId) -> Result<Vec<JobApplication>, RepositoryError> {
        let guard = self.data.read().await;
        Ok(guard.iter().filter(|a| a.job_id == job_id).cloned().collect())
    }
}
