use std::sync::Arc;

use application::repository::{
    EmployerRepository, JobApplicationRepository, JobOwner, JobRepository, JobSearch,
};
use async_trait::async_trait;
use domain::{
    ApplicationId, CandidateEmail, CandidateName, EmailAddress, Employer, EmployerId, Job,
    JobApplication, JobId, PasswordHash, PersonName, RepositoryError, SalaryRange,
};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Postgres 唯一约束冲突
const UNIQUE_VIOLATION: &str = "23505";

fn map_sqlx_err(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return RepositoryError::Conflict;
        }
    }
    tracing::error!(error = %err, "数据库操作失败");
    RepositoryError::storage(err.to_string())
}

fn invalid_data(message: impl Into<String>) -> RepositoryError {
    RepositoryError::storage(message)
}

#[derive(Debug, FromRow)]
struct EmployerRecord {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TryFrom<EmployerRecord> for Employer {
    type Error = RepositoryError;

    fn try_from(value: EmployerRecord) -> Result<Self, Self::Error> {
        let name =
            PersonName::parse("name", value.name).map_err(|err| invalid_data(err.to_string()))?;
        let email = EmailAddress::parse("email", value.email)
            .map_err(|err| invalid_data(err.to_string()))?;
        let password =
            PasswordHash::new(value.password_hash).map_err(|err| invalid_data(err.to_string()))?;

        Ok(Employer {
            id: EmployerId::from(value.id),
            name,
            email,
            password,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct JobRecord {
    id: Uuid,
    title: String,
    description: String,
    location: String,
    salary_min: i64,
    salary_max: i64,
    employer_id: Uuid,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<JobRecord> for Job {
    fn from(value: JobRecord) -> Self {
        Job {
            id: JobId::from(value.id),
            title: value.title,
            description: value.description,
            location: value.location,
            salary_range: SalaryRange::new(value.salary_min, value.salary_max),
            employer_id: EmployerId::from(value.employer_id),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct ApplicationRecord {
    id: Uuid,
    job_id: Uuid,
    candidate_name: String,
    candidate_email: String,
    application_date: OffsetDateTime,
}

impl TryFrom<ApplicationRecord> for JobApplication {
    type Error = RepositoryError;

    fn try_from(value: ApplicationRecord) -> Result<Self, Self::Error> {
        let candidate_name = CandidateName::parse(value.candidate_name)
            .map_err(|err| invalid_data(err.to_string()))?;
        let candidate_email = CandidateEmail::parse(value.candidate_email)
            .map_err(|err| invalid_data(err.to_string()))?;

        Ok(JobApplication {
            id: ApplicationId::from(value.id),
            job_id: JobId::from(value.job_id),
            candidate_name,
            candidate_email,
            application_date: value.application_date,
        })
    }
}

const EMPLOYER_COLUMNS: &str = "id, name, email, password_hash, created_at, updated_at";
const JOB_COLUMNS: &str =
    "id, title, description, location, salary_min, salary_max, employer_id, created_at, updated_at";
const APPLICATION_COLUMNS: &str =
    "id, job_id, candidate_name, candidate_email, application_date";

#[derive(Clone)]
pub struct PgEmployerRepository {
    pool: PgPool,
}

impl PgEmployerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployerRepository for PgEmployerRepository {
    async fn create(&self, employer: Employer) -> Result<Employer, RepositoryError> {
        let record = sqlx::query_as::<_, EmployerRecord>(&format!(
            r#"
            INSERT INTO employers (id, name, email, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {EMPLOYER_COLUMNS}
            "#
        ))
        .bind(Uuid::from(employer.id))
        .bind(employer.name.as_str())
        .bind(employer.email.as_str())
        .bind(employer.password.as_str())
        .bind(employer.created_at)
        .bind(employer.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Employer::try_from(record)
    }

    async fn find_by_id(&self, id: EmployerId) -> Result<Option<Employer>, RepositoryError> {
        let record = sqlx::query_as::<_, EmployerRecord>(&format!(
            "SELECT {EMPLOYER_COLUMNS} FROM employers WHERE id = $1"
        ))
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        record.map(Employer::try_from).transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Employer>, RepositoryError> {
        let record = sqlx::query_as::<_, EmployerRecord>(&format!(
            "SELECT {EMPLOYER_COLUMNS} FROM employers WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        record.map(Employer::try_from).transpose()
    }
}

#[derive(Clone)]
pub struct PgJobRepository {
    pool: PgPool,
}

impl PgJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// 把检索词拼成 `to_tsquery` 的 OR 表达式。
/// 检索词只含字母数字，不会引入 tsquery 运算符。
fn ts_query(search: &JobSearch) -> Option<String> {
    let terms = search.terms();
    (!terms.is_empty()).then(|| terms.join(" | "))
}

#[async_trait]
impl JobRepository for PgJobRepository {
    async fn create(&self, job: Job) -> Result<Job, RepositoryError> {
        let record = sqlx::query_as::<_, JobRecord>(&format!(
            r#"
            INSERT INTO jobs (id, title, description, location, salary_min, salary_max,
                              employer_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(Uuid::from(job.id))
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.location)
        .bind(job.salary_range.min)
        .bind(job.salary_range.max)
        .bind(Uuid::from(job.employer_id))
        .bind(job.created_at)
        .bind(job.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(Job::from(record))
    }

    async fn find_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        let record = sqlx::query_as::<_, JobRecord>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"
        ))
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(record.map(Job::from))
    }

    async fn find_owner(&self, id: JobId) -> Result<Option<JobOwner>, RepositoryError> {
        let row: Option<(Uuid, Uuid)> =
            sqlx::query_as("SELECT id, employer_id FROM jobs WHERE id = $1")
                .bind(Uuid::from(id))
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_err)?;

        Ok(row.map(|(job_id, employer_id)| JobOwner {
            job_id: JobId::from(job_id),
            employer_id: EmployerId::from(employer_id),
        }))
    }

    async fn update(&self, job: Job) -> Result<Job, RepositoryError> {
        let record = sqlx::query_as::<_, JobRecord>(&format!(
            r#"
            UPDATE jobs
            SET title = $2, description = $3, location = $4,
                salary_min = $5, salary_max = $6, updated_at = $7
            WHERE id = $1
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(Uuid::from(job.id))
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.location)
        .bind(job.salary_range.min)
        .bind(job.salary_range.max)
        .bind(job.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        record.map(Job::from).ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, id: JobId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(Uuid::from(id))
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn search(&self, query: JobSearch) -> Result<Vec<Job>, RepositoryError> {
        let records = sqlx::query_as::<_, JobRecord>(&format!(
            r#"
            SELECT {JOB_COLUMNS} FROM jobs
            WHERE ($1::text IS NULL
                   OR to_tsvector('simple', title || ' ' || location) @@ to_tsquery('simple', $1))
              AND ($2::bigint IS NULL OR salary_min >= $2)
              AND ($3::bigint IS NULL OR salary_max <= $3)
            ORDER BY created_at, id
            "#
        ))
        .bind(ts_query(&query))
        .bind(query.min_salary)
        .bind(query.max_salary)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(records.into_iter().map(Job::from).collect())
    }
}

#[derive(Clone)]
pub struct PgJobApplicationRepository {
    pool: PgPool,
}

impl PgJobApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobApplicationRepository for PgJobApplicationRepository {
    async fn create(&self, application: JobApplication) -> Result<JobApplication, RepositoryError> {
        let record = sqlx::query_as::<_, ApplicationRecord>(&format!(
            r#"
            INSERT INTO job_applications (id, job_id, candidate_name, candidate_email, application_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(Uuid::from(application.id))
        .bind(Uuid::from(application.job_id))
        .bind(application.candidate_name.as_str())
        .bind(application.candidate_email.as_str())
        .bind(application.application_date)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        JobApplication::try_from(record)
    }

    async fn list_by_job(&self, job_id: JobId) -> Result<Vec<JobApplication>, RepositoryError> {
        let records = sqlx::query_as::<_, ApplicationRecord>(&format!(
            r#"
            SELECT {APPLICATION_COLUMNS} FROM job_applications
            WHERE job_id = $1
            ORDER BY application_date, id
            "#
        ))
        .bind(Uuid::from(job_id))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        records.into_iter().map(JobApplication::try_from).collect()
    }
}

/// 三个仓储共享同一个连接池
#[derive(Clone)]
pub struct PgStorage {
    pub pool: PgPool,
    pub employer_repository: Arc<PgEmployerRepository>,
    pub job_repository: Arc<PgJobRepository>,
    pub application_repository: Arc<PgJobApplicationRepository>,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self {
            employer_repository: Arc::new(PgEmployerRepository::new(pool.clone())),
            job_repository: Arc::new(PgJobRepository::new(pool.clone())),
            application_repository: Arc::new(PgJobApplicationRepository::new(pool.clone())),
            pool,
        }
    }
}

pub async fn create_pg_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
