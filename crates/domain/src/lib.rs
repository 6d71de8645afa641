//! 招聘平台核心领域模型
//!
//! 包含雇主、职位、求职申请等核心实体，以及值对象和错误定义。

pub mod employer;
pub mod errors;
pub mod job;
pub mod job_application;
pub mod value_objects;

// 重新导出常用类型
pub use employer::Employer;
pub use errors::{DomainError, RepositoryError};
pub use job::{Job, JobPatch, SalaryRange};
pub use job_application::JobApplication;
pub use value_objects::{
    ApplicationId, CandidateEmail, CandidateName, EmailAddress, EmployerId, JobId, PasswordHash,
    PersonName, Timestamp,
};
