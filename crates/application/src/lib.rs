//! 应用层实现。
//!
//! 这里提供围绕领域模型的用例服务，处理输入校验、权限检查，
//! 以及对外部适配器（例如密码哈希、令牌签发、实时通知）的抽象。

pub mod clock;
pub mod dto;
pub mod error;
#[cfg(any(test, feature = "testing"))]
pub mod memory;
pub mod notifier;
pub mod password;
pub mod presence;
pub mod repository;
pub mod services;
pub mod token;

pub use clock::{Clock, SystemClock};
pub use dto::{EmployerDto, JobApplicationDto, JobDto};
pub use error::{ApplicationError, FieldViolation, ValidationErrors};
pub use notifier::{
    CandidateInfo, ChannelHub, DispatchError, NewApplicationNotice, NotificationDispatcher,
    NotificationEvent,
};
pub use password::{PasswordHasher, PasswordHasherError};
pub use presence::{ChannelId, InMemoryPresenceRegistry, PresenceRegistry};
pub use repository::{
    EmployerRepository, JobApplicationRepository, JobOwner, JobRepository, JobSearch,
};
pub use services::{
    ApplicationService, ApplicationServiceDependencies, AuthService, AuthServiceDependencies,
    JobService, JobServiceDependencies,
};
pub use token::{Identity, IssuedToken, TokenError, TokenService};
