//! 基础设施层实现。
//!
//! 提供数据库仓储、密码哈希、JWT 令牌等适配器，实现应用层定义的接口。

pub mod auth;
pub mod migrations;
pub mod password;
pub mod repository;

pub use auth::JwtTokenService;
pub use migrations::MIGRATOR;
pub use password::BcryptPasswordHasher;
pub use repository::{
    create_pg_pool, PgEmployerRepository, PgJobApplicationRepository, PgJobRepository, PgStorage,
};
