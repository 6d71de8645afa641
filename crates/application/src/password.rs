//! 雇主密码哈希端口

use async_trait::async_trait;
use domain::PasswordHash;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordHasherError {
    /// 注册时无法生成哈希
    #[error("failed to hash employer password: {0}")]
    Hashing(String),
    /// 存储的哈希损坏，或校验任务异常退出
    #[error("failed to verify employer password: {0}")]
    Verification(String),
}

/// 雇主密码的哈希与校验。实现方需要自行避免阻塞异步运行时。
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, plaintext: &str) -> Result<PasswordHash, PasswordHasherError>;

    /// 密码不匹配时返回 `Ok(false)`
    async fn verify(
        &self,
        plaintext: &str,
        hashed: &PasswordHash,
    ) -> Result<bool, PasswordHasherError>;
}
