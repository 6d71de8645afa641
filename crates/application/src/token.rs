//! 身份令牌的签发与校验接口

use domain::{EmailAddress, Employer, EmployerId, Timestamp};
use thiserror::Error;

/// 令牌中携带的身份信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub employer_id: EmployerId,
    pub email: EmailAddress,
}

impl Identity {
    pub fn owns(&self, employer_id: EmployerId) -> bool {
        self.employer_id == employer_id
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: Timestamp,
}

#[derive(Debug, Clone, Error)]
pub enum TokenError {
    /// 签名错误、格式错误或已过期
    #[error("invalid token: {0}")]
    Invalid(String),
    #[error("token issue failed: {0}")]
    Issue(String),
}

/// 签发固定有效期的签名令牌。没有刷新和吊销机制，令牌在过期前一直有效。
pub trait TokenService: Send + Sync {
    fn issue(&self, employer: &Employer) -> Result<IssuedToken, TokenError>;
    fn verify(&self, token: &str) -> Result<Identity, TokenError>;
}
