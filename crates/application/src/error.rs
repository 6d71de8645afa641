use domain::{DomainError, RepositoryError};
use serde::Serialize;
use thiserror::Error;

use crate::password::PasswordHasherError;
use crate::token::TokenError;

/// 单个字段的校验失败信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// 收集一次请求中所有字段的校验失败，保证不会只处理部分输入。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: Vec<FieldViolation>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.push(FieldViolation {
            field: field.into(),
            message: message.into(),
        });
    }

    /// 记录失败并返回 None；成功时原样返回值。
    pub fn check<T>(&mut self, result: Result<T, DomainError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.push_domain(err);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[FieldViolation] {
        &self.fields
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|v| v.field.as_str()).collect()
    }

    /// 没有失败时返回 Ok，否则转为 `ApplicationError::Validation`。
    pub fn finish(self) -> Result<(), ApplicationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ApplicationError::Validation(self))
        }
    }

    fn push_domain(&mut self, err: DomainError) {
        let DomainError::InvalidArgument { field, reason } = err;
        self.push(field, reason);
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .fields
            .iter()
            .map(|v| format!("{}: {}", v.field, v.message))
            .collect::<Vec<_>>()
            .join(", ");
        f.write_str(&joined)
    }
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("{resource} not found")]
    NotFound { resource: &'static str },
    #[error("authentication failed")]
    Unauthorized,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("operation not allowed")]
    Forbidden,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("repository error: {0}")]
    Repository(RepositoryError),
    #[error("password error: {0}")]
    Password(#[from] PasswordHasherError),
    #[error("token error: {0}")]
    Token(TokenError),
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl ApplicationError {
    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        Self::Infrastructure(message.into())
    }
}

impl From<DomainError> for ApplicationError {
    fn from(value: DomainError) -> Self {
        let mut errors = ValidationErrors::new();
        errors.push_domain(value);
        Self::Validation(errors)
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        ApplicationError::Repository(value)
    }
}

impl From<TokenError> for ApplicationError {
    fn from(value: TokenError) -> Self {
        match value {
            TokenError::Invalid(_) => ApplicationError::InvalidToken,
            other => ApplicationError::Token(other),
        }
    }
}
