use std::sync::Arc;

use domain::{EmailAddress, Employer, EmployerId, PasswordHash, PersonName, RepositoryError};
use tokio::sync::OnceCell;

use crate::{
    clock::Clock,
    error::{ApplicationError, ValidationErrors},
    password::PasswordHasher,
    repository::EmployerRepository,
    token::{Identity, IssuedToken, TokenService},
};

pub const MIN_PASSWORD_LEN: usize = 6;

/// 未知邮箱登录时拿来比对的占位密码
const DECOY_PASSWORD: &str = "decoy-password-for-unknown-email";

#[derive(Debug, Clone)]
pub struct RegisterEmployerRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub employer: Employer,
    pub token: IssuedToken,
}

pub struct AuthServiceDependencies {
    pub employer_repository: Arc<dyn EmployerRepository>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub token_service: Arc<dyn TokenService>,
    pub clock: Arc<dyn Clock>,
}

pub struct AuthService {
    deps: AuthServiceDependencies,
    decoy_hash: OnceCell<PasswordHash>,
}

impl AuthService {
    pub fn new(deps: AuthServiceDependencies) -> Self {
        Self {
            deps,
            decoy_hash: OnceCell::new(),
        }
    }

    pub async fn register(
        &self,
        request: RegisterEmployerRequest,
    ) -> Result<Employer, ApplicationError> {
        let mut errors = ValidationErrors::new();
        let name = errors.check(PersonName::parse("name", request.name));
        let email = errors.check(EmailAddress::parse("email", request.email));
        if request.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(
                "password",
                format!("must be at least {MIN_PASSWORD_LEN} characters"),
            );
        }
        let (Some(name), Some(email)) = (name, email) else {
            return Err(ApplicationError::Validation(errors));
        };
        errors.finish()?;

        if self
            .deps
            .employer_repository
            .find_by_email(&email)
            .await?
            .is_some()
        {
            return Err(ApplicationError::Conflict("email already registered".into()));
        }

        let password_hash = self.deps.password_hasher.hash(&request.password).await?;
        let employer = Employer::register(
            EmployerId::generate(),
            name,
            email,
            password_hash,
            self.deps.clock.now(),
        );

        // 并发注册同一邮箱时由存储层唯一索引兜底
        let stored = self
            .deps
            .employer_repository
            .create(employer)
            .await
            .map_err(|err| match err {
                RepositoryError::Conflict => {
                    ApplicationError::Conflict("email already registered".into())
                }
                other => ApplicationError::Repository(other),
            })?;

        tracing::info!(employer_id = %stored.id, "雇主注册成功");
        Ok(stored)
    }

    /// 邮箱不存在与密码错误返回同一个错误
    pub async fn login(&self, request: LoginRequest) -> Result<LoginOutcome, ApplicationError> {
        let mut errors = ValidationErrors::new();
        let email = errors.check(EmailAddress::parse("email", request.email));
        if request.password.is_empty() {
            errors.push("password", "cannot be empty");
        }
        let Some(email) = email else {
            return Err(ApplicationError::Validation(errors));
        };
        errors.finish()?;

        let Some(employer) = self.deps.employer_repository.find_by_email(&email).await? else {
            self.verify_against_decoy(&request.password).await;
            tracing::debug!("login rejected: unknown email");
            return Err(ApplicationError::Unauthorized);
        };

        let password_ok = self
            .deps
            .password_hasher
            .verify(&request.password, &employer.password)
            .await?;
        if !password_ok {
            tracing::debug!(employer_id = %employer.id, "login rejected: wrong password");
            return Err(ApplicationError::Unauthorized);
        }

        let token = self.deps.token_service.issue(&employer)?;
        tracing::info!(employer_id = %employer.id, "雇主登录成功");
        Ok(LoginOutcome { employer, token })
    }

    /// 未知邮箱同样走一次哈希校验，耗时与密码错误一致，结果丢弃
    async fn verify_against_decoy(&self, plaintext: &str) {
        let decoy = self
            .decoy_hash
            .get_or_try_init(|| self.deps.password_hasher.hash(DECOY_PASSWORD))
            .await;
        match decoy {
            Ok(decoy) => {
                let _ = self.deps.password_hasher.verify(plaintext, decoy).await;
            }
            Err(err) => tracing::warn!(error = %err, "占位哈希生成失败"),
        }
    }

    /// 校验令牌并返回其中的身份
    pub fn authenticate(&self, token: &str) -> Result<Identity, ApplicationError> {
        self.deps.token_service.verify(token).map_err(|err| {
            tracing::debug!(error = %err, "token rejected");
            ApplicationError::InvalidToken
        })
    }
}
