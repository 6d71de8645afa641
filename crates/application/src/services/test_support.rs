//! 服务测试用的替身实现

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use domain::{
    EmailAddress, Employer, EmployerId, JobApplication, JobId, PasswordHash, RepositoryError,
    Timestamp,
};
use time::OffsetDateTime;
use tokio::sync::{mpsc, Mutex};

use crate::{
    clock::Clock,
    error::ApplicationError,
    notifier::{DispatchError, NotificationDispatcher, NotificationEvent},
    password::{PasswordHasher, PasswordHasherError},
    presence::{ChannelId, PresenceRegistry},
    repository::JobApplicationRepository,
    token::{Identity, IssuedToken, TokenError, TokenService},
};

pub struct FixedClock(pub Timestamp);

impl Default for FixedClock {
    fn default() -> Self {
        Self(OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

/// 明文前缀“哈希”，避免测试中调用 bcrypt
#[derive(Default)]
pub struct FakePasswordHasher;

#[async_trait]
impl PasswordHasher for FakePasswordHasher {
    async fn hash(&self, plaintext: &str) -> Result<PasswordHash, PasswordHasherError> {
        PasswordHash::new(format!("hashed:{plaintext}"))
            .map_err(|err| PasswordHasherError::Hashing(err.to_string()))
    }

    async fn verify(
        &self,
        plaintext: &str,
        hashed: &PasswordHash,
    ) -> Result<bool, PasswordHasherError> {
        Ok(hashed.as_str() == format!("hashed:{plaintext}"))
    }
}

/// 在 `FakePasswordHasher` 外记录调用次数
#[derive(Default)]
pub struct CountingPasswordHasher {
    inner: FakePasswordHasher,
    hashes: AtomicUsize,
    verifies: AtomicUsize,
}

impl CountingPasswordHasher {
    pub fn hashes(&self) -> usize {
        self.hashes.load(Ordering::SeqCst)
    }

    pub fn verifies(&self) -> usize {
        self.verifies.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PasswordHasher for CountingPasswordHasher {
    async fn hash(&self, plaintext: &str) -> Result<PasswordHash, PasswordHasherError> {
        self.hashes.fetch_add(1, Ordering::SeqCst);
        self.inner.hash(plaintext).await
    }

    async fn verify(
        &self,
        plaintext: &str,
        hashed: &PasswordHash,
    ) -> Result<bool, PasswordHasherError> {
        self.verifies.fetch_add(1, Ordering::SeqCst);
        self.inner.verify(plaintext, hashed).await
    }
}

/// 令牌格式为 `employer_id|email`
#[derive(Default)]
pub struct FakeTokenService;

impl FakeTokenService {
    pub fn token_for(employer_id: EmployerId, email: &str) -> String {
        format!("{employer_id}|{email}")
    }
}

impl TokenService for FakeTokenService {
    fn issue(&self, employer: &Employer) -> Result<IssuedToken, TokenError> {
        Ok(IssuedToken {
            token: Self::token_for(employer.id, employer.email.as_str()),
            expires_at: OffsetDateTime::UNIX_EPOCH,
        })
    }

    fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let (id, email) = token
            .split_once('|')
            .ok_or_else(|| TokenError::Invalid("malformed".into()))?;
        Ok(Identity {
            employer_id: EmployerId::parse(id)
                .map_err(|err| TokenError::Invalid(err.to_string()))?,
            email: EmailAddress::parse("email", email)
                .map_err(|err| TokenError::Invalid(err.to_string()))?,
        })
    }
}

pub fn identity(employer_id: EmployerId) -> Identity {
    Identity {
        employer_id,
        email: EmailAddress::parse("email", "owner@example.com").unwrap(),
    }
}

/// 记录所有派发的通知
pub struct RecordingDispatcher {
    tx: mpsc::UnboundedSender<(ChannelId, NotificationEvent)>,
    rx: Mutex<mpsc::UnboundedReceiver<(ChannelId, NotificationEvent)>>,
}

impl RecordingDispatcher {
    pub fn new() -> Arc<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            tx,
            rx: Mutex::new(rx),
        })
    }

    /// 等待下一条通知，超时返回 None
    pub async fn next(&self, wait: Duration) -> Option<(ChannelId, NotificationEvent)> {
        let mut rx = self.rx.lock().await;
        tokio::time::timeout(wait, rx.recv()).await.ok().flatten()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn dispatch(
        &self,
        channel_id: ChannelId,
        event: NotificationEvent,
    ) -> Result<(), DispatchError> {
        let _ = self.tx.send((channel_id, event));
        Ok(())
    }
}

pub struct FailingDispatcher;

#[async_trait]
impl NotificationDispatcher for FailingDispatcher {
    async fn dispatch(
        &self,
        channel_id: ChannelId,
        _event: NotificationEvent,
    ) -> Result<(), DispatchError> {
        Err(DispatchError::ChannelClosed(channel_id))
    }
}

pub struct FailingPresence;

#[async_trait]
impl PresenceRegistry for FailingPresence {
    async fn register(&self, _: EmployerId, _: ChannelId) -> Result<(), ApplicationError> {
        Err(ApplicationError::infrastructure("presence offline"))
    }

    async fn unregister(&self, _: ChannelId) -> Result<(), ApplicationError> {
        Err(ApplicationError::infrastructure("presence offline"))
    }

    async fn lookup(&self, _: EmployerId) -> Result<Option<ChannelId>, ApplicationError> {
        Err(ApplicationError::infrastructure("presence offline"))
    }
}

pub struct FailingApplicationRepository;

#[async_trait]
impl JobApplicationRepository for FailingApplicationRepository {
    async fn create(&self, _: JobApplication) -> Result<JobApplication, RepositoryError> {
        Err(RepositoryError::storage("connection reset"))
    }

    async fn list_by_job(&self, _: JobId) -> Result<Vec<JobApplication>, RepositoryError> {
        Err(RepositoryError::storage("connection reset"))
    }
}
