#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use application::{
    memory::{InMemoryEmployerRepository, InMemoryJobApplicationRepository, InMemoryJobRepository},
    ChannelHub, Clock, InMemoryPresenceRegistry, PasswordHasher, PresenceRegistry, SystemClock,
    TokenService,
};
use axum::Router;
use config::JwtConfig;
use infrastructure::{BcryptPasswordHasher, JwtTokenService};
use tokio::{net::TcpListener, sync::oneshot};
use web_api::{router, AppDependencies, AppState};

pub const TEST_SECRET: &str = "integration-test-secret-with-enough-length";

/// 内存仓储 + 真实 bcrypt / JWT 组装的应用
pub struct TestApp {
    pub router: Router,
    pub presence: Arc<InMemoryPresenceRegistry>,
    pub channel_hub: Arc<ChannelHub>,
    pub applications: InMemoryJobApplicationRepository,
}

pub fn build_app() -> TestApp {
    let presence = Arc::new(InMemoryPresenceRegistry::new());
    let channel_hub = Arc::new(ChannelHub::new());
    let applications = InMemoryJobApplicationRepository::new();

    // 最低 bcrypt 成本，测试更快
    let password_hasher: Arc<dyn PasswordHasher> = Arc::new(BcryptPasswordHasher::new(Some(4)));
    let token_service: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(&JwtConfig {
        secret: TEST_SECRET.to_string(),
    }));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let state = AppState::new(AppDependencies {
        employer_repository: Arc::new(InMemoryEmployerRepository::new()),
        job_repository: Arc::new(InMemoryJobRepository::new()),
        application_repository: Arc::new(applications.clone()),
        password_hasher,
        token_service,
        clock,
        presence: presence.clone(),
        channel_hub: channel_hub.clone(),
    });

    TestApp {
        router: router(state),
        presence,
        channel_hub,
        applications,
    }
}

/// 在随机端口启动服务，丢弃返回的 Sender 即关闭
pub async fn spawn_server(router: Router) -> (SocketAddr, oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .ok();
    });

    (addr, shutdown_tx)
}

/// 轮询直到条件成立，超时则 panic
pub async fn wait_until<F, Fut>(what: &str, mut check: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("timed out waiting for {what}");
}

pub async fn is_registered(
    presence: &InMemoryPresenceRegistry,
    employer_id: domain::EmployerId,
) -> bool {
    matches!(presence.lookup(employer_id).await, Ok(Some(_)))
}
