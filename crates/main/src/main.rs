//! 主应用程序入口
//!
//! 读取配置、连接数据库并执行迁移，然后启动 Axum Web API 服务。

use std::sync::Arc;

use anyhow::Context;
use application::{ChannelHub, InMemoryPresenceRegistry, SystemClock};
use config::AppConfig;
use infrastructure::{create_pg_pool, BcryptPasswordHasher, JwtTokenService, PgStorage, MIGRATOR};
use tracing_subscriber::EnvFilter;
use web_api::{router, AppDependencies, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 文件可选
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().context("加载配置失败")?;
    config.validate().context("配置校验失败")?;

    tracing::info!(
        "连接数据库: {}",
        config.database.url.split('@').next_back().unwrap_or("unknown")
    );
    let pg_pool = create_pg_pool(&config.database.url, config.database.max_connections).await?;
    MIGRATOR.run(&pg_pool).await.context("数据库迁移失败")?;

    let storage = PgStorage::new(pg_pool);
    let channel_hub = Arc::new(ChannelHub::new());

    let state = AppState::new(AppDependencies {
        employer_repository: storage.employer_repository.clone(),
        job_repository: storage.job_repository.clone(),
        application_repository: storage.application_repository.clone(),
        password_hasher: Arc::new(BcryptPasswordHasher::new(config.server.bcrypt_cost)),
        token_service: Arc::new(JwtTokenService::new(&config.jwt)),
        clock: Arc::new(SystemClock),
        presence: Arc::new(InMemoryPresenceRegistry::new()),
        channel_hub,
    });

    let app = router(state);
    let bind_address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("无法监听 {bind_address}"))?;

    tracing::info!("职位服务启动在 http://{bind_address}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    tracing::info!("收到关闭信号，开始优雅退出");
}
