use sqlx::migrate::Migrator;

/// 仓库根目录 `migrations/` 下的 SQL 迁移，启动时执行
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");
