//! 统一配置中心
//!
//! 所有配置都来自环境变量，包括：
//! - 服务监听地址与端口
//! - 数据库连接
//! - JWT 签名密钥

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// 全局应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 数据库配置
    pub database: DatabaseConfig,
    /// JWT认证配置
    pub jwt: JwtConfig,
    /// 服务配置
    pub server: ServerConfig,
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// JWT配置。令牌有效期固定为一小时，不可配置。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub bcrypt_cost: Option<u32>,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const MIN_JWT_SECRET_LEN: usize = 32;

impl AppConfig {
    /// 从环境变量加载配置。
    /// DATABASE_URL 与 JWT_SECRET 没有默认值，缺失时返回错误。
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源加载配置，空字符串视为未设置
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => parse_var::<u16>("PORT", &raw)
                .map_err(|_| ConfigError::InvalidServerPort(raw.clone()))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            database: DatabaseConfig {
                url: get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
                max_connections: get("DB_MAX_CONNECTIONS")
                    .map(|raw| parse_var("DB_MAX_CONNECTIONS", &raw))
                    .transpose()?
                    .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            },
            jwt: JwtConfig {
                secret: get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            },
            server: ServerConfig {
                host: get("SERVER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port,
                bcrypt_cost: get("BCRYPT_COST")
                    .map(|raw| parse_var("BCRYPT_COST", &raw))
                    .transpose()?,
            },
        })
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::InvalidDatabaseUrl(
                "Database URL cannot be empty".to_string(),
            ));
        }

        // 至少 256 位
        if self.jwt.secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::InvalidJwtSecret(format!(
                "JWT secret must be at least {MIN_JWT_SECRET_LEN} characters long"
            )));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidDatabaseConfig(
                "Max connections must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::InvalidServerPort("0".to_string()));
        }

        if let Some(cost) = self.server.bcrypt_cost {
            if !(10..=14).contains(&cost) {
                return Err(ConfigError::InvalidServerConfig(
                    "bcrypt cost should be between 10-14 for security".to_string(),
                ));
            }
        }

        Ok(())
    }
}

fn parse_var<T: FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: raw.to_string(),
    })
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),
    #[error("Invalid JWT secret: {0}")]
    InvalidJwtSecret(String),
    #[error("Invalid server port: {0}")]
    InvalidServerPort(String),
    #[error("Invalid database configuration: {0}")]
    InvalidDatabaseConfig(String),
    #[error("Invalid server configuration: {0}")]
    InvalidServerConfig(String),
}
