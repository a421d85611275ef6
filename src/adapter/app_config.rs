use crate::adapter::database_config::DatabaseConfig;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// 設定エラー
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 値を解釈できない
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
    /// 必須の環境変数が設定されていない
    #[error("Missing required configuration: {0}")]
    Missing(&'static str),
}

/// HTTPサーバーの設定
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub jwt_secret: String,
    /// 決済後にブラウザを戻すフロントエンドのURL
    pub frontend_url: String,
}

/// 決済ゲートウェイ（Khalti）の設定
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub secret_key: String,
    pub base_url: String,
    pub return_url: String,
    pub website_url: String,
    pub timeout: Duration,
    pub minimum_amount_paisa: i64,
}

/// アプリケーション全体の設定
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub payment: PaymentConfig,
}

impl AppConfig {
    /// 環境変数から設定を読み取る
    /// JWT_SECRET と KHALTI_SECRET_KEY 以外はデフォルト値を持つ
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
            payment: PaymentConfig::from_env()?,
        })
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            bind_address: var_or("BIND_ADDRESS", "0.0.0.0:3000"),
            jwt_secret: required("JWT_SECRET")?,
            frontend_url: var_or("FRONTEND_URL", "http://localhost:5173"),
        })
    }
}

impl PaymentConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs: u64 = parsed_or("KHALTI_TIMEOUT_SECS", 10)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "KHALTI_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }

        let minimum_amount_paisa: i64 = parsed_or("KHALTI_MIN_AMOUNT_PAISA", 1_000)?;

        Ok(Self {
            secret_key: required("KHALTI_SECRET_KEY")?,
            base_url: var_or("KHALTI_BASE_URL", "https://a.khalti.com/api/v2"),
            return_url: var_or(
                "KHALTI_RETURN_URL",
                "http://localhost:3000/bookings/complete-payment",
            ),
            website_url: var_or("KHALTI_WEBSITE_URL", "http://localhost:5173"),
            timeout: Duration::from_secs(timeout_secs),
            minimum_amount_paisa,
        })
    }
}

pub(crate) fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// 未設定ならデフォルト値、設定されていれば解釈した値
pub(crate) fn parsed_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(format!("Invalid {}: {}", key, e))),
        Err(_) => Ok(default),
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(key)),
    }
}

// テスト間の環境変数の競合を防ぐためのロック
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
