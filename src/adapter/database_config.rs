use crate::adapter::app_config::{parsed_or, var_or, ConfigError};
use crate::adapter::database_error::DatabaseError;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySql, Pool};
use std::time::Duration;

/// 接続プールの取得待ち上限
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// MySQLの接続設定
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// DATABASE_* 環境変数から読み取る（すべてデフォルト値あり）
    pub fn from_env() -> Result<Self, ConfigError> {
        let max_connections: u32 = parsed_or("DATABASE_MAX_CONNECTIONS", 10)?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "DATABASE_MAX_CONNECTIONS must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            host: var_or("DATABASE_HOST", "localhost"),
            port: parsed_or("DATABASE_PORT", 3306)?,
            database: var_or("DATABASE_NAME", "hostel_khojau_db"),
            username: var_or("DATABASE_USER", "hostel_user"),
            password: var_or("DATABASE_PASSWORD", "hostel_password"),
            max_connections,
        })
    }

    pub fn connection_string(&self) -> String {
        format!(
            "mysql://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        )
    }

    /// ログ用の接続先（パスワードなし）
    pub fn target(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.database)
    }

    pub async fn connect(&self) -> Result<Pool<MySql>, DatabaseError> {
        MySqlPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(&self.connection_string())
            .await
            .map_err(|e| DatabaseError::ConnectionError(format!("{}: {}", self.target(), e)))
    }
}
