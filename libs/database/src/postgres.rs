use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::{info, log::LevelFilter};

use core_config::{env_or_default, env_required, ConfigError, FromEnv};

use crate::retry::{retry_with_backoff, RetryConfig};

/// PostgreSQL connection pool configuration, loadable from the environment.
#[derive(Clone, Debug)]
pub struct PostgresConfig {
    /// Database connection URL (required)
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub acquire_timeout_secs: u64,

    /// Enable SQL query logging
    pub sqlx_logging: bool,
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 100,
            min_connections: 5,
            acquire_timeout_secs: 8,
            sqlx_logging: true,
        }
    }

    pub fn into_connect_options(self) -> ConnectOptions {
        let mut opt = ConnectOptions::new(&self.url);
        opt.max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect_timeout(Duration::from_secs(8))
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
            .sqlx_logging(self.sqlx_logging)
            .sqlx_logging_level(LevelFilter::Debug);
        opt
    }
}

/// Environment variables:
/// - `DATABASE_URL` (required)
/// - `DB_MAX_CONNECTIONS` (optional, default: 100)
/// - `DB_MIN_CONNECTIONS` (optional, default: 5)
/// - `DB_ACQUIRE_TIMEOUT_SECS` (optional, default: 8)
/// - `DB_SQLX_LOGGING` (optional, default: true)
impl FromEnv for PostgresConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let url = env_required("DATABASE_URL")?;

        let max_connections = env_or_default("DB_MAX_CONNECTIONS", "100")
            .parse()
            .map_err(|e| ConfigError::ParseError {
                key: "DB_MAX_CONNECTIONS".to_string(),
                details: format!("{}", e),
            })?;

        let min_connections = env_or_default("DB_MIN_CONNECTIONS", "5")
            .parse()
            .map_err(|e| ConfigError::ParseError {
                key: "DB_MIN_CONNECTIONS".to_string(),
                details: format!("{}", e),
            })?;

        let acquire_timeout_secs = env_or_default("DB_ACQUIRE_TIMEOUT_SECS", "8")
            .parse()
            .map_err(|e| ConfigError::ParseError {
                key: "DB_ACQUIRE_TIMEOUT_SECS".to_string(),
                details: format!("{}", e),
            })?;

        let sqlx_logging = env_or_default("DB_SQLX_LOGGING", "true")
            .parse()
            .map_err(|e| ConfigError::ParseError {
                key: "DB_SQLX_LOGGING".to_string(),
                details: format!("{}", e),
            })?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            sqlx_logging,
        })
    }
}

/// Connect to PostgreSQL using the given configuration.
pub async fn connect(config: PostgresConfig) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(config.into_connect_options()).await?;
    info!("Connected to PostgreSQL");
    Ok(db)
}

/// Connect with retry. Useful during startup when Postgres may not be ready yet.
pub async fn connect_with_retry(
    config: PostgresConfig,
    retry_config: RetryConfig,
) -> Result<DatabaseConnection, DbErr> {
    retry_with_backoff(
        || {
            let config = config.clone();
            connect(config)
        },
        retry_config,
    )
    .await
}

/// Run all pending migrations for the given migrator.
pub async fn run_migrations<M: MigratorTrait>(db: &DatabaseConnection) -> Result<(), DbErr> {
    info!("Running database migrations");
    M::up(db, None).await?;
    info!("Migrations completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = PostgresConfig::new("postgresql://localhost/tienda");
        assert_eq!(config.url, "postgresql://localhost/tienda");
        assert_eq!(config.max_connections, 100);
        assert_eq!(config.min_connections, 5);
        assert!(config.sqlx_logging);
    }

    #[test]
    fn from_env_minimal() {
        temp_env::with_var("DATABASE_URL", Some("postgresql://localhost/tienda"), || {
            let config = PostgresConfig::from_env().unwrap();
            assert_eq!(config.url, "postgresql://localhost/tienda");
            assert_eq!(config.max_connections, 100);
        });
    }

    #[test]
    fn from_env_custom_pool() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgresql://localhost/tienda")),
                ("DB_MAX_CONNECTIONS", Some("20")),
                ("DB_MIN_CONNECTIONS", Some("2")),
            ],
            || {
                let config = PostgresConfig::from_env().unwrap();
                assert_eq!(config.max_connections, 20);
                assert_eq!(config.min_connections, 2);
            },
        );
    }

    #[test]
    fn from_env_missing_url() {
        temp_env::with_var_unset("DATABASE_URL", || {
            let err = PostgresConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("DATABASE_URL"));
        });
    }

    #[test]
    fn from_env_invalid_number() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgresql://localhost/tienda")),
                ("DB_MAX_CONNECTIONS", Some("many")),
            ],
            || {
                let err = PostgresConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("DB_MAX_CONNECTIONS"));
            },
        );
    }
}
