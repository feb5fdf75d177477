//! Configuration for the store API

use axum_helpers::JwtConfig;
use core_config::{server::ServerConfig, FromEnv};
use database::postgres::PostgresConfig;

pub use core_config::Environment;

/// Application configuration, assembled from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: PostgresConfig,
    pub jwt: JwtConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;
        let database = PostgresConfig::from_env()?;
        let jwt = JwtConfig::from_env()?;

        Ok(Self {
            environment,
            server,
            database,
            jwt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_reads_the_full_stack() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgresql://localhost/tienda")),
                ("JWT_SECRET", Some("a-secret-that-is-at-least-32-chars!!")),
                ("PORT", Some("4000")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.server.port, 4000);
            },
        );
    }

    #[test]
    fn missing_database_url_fails() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", None),
                ("JWT_SECRET", Some("a-secret-that-is-at-least-32-chars!!")),
            ],
            || {
                assert!(Config::from_env().is_err());
            },
        );
    }
}
