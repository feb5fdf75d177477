//! Database library for the tienda workspace.
//!
//! Provides the SeaORM PostgreSQL connector (with retrying connect for
//! startup resilience), the migration runner, and a small generic
//! repository base shared by the domain crates.
//!
//! # Example
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::postgres::{self, PostgresConfig};
//! use migration::Migrator;
//!
//! let db = postgres::connect(PostgresConfig::from_env()?).await?;
//! postgres::run_migrations::<Migrator>(&db).await?;
//! ```

pub mod postgres;
pub mod repository;
pub mod retry;

pub use repository::BaseRepository;
pub use retry::RetryConfig;
