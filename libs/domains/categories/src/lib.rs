//! Categories Domain
//!
//! Product categories: public catalog lookups plus the moderated CRUD
//! surface.
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_categories::{
//!     handlers,
//!     repository::InMemoryCategoryRepository,
//!     service::CategoryService,
//! };
//! use axum_helpers::{JwtAuth, JwtConfig};
//!
//! let repository = InMemoryCategoryRepository::new();
//! let service = CategoryService::new(repository);
//! let jwt_auth = JwtAuth::new(&JwtConfig::new("a-secret-that-is-at-least-32-chars!!"));
//!
//! let router = handlers::router(service, jwt_auth);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{CategoryError, CategoryResult};
pub use models::{Category, CreateCategory, UpdateCategory};
pub use postgres::PgCategoryRepository;
pub use repository::{CategoryRepository, InMemoryCategoryRepository};
pub use service::CategoryService;
