//! Unities Domain
//!
//! Units of measure ("unities") used by products, e.g. kilogram or
//! bundle. Public lookups plus the moderated CRUD surface.

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{UnityError, UnityResult};
pub use models::{CreateUnity, Unity, UpdateUnity};
pub use postgres::PgUnityRepository;
pub use repository::{InMemoryUnityRepository, UnityRepository};
pub use service::UnityService;
