//! Shippings Domain
//!
//! Per-user shipping addresses. Every operation is scoped to the
//! authenticated owner; state/country consistency is validated against
//! the supported country list.

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{ShippingError, ShippingResult};
pub use models::{CreateShippingAddress, ShippingAddress, UpdateShippingAddress, VENEZUELA_STATES};
pub use postgres::PgShippingRepository;
pub use repository::{InMemoryShippingRepository, ShippingRepository};
pub use service::ShippingService;
