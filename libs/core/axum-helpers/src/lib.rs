//! # Axum Helpers
//!
//! Shared HTTP plumbing for the tienda workspace.
//!
//! ## Modules
//!
//! - **[`auth`]**: cookie/bearer JWT authentication and role gates
//! - **[`errors`]**: the shared [`AppError`] type and its wire format
//! - **[`extractors`]**: custom extractors (UUID path, validated JSON)
//! - **[`pagination`]**: list-query parsing and the pagination envelope
//! - **[`server`]**: router assembly, Swagger UI, graceful shutdown

pub mod auth;
pub mod errors;
pub mod extractors;
pub mod pagination;
pub mod server;

pub use auth::{
    access_cookie, clear_cookie, jwt_auth_middleware, refresh_cookie, require_admin, require_mod,
    JwtAuth, JwtClaims, JwtConfig, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE,
};
pub use errors::{AppError, ErrorResponse};
pub use extractors::{UuidPath, ValidatedJson};
pub use pagination::{comma_separated, ListQuery, Pagination, DEFAULT_PAGE_SIZE};
pub use server::{create_app, create_router, shutdown_signal};
