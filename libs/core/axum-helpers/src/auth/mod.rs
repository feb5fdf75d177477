pub mod config;
pub mod cookies;
pub mod jwt;
pub mod middleware;

pub use config::JwtConfig;
pub use cookies::{
    access_cookie, clear_cookie, refresh_cookie, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE,
};
pub use jwt::{JwtAuth, JwtClaims, ACCESS_TOKEN_TTL, REFRESH_TOKEN_TTL};
pub use middleware::{jwt_auth_middleware, require_admin, require_mod};
