//! Users Domain
//!
//! Accounts, sessions and password recovery. Login issues a JWT pair
//! delivered through `access_token`/`refresh_token` cookies; recovery
//! goes through single-use codes with a one hour lifetime.

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod password;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{UserError, UserResult};
pub use models::{
    AccountRole, AccountSettings, ChangePassword, LoginUser, NewUser, RegisterUser, ResetCode,
    ResetPasswordConfirm, UpdateUser, User,
};
pub use postgres::PgUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
