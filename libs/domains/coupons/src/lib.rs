//! Coupons Domain
//!
//! Discount coupons with a redemption gate: a coupon can only be
//! fetched by code while it is active, unexpired and under its usage
//! limit. Checkout increments `times_used` on every redeemed coupon.

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{CouponError, CouponResult};
pub use models::{Coupon, CouponKind, CreateCoupon, UpdateCoupon};
pub use postgres::PgCouponRepository;
pub use repository::{CouponRepository, InMemoryCouponRepository};
pub use service::CouponService;
