//! Orders Domain
//!
//! Placed orders with client-generated `ORD-` references, their item
//! snapshots and the coupon redemption that accompanies checkout.
//! Order creation, its item inserts and the coupon usage increment
//! commit as one atomic unit.

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{OrderError, OrderResult};
pub use models::{CreateOrder, Order, OrderItem, OrderLine};
pub use postgres::PgOrderRepository;
pub use repository::{InMemoryOrderRepository, OrderRepository};
pub use service::OrderService;
