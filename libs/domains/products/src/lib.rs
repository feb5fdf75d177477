//! Products Domain
//!
//! The product catalog and its image sets. Products carry a dense
//! `display_order` (1..N, no gaps): creation appends at the end,
//! deletion compacts the sequence, and the reorder operations shift
//! neighbors atomically. Images follow the same ordering scheme within
//! their parent product, capped at five per product.
//!
//! Also hosts the read-side cart validation, the mass price adjustment
//! and the xlsx catalog export.

pub mod entity;
pub mod error;
pub mod export;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod slug;

pub use error::{ProductError, ProductResult};
pub use models::{
    CartItem, ChangePrices, CreateImages, CreateProduct, Product, ProductFilters, ProductImage,
    ReorderItem, UpdateProduct, ValidatedCartItem, PRODUCT_IMAGE_LIMIT,
};
pub use postgres::PgProductRepository;
pub use repository::{InMemoryProductRepository, ProductRepository};
pub use service::ProductService;
