//! Tienda API - REST backend for the store

use axum::Router;
use axum_helpers::JwtAuth;
use core_config::tracing::{init_tracing, install_color_eyre};
use database::{postgres, RetryConfig};
use domain_categories::{CategoryService, PgCategoryRepository};
use domain_coupons::{CouponService, PgCouponRepository};
use domain_orders::{OrderService, PgOrderRepository};
use domain_products::{PgProductRepository, ProductService};
use domain_shippings::{PgShippingRepository, ShippingService};
use domain_unities::{PgUnityRepository, UnityService};
use domain_users::{PgUserRepository, UserService};
use std::sync::Arc;
use tracing::info;

mod config;
mod openapi;

use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let db = postgres::connect_with_retry(config.database.clone(), RetryConfig::default()).await?;
    postgres::run_migrations::<migration::Migrator>(&db).await?;

    let jwt_auth = JwtAuth::new(&config.jwt);
    let secure_cookies = config.environment.use_https();

    let user_service = Arc::new(UserService::new(PgUserRepository::new(db.clone())));
    let category_service = CategoryService::new(PgCategoryRepository::new(db.clone()));
    let unity_service = UnityService::new(PgUnityRepository::new(db.clone()));
    let coupon_service = CouponService::new(PgCouponRepository::new(db.clone()));
    let product_service = ProductService::new(PgProductRepository::new(db.clone()));
    let shipping_service = ShippingService::new(PgShippingRepository::new(db.clone()));
    let order_service = OrderService::new(PgOrderRepository::new(db.clone()));

    let api_routes = Router::new()
        .nest(
            "/auth",
            domain_users::handlers::auth_router(
                Arc::clone(&user_service),
                jwt_auth.clone(),
                secure_cookies,
            ),
        )
        .nest(
            "/users",
            domain_users::handlers::users_router(user_service, jwt_auth.clone()),
        )
        .nest(
            "/categories",
            domain_categories::handlers::router(category_service, jwt_auth.clone()),
        )
        .nest(
            "/unities",
            domain_unities::handlers::router(unity_service, jwt_auth.clone()),
        )
        .nest(
            "/coupons",
            domain_coupons::handlers::router(coupon_service, jwt_auth.clone()),
        )
        .nest(
            "/products",
            domain_products::handlers::router(product_service, jwt_auth.clone()),
        )
        .nest(
            "/shippings",
            domain_shippings::handlers::router(shipping_service, jwt_auth.clone()),
        )
        .nest(
            "/orders",
            domain_orders::handlers::router(order_service, jwt_auth),
        );

    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes);

    info!("Starting Tienda API on port {}", config.server.port);

    axum_helpers::create_app(router, &config.server).await?;

    info!("Tienda API shutdown complete");
    Ok(())
}
