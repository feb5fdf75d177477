//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for the store API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tienda API",
        version = "0.1.0",
        description = "Store backend: catalog, cart validation, coupons, shipping addresses and orders",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    nest(
        (path = "/api/auth", api = domain_users::handlers::AuthApiDoc),
        (path = "/api/users", api = domain_users::handlers::UsersApiDoc),
        (path = "/api/categories", api = domain_categories::handlers::ApiDoc),
        (path = "/api/unities", api = domain_unities::handlers::ApiDoc),
        (path = "/api/coupons", api = domain_coupons::handlers::ApiDoc),
        (path = "/api/products", api = domain_products::handlers::ApiDoc),
        (path = "/api/shippings", api = domain_shippings::handlers::ApiDoc),
        (path = "/api/orders", api = domain_orders::handlers::ApiDoc)
    )
)]
pub struct ApiDoc;
