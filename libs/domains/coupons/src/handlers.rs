use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_helpers::{jwt_auth_middleware, require_mod, JwtAuth, UuidPath, ValidatedJson};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::CouponResult;
use crate::models::{Coupon, CouponKind, CreateCoupon, UpdateCoupon};
use crate::repository::CouponRepository;
use crate::service::CouponService;

const TAG: &str = "coupons";

/// OpenAPI documentation for the Coupons API
#[derive(OpenApi)]
#[openapi(
    paths(list_coupons, get_coupon_by_code, create_coupon, update_coupon, delete_coupon),
    components(schemas(Coupon, CouponKind, CreateCoupon, UpdateCoupon)),
    tags(
        (name = TAG, description = "Discount coupon endpoints")
    )
)]
pub struct ApiDoc;

/// Coupon router. Listing is public, redemption lookup needs a session,
/// mutations are moderated.
pub fn router<R: CouponRepository + 'static>(
    service: CouponService<R>,
    jwt_auth: JwtAuth,
) -> Router {
    let public = Router::new().route("/", get(list_coupons));

    let authed = Router::new()
        .route("/{code}", get(get_coupon_by_code))
        .route_layer(middleware::from_fn_with_state(
            jwt_auth.clone(),
            jwt_auth_middleware,
        ));

    let protected = Router::new()
        .route("/", post(create_coupon))
        .route("/{code}", axum::routing::patch(update_coupon).delete(delete_coupon))
        .route_layer(middleware::from_fn(require_mod))
        .route_layer(middleware::from_fn_with_state(
            jwt_auth,
            jwt_auth_middleware,
        ));

    public
        .merge(authed)
        .merge(protected)
        .with_state(Arc::new(service))
}

/// List all coupons
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    responses(
        (status = 200, description = "List of coupons", body = Vec<Coupon>)
    )
)]
async fn list_coupons<R: CouponRepository>(
    State(service): State<Arc<CouponService<R>>>,
) -> CouponResult<Json<Vec<Coupon>>> {
    let coupons = service.list_coupons().await?;
    Ok(Json(coupons))
}

/// Get a redeemable coupon by code
#[utoipa::path(
    get,
    path = "/{code}",
    tag = TAG,
    params(("code" = String, Path, description = "Coupon code")),
    responses(
        (status = 200, description = "Coupon found and redeemable"),
        (status = 404, description = "Coupon missing, expired, inactive or exhausted")
    )
)]
async fn get_coupon_by_code<R: CouponRepository>(
    State(service): State<Arc<CouponService<R>>>,
    Path(code): Path<String>,
) -> CouponResult<Json<serde_json::Value>> {
    let coupon = service.redeem_coupon(&code).await?;

    Ok(Json(json!({
        "coupon": coupon,
        "message": "Cupón obtenido correctamente",
    })))
}

/// Create a coupon
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateCoupon,
    responses(
        (status = 201, description = "Coupon created"),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Coupon already exists")
    )
)]
async fn create_coupon<R: CouponRepository>(
    State(service): State<Arc<CouponService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateCoupon>,
) -> CouponResult<impl IntoResponse> {
    let coupon = service.create_coupon(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "coupon": coupon,
            "message": "Cupón creado correctamente",
        })),
    ))
}

/// Update a coupon
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Coupon ID")),
    request_body = UpdateCoupon,
    responses(
        (status = 200, description = "Coupon updated"),
        (status = 404, description = "Coupon not found")
    )
)]
async fn update_coupon<R: CouponRepository>(
    State(service): State<Arc<CouponService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateCoupon>,
) -> CouponResult<Json<serde_json::Value>> {
    let coupon = service.update_coupon(id, input).await?;

    Ok(Json(json!({
        "coupon": coupon,
        "message": "Cupón actualizado correctamente",
    })))
}

/// Delete a coupon
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Coupon ID")),
    responses(
        (status = 200, description = "Coupon deleted"),
        (status = 404, description = "Coupon not found")
    )
)]
async fn delete_coupon<R: CouponRepository>(
    State(service): State<Arc<CouponService<R>>>,
    UuidPath(id): UuidPath,
) -> CouponResult<Json<serde_json::Value>> {
    let coupon = service.delete_coupon(id).await?;

    Ok(Json(json!({
        "coupon": coupon,
        "message": "Cupón eliminado exitosamente",
    })))
}
