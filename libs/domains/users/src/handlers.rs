use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use axum_helpers::{
    access_cookie, clear_cookie, jwt_auth_middleware, refresh_cookie, require_admin, require_mod,
    JwtAuth,
    JwtClaims, ListQuery, Pagination, UuidPath, ValidatedJson, ACCESS_TOKEN_COOKIE,
    REFRESH_TOKEN_COOKIE,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{
    AccountRole, AccountSettings, ChangePassword, LoginUser, RegisterUser, ResetPasswordConfirm,
    UpdateUser, User,
};
use crate::repository::UserRepository;
use crate::service::UserService;

const AUTH_TAG: &str = "auth";
const USERS_TAG: &str = "users";

/// OpenAPI documentation for the Auth API
#[derive(OpenApi)]
#[openapi(
    paths(
        login,
        register,
        logout,
        reset_password_send,
        reset_password_validate,
        reset_password_confirm,
    ),
    components(schemas(
        User,
        RegisterUser,
        LoginUser,
        ResetPasswordConfirm,
        ResetPasswordRequest,
        ResetPasswordCode,
    )),
    tags(
        (name = AUTH_TAG, description = "Session and password recovery endpoints")
    )
)]
pub struct AuthApiDoc;

/// OpenAPI documentation for the Users API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_users,
        current_user,
        get_user,
        update_profile,
        change_password,
        change_account_option,
    ),
    components(schemas(
        User,
        UpdateUser,
        ChangePassword,
        AccountSettings,
        AccountRole,
    )),
    tags(
        (name = USERS_TAG, description = "Account endpoints")
    )
)]
pub struct UsersApiDoc;

/// Shared state for session handlers that mint tokens.
pub struct AuthState<R: UserRepository> {
    service: Arc<UserService<R>>,
    jwt_auth: JwtAuth,
    secure_cookies: bool,
}

impl<R: UserRepository> Clone for AuthState<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            jwt_auth: self.jwt_auth.clone(),
            secure_cookies: self.secure_cookies,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResetPasswordCode {
    pub code: String,
}

/// Session router: login, registration, logout and password recovery.
pub fn auth_router<R: UserRepository + 'static>(
    service: Arc<UserService<R>>,
    jwt_auth: JwtAuth,
    secure_cookies: bool,
) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/logout", post(logout))
        .route("/reset-password", post(reset_password_send))
        .route("/reset-password/validate", post(reset_password_validate))
        .route("/reset-password/{code}", post(reset_password_confirm))
        .with_state(AuthState {
            service,
            jwt_auth,
            secure_cookies,
        })
}

/// Account router: listing, profiles, password changes and the admin
/// account toggle. Everything needs a session.
pub fn users_router<R: UserRepository + 'static>(
    service: Arc<UserService<R>>,
    jwt_auth: JwtAuth,
) -> Router {
    let moderated = Router::new()
        .route("/", get(list_users))
        .route_layer(middleware::from_fn(require_mod))
        .route(
            "/change-account-option/{id}",
            patch(change_account_option).route_layer(middleware::from_fn(require_admin)),
        );

    let personal = Router::new()
        .route("/me", get(current_user))
        .route("/{id}", get(get_user).patch(update_profile))
        .route("/change-password/{id}", patch(change_password));

    moderated
        .merge(personal)
        .route_layer(middleware::from_fn_with_state(
            jwt_auth,
            jwt_auth_middleware,
        ))
        .with_state(service)
}

fn claims_user_id(claims: &JwtClaims) -> UserResult<Uuid> {
    claims
        .sub
        .parse()
        .map_err(|_| UserError::Validation("Usuario inválido".to_string()))
}

/// Log in with email and password, setting the session cookies
#[utoipa::path(
    post,
    path = "/login",
    tag = AUTH_TAG,
    request_body = LoginUser,
    responses(
        (status = 200, description = "Logged in, cookies set"),
        (status = 401, description = "Wrong password"),
        (status = 404, description = "Unknown account")
    )
)]
async fn login<R: UserRepository>(
    State(state): State<AuthState<R>>,
    jar: CookieJar,
    ValidatedJson(input): ValidatedJson<LoginUser>,
) -> UserResult<impl IntoResponse> {
    let user = state.service.login(input).await?;
    let roles = user.roles();

    let access_token = state
        .jwt_auth
        .create_access_token(&user.id.to_string(), &user.email, &user.name, &roles)
        .map_err(|e| {
            tracing::error!("Failed to sign access token: {:?}", e);
            UserError::Internal("Error interno del servidor".to_string())
        })?;
    let refresh_token = state
        .jwt_auth
        .create_refresh_token(&user.id.to_string(), &user.email, &user.name, &roles)
        .map_err(|e| {
            tracing::error!("Failed to sign refresh token: {:?}", e);
            UserError::Internal("Error interno del servidor".to_string())
        })?;

    let jar = jar
        .add(access_cookie(access_token, state.secure_cookies))
        .add(refresh_cookie(refresh_token, state.secure_cookies));

    Ok((
        jar,
        Json(json!({
            "user": user,
            "message": "Logged in successfully",
        })),
    ))
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/register",
    tag = AUTH_TAG,
    request_body = RegisterUser,
    responses(
        (status = 201, description = "Account created"),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered")
    )
)]
async fn register<R: UserRepository>(
    State(state): State<AuthState<R>>,
    ValidatedJson(input): ValidatedJson<RegisterUser>,
) -> UserResult<impl IntoResponse> {
    let user = state.service.register(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "user": { "id": user.id, "email": user.email },
            "message": "Account created successfully. Please login",
        })),
    ))
}

/// Log out, clearing the session cookies
#[utoipa::path(
    post,
    path = "/logout",
    tag = AUTH_TAG,
    responses((status = 200, description = "Cookies cleared"))
)]
async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar
        .add(clear_cookie(ACCESS_TOKEN_COOKIE))
        .add(clear_cookie(REFRESH_TOKEN_COOKIE));

    (jar, Json(json!({ "message": "Logged out successfully" })))
}

/// Request a password recovery code
#[utoipa::path(
    post,
    path = "/reset-password",
    tag = AUTH_TAG,
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Recovery code issued"),
        (status = 404, description = "Unknown account")
    )
)]
async fn reset_password_send<R: UserRepository>(
    State(state): State<AuthState<R>>,
    Json(input): Json<ResetPasswordRequest>,
) -> UserResult<Json<serde_json::Value>> {
    state.service.reset_password_send(&input.email).await?;

    Ok(Json(json!({
        "message": "Correo electrónico enviado exitosamente",
    })))
}

/// Check a recovery code without consuming it
#[utoipa::path(
    post,
    path = "/reset-password/validate",
    tag = AUTH_TAG,
    request_body = ResetPasswordCode,
    responses(
        (status = 200, description = "Code is valid"),
        (status = 400, description = "Code already used"),
        (status = 401, description = "Code expired"),
        (status = 404, description = "Unknown code")
    )
)]
async fn reset_password_validate<R: UserRepository>(
    State(state): State<AuthState<R>>,
    Json(input): Json<ResetPasswordCode>,
) -> UserResult<Json<serde_json::Value>> {
    let reset = state.service.reset_password_validate(&input.code).await?;

    Ok(Json(json!({
        "message": "Código de seguridad válido",
        "code": reset.code,
    })))
}

/// Confirm a recovery code and set the new password
#[utoipa::path(
    post,
    path = "/reset-password/{code}",
    tag = AUTH_TAG,
    params(("code" = String, Path, description = "Recovery code")),
    request_body = ResetPasswordConfirm,
    responses(
        (status = 200, description = "Password replaced"),
        (status = 404, description = "Unknown code")
    )
)]
async fn reset_password_confirm<R: UserRepository>(
    State(state): State<AuthState<R>>,
    Path(code): Path<String>,
    ValidatedJson(input): ValidatedJson<ResetPasswordConfirm>,
) -> UserResult<Json<serde_json::Value>> {
    if code.is_empty() {
        return Err(UserError::Validation(
            "El código de seguridad es obligatorio".to_string(),
        ));
    }

    state.service.reset_password_confirm(&code, input).await?;

    Ok(Json(json!({
        "message": "Contraseña restablecida exitosamente.",
    })))
}

/// Paginated account listing with search
#[utoipa::path(
    get,
    path = "",
    tag = USERS_TAG,
    params(ListQuery),
    responses((status = 200, description = "Page of accounts"))
)]
async fn list_users<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    axum::extract::Query(query): axum::extract::Query<ListQuery>,
) -> UserResult<Json<serde_json::Value>> {
    let (users, total) = service
        .list_users(query.offset(), query.limit(), query.search())
        .await?;

    Ok(Json(json!({
        "objects": users,
        "pagination": Pagination::new(query.page(), query.limit(), total),
    })))
}

/// The authenticated user's own account
#[utoipa::path(
    get,
    path = "/me",
    tag = USERS_TAG,
    responses((status = 200, description = "Current account", body = User))
)]
async fn current_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Extension(claims): Extension<JwtClaims>,
) -> UserResult<Json<User>> {
    let user = service.get_user(claims_user_id(&claims)?).await?;
    Ok(Json(user))
}

/// Get an account by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = USERS_TAG,
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Account found", body = User),
        (status = 404, description = "Account not found")
    )
)]
async fn get_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    UuidPath(id): UuidPath,
) -> UserResult<Json<User>> {
    let user = service.get_user(id).await?;
    Ok(Json(user))
}

/// Update a profile, allowed for the owner or an admin
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = USERS_TAG,
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "Profile updated", body = User),
        (status = 401, description = "Not the owner nor an admin")
    )
)]
async fn update_profile<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Extension(claims): Extension<JwtClaims>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateUser>,
) -> UserResult<Json<User>> {
    let actor_id = claims_user_id(&claims)?;
    let user = service
        .update_profile(id, actor_id, claims.is_admin(), input)
        .await?;
    Ok(Json(user))
}

/// Change the password, logging the session out afterwards
#[utoipa::path(
    patch,
    path = "/change-password/{id}",
    tag = USERS_TAG,
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = ChangePassword,
    responses(
        (status = 200, description = "Password changed, cookies cleared"),
        (status = 400, description = "Wrong current password")
    )
)]
async fn change_password<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    jar: CookieJar,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<ChangePassword>,
) -> UserResult<impl IntoResponse> {
    service.change_password(id, input).await?;

    let jar = jar
        .add(clear_cookie(ACCESS_TOKEN_COOKIE))
        .add(clear_cookie(REFRESH_TOKEN_COOKIE));

    Ok((
        jar,
        Json(json!({ "message": "Contraseña cambiada correctamente" })),
    ))
}

/// Admin toggle for activation and the mod role
#[utoipa::path(
    patch,
    path = "/change-account-option/{id}",
    tag = USERS_TAG,
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = AccountSettings,
    responses(
        (status = 200, description = "Account updated"),
        (status = 404, description = "Account not found")
    )
)]
async fn change_account_option<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    UuidPath(id): UuidPath,
    Json(settings): Json<AccountSettings>,
) -> UserResult<Json<serde_json::Value>> {
    let user = service.change_account_options(id, settings).await?;

    Ok(Json(json!({
        "user": user,
        "message": "Usuario actualizado correctamente",
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryUserRepository;
    use axum::body::Body;
    use axum::http::Request;
    use axum_helpers::JwtConfig;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn jwt_auth() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("test-secret-that-is-long-enough-123"))
    }

    fn app() -> (Router, Arc<UserService<InMemoryUserRepository>>, JwtAuth) {
        let service = Arc::new(UserService::new(InMemoryUserRepository::new()));
        let auth = jwt_auth();
        let router = Router::new()
            .nest("/auth", auth_router(Arc::clone(&service), auth.clone(), false))
            .nest("/users", users_router(Arc::clone(&service), auth.clone()));
        (router, service, auth)
    }

    const REGISTER_BODY: &str = r#"{
        "email": "maria@example.com",
        "name": "María",
        "lastName": "Pérez",
        "password": "secreto-123",
        "passwordConfirm": "secreto-123"
    }"#;

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn register_and_login_sets_cookies() {
        let (app, _, _) = app();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/auth/register")
                    .header("content-type", "application/json")
                    .body(Body::from(REGISTER_BODY))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/auth/login")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"email":"maria@example.com","password":"secreto-123"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookies: Vec<_> = response
            .headers()
            .get_all("set-cookie")
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert!(cookies.iter().any(|c| c.starts_with("access_token=")));
        assert!(cookies.iter().any(|c| c.starts_with("refresh_token=")));

        let body = json_body(response).await;
        assert_eq!(body["message"], "Logged in successfully");
        assert!(body["user"].get("password").is_none());
        assert!(body["user"].get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn me_requires_session() {
        let (app, _, _) = app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/users/me")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn user_list_is_moderated() {
        let (app, service, auth) = app();
        let user = service
            .register(serde_json::from_str(REGISTER_BODY).unwrap())
            .await
            .unwrap();
        let token = auth
            .create_access_token(&user.id.to_string(), &user.email, &user.name, &[])
            .unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/users")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn reset_password_confirm_is_a_post() {
        let (app, service, _) = app();
        service
            .register(serde_json::from_str(REGISTER_BODY).unwrap())
            .await
            .unwrap();
        let reset = service
            .reset_password_send("maria@example.com")
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/auth/reset-password/{}", reset.code))
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"newPassword":"otra-clave-123","newPasswordConfirm":"otra-clave-123"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Contraseña restablecida exitosamente.");

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/auth/login")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"email":"maria@example.com","password":"otra-clave-123"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn logout_clears_cookies() {
        let (app, _, _) = app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/auth/logout")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookies: Vec<_> = response
            .headers()
            .get_all("set-cookie")
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert!(cookies.iter().any(|c| c.contains("access_token=") && c.contains("Max-Age=0")));
    }
}
