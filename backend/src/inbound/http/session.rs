//! Account and session handlers.
//!
//! ```text
//! POST  /api/v1/login     {"email":"manish@example.com","password":"password123","role":"user"}
//! POST  /api/v1/register  {"name":"Alice","email":"a@x.com","password":"secret1","confirmPassword":"secret1"}
//! POST  /api/v1/logout
//! GET   /api/v1/session
//! PATCH /api/v1/users/me  {"name":"Alice B."}
//! ```
//!
//! The desk holds at most one session; these handlers drive it directly
//! rather than issuing cookies.

use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::{LoginCredentials, Registration, RegistrationForm, User, UserUpdate};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, UserSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, auth_validation_error, parse_role};

const ROLE_FIELD: FieldName = FieldName::new("role");

/// Login request body for `POST /api/v1/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Login email.
    #[schema(example = "manish@example.com")]
    pub email: String,
    /// Plain-text password.
    #[schema(example = "password123")]
    pub password: String,
    /// `user` (default) or `admin`; must match the account's role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "user")]
    pub role: Option<String>,
}

/// Registration form for `POST /api/v1/register`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Display name.
    #[schema(example = "Alice")]
    pub name: String,
    /// Login email; must not be registered yet.
    #[schema(example = "a@x.com")]
    pub email: String,
    /// At least six characters.
    pub password: String,
    /// Must equal `password`.
    pub confirm_password: String,
    /// `user` (default) or `admin`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Profile changes for `PATCH /api/v1/users/me`; at least one field.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    /// New display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New login email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Current session.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// `null` when nobody is signed in.
    #[schema(value_type = Option<UserSchema>)]
    pub user: Option<User>,
    /// Whether `user` is present.
    pub is_authenticated: bool,
}

/// Sign in with email, password and role.
///
/// All three must match one account; a mismatch on any of them yields the
/// same `unauthorized` response.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = UserSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "Session could not be saved", body = ErrorSchema)
    ),
    tags = ["session"],
    operation_id = "login"
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<User>> {
    let LoginRequest {
        email,
        password,
        role,
    } = payload.into_inner();
    let password = Zeroizing::new(password);
    let role = parse_role(role.as_deref(), ROLE_FIELD)?;
    let credentials = LoginCredentials::try_from_parts(&email, &password, role)
        .map_err(auth_validation_error)?;

    let mut desk = state.desk().await;
    let user = desk.accounts_mut().login(&credentials).await?;
    Ok(web::Json(user))
}

/// Create an account and sign it in.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created and signed in", body = UserSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 503, description = "Account could not be saved", body = ErrorSchema)
    ),
    tags = ["session"],
    operation_id = "register"
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest {
        name,
        email,
        password,
        confirm_password,
        role,
    } = payload.into_inner();
    let password = Zeroizing::new(password);
    let confirm_password = Zeroizing::new(confirm_password);
    let role = parse_role(role.as_deref(), ROLE_FIELD)?.unwrap_or_default();
    let registration = Registration::try_from_form(&RegistrationForm {
        name: &name,
        email: &email,
        password: &password,
        confirm_password: &confirm_password,
        role,
    })
    .map_err(auth_validation_error)?;

    let mut desk = state.desk().await;
    let user = desk.accounts_mut().register(&registration).await?;
    Ok(HttpResponse::Created().json(user))
}

/// End the session. Always clears it, even when the store write fails.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses(
        (status = 204, description = "Signed out"),
        (status = 503, description = "Signed out, but the stored session could not be removed", body = ErrorSchema)
    ),
    tags = ["session"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let mut desk = state.desk().await;
    desk.accounts_mut().logout().await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Report who is signed in.
#[utoipa::path(
    get,
    path = "/api/v1/session",
    responses((status = 200, description = "Current session", body = SessionResponse)),
    tags = ["session"],
    operation_id = "currentSession"
)]
#[get("/session")]
pub async fn current_session(state: web::Data<HttpState>) -> web::Json<SessionResponse> {
    let desk = state.desk().await;
    let user = desk.accounts().current_user().cloned();
    web::Json(SessionResponse {
        is_authenticated: user.is_some(),
        user,
    })
}

/// Update the signed-in user's name, email or password.
#[utoipa::path(
    patch,
    path = "/api/v1/users/me",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 503, description = "Update could not be saved", body = ErrorSchema)
    ),
    tags = ["session"],
    operation_id = "updateCurrentUser"
)]
#[patch("/users/me")]
pub async fn update_current_user(
    state: web::Data<HttpState>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<User>> {
    let mut desk = state.desk().await;
    desk.require_user()?;
    let UpdateUserRequest {
        name,
        email,
        password,
    } = payload.into_inner();
    let password = password.map(Zeroizing::new);
    let update = UserUpdate::try_from_parts(
        name.as_deref(),
        email.as_deref(),
        password.as_ref().map(|secret| secret.as_str()),
    )
    .map_err(auth_validation_error)?;

    let user = desk.accounts_mut().update_user(&update).await?;
    Ok(web::Json(user))
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
