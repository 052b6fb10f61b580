/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/admin/signup` - Register an admin (starts unverified)
/// - `POST /auth/admin/verify-account` - Redeem the signup code, get a token
/// - `POST /auth/admin/login` - Email + password login
/// - `POST /auth/client/request-code` - Send a client a one-time login code
/// - `POST /auth/client/verify-code` - Redeem a login code, get a token
///
/// Request bodies use the camelCase field names of the original public
/// contract. Every issued token expires after 8 hours.

use crate::{
    app::AppState,
    error::{validation_failed, ApiResult},
    services::auth as auth_service,
};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Admin signup request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdminSignupRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (minimum 8 characters)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Given name
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,

    /// Family name
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
}

/// Admin account verification request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyAccountRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// 6-digit code from the verification email
    #[validate(length(equal = 6, message = "Code must be 6 digits"))]
    pub code: String,
}

/// Admin login request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,
}

/// Client code request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RequestCodeRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Client code verification request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCodeRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// 6-digit code from the login email
    #[validate(length(equal = 6, message = "Code must be 6 digits"))]
    pub code: String,
}

/// Response carrying a session token
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// JWT, 8-hour expiry
    pub token: String,
}

/// Generic message response
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Register a new admin
///
/// Creates an unverified account and emails a verification code. The
/// response intentionally carries no code or token.
///
/// # Errors
///
/// - `409 Conflict`: email already registered (any verification state)
/// - `422 Unprocessable Entity`: validation failed
pub async fn admin_signup(
    State(state): State<AppState>,
    Json(req): Json<AdminSignupRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    req.validate().map_err(validation_failed)?;

    auth_service::signup_admin(
        &state.db,
        state.mailer.as_ref(),
        auth_service::SignupAdmin {
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Account created. Check your email for a verification code.".to_string(),
        }),
    ))
}

/// Redeem an admin verification code
///
/// # Errors
///
/// - `400 Bad Request`: account missing, already verified, or code
///   invalid/expired/used (distinct messages, same status)
pub async fn admin_verify_account(
    State(state): State<AppState>,
    Json(req): Json<VerifyAccountRequest>,
) -> ApiResult<Json<TokenResponse>> {
    req.validate().map_err(validation_failed)?;

    let token =
        auth_service::verify_admin_account(&state.db, state.jwt_secret(), &req.email, &req.code)
            .await?;

    Ok(Json(TokenResponse { token }))
}

/// Admin email + password login
///
/// # Errors
///
/// - `401 Unauthorized`: unknown email or wrong password (identical)
/// - `403 Forbidden`: correct password but account never verified
pub async fn admin_login(
    State(state): State<AppState>,
    Json(req): Json<AdminLoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    req.validate().map_err(validation_failed)?;

    let token =
        auth_service::login_admin(&state.db, state.jwt_secret(), &req.email, &req.password)
            .await?;

    Ok(Json(TokenResponse { token }))
}

/// Request a client login code
///
/// Always returns the same generic success message — the response never
/// reveals whether the email belongs to a client.
pub async fn client_request_code(
    State(state): State<AppState>,
    Json(req): Json<RequestCodeRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate().map_err(validation_failed)?;

    auth_service::request_client_code(&state.db, state.mailer.as_ref(), &req.email).await?;

    Ok(Json(MessageResponse {
        message: "If that email is registered, a login code has been sent.".to_string(),
    }))
}

/// Redeem a client login code
///
/// # Errors
///
/// - `400 Bad Request`: invalid code (generic) or expired code
pub async fn client_verify_code(
    State(state): State<AppState>,
    Json(req): Json<VerifyCodeRequest>,
) -> ApiResult<Json<TokenResponse>> {
    req.validate().map_err(validation_failed)?;

    let token =
        auth_service::verify_client_code(&state.db, state.jwt_secret(), &req.email, &req.code)
            .await?;

    Ok(Json(TokenResponse { token }))
}
