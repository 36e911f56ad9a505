//! Authentication handlers: signup, login, token refresh, logout, profile

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use financeflow_core::auth::{hash_password, verify_password, MIN_PASSWORD_LEN};
use financeflow_core::models::UserProfile;

use super::ApiJson;
use crate::{AppError, AppState, CurrentUser, MessageResponse};

#[derive(Debug, Default, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub message: String,
    pub user: UserProfile,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Non-empty, trimmed field value
fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Mint an access/refresh pair and record the refresh token
fn issue_tokens(state: &AppState, user: &UserProfile) -> Result<TokenPair, AppError> {
    let jwt = state.jwt()?;
    let access_token = jwt.issue_access_token(user)?;
    let refresh = jwt.issue_refresh_token(&user.id)?;
    state
        .db
        .store_refresh_token(&refresh.token_id, &user.id, refresh.expires_at)?;

    Ok(TokenPair {
        access_token,
        refresh_token: refresh.token,
    })
}

/// POST /api/auth/signup - Create an account
pub async fn signup(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> Result<Response, AppError> {
    let (Some(name), Some(email), Some(password)) = (
        required(&req.name),
        required(&req.email),
        req.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::bad_request(
            "Name, email, and password are required",
        ));
    };

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::bad_request(&format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }

    if state.db.get_user_by_email(email)?.is_some() {
        return Err(AppError::conflict("User with this email already exists"));
    }

    let password = password.to_string();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;

    let user = state
        .db
        .create_user(email, name, &password_hash)
        .map_err(AppError::from_core)?
        .profile();
    let tokens = issue_tokens(&state, &user)?;

    info!(user = %user.id, "User signed up");

    let body = AuthResponse {
        message: "User created successfully".to_string(),
        user,
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    };
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

/// POST /api/auth/login - Exchange credentials for tokens
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let (Some(email), Some(password)) = (
        required(&req.email),
        req.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::bad_request("Email and password are required"));
    };

    let Some(user) = state.db.get_user_by_email(email)? else {
        warn!("Login attempt for unknown email");
        return Err(AppError::unauthorized("Invalid email or password"));
    };

    let password = password.to_string();
    let stored_hash = user.password_hash.clone();
    let valid =
        tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash)).await??;
    if !valid {
        warn!(user = %user.id, "Login attempt with wrong password");
        return Err(AppError::unauthorized("Invalid email or password"));
    }

    let profile = user.profile();
    let tokens = issue_tokens(&state, &profile)?;

    info!(user = %profile.id, "User logged in");

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        user: profile,
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    }))
}

/// POST /api/auth/refresh - Rotate a refresh token
///
/// The presented token is revoked; a second use of it is rejected.
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RefreshRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let Some(token) = required(&req.refresh_token) else {
        return Err(AppError::bad_request("Refresh token is required"));
    };

    let invalid = || AppError::forbidden("Invalid or expired refresh token");

    let claims = state
        .jwt()?
        .verify_refresh_token(token)
        .map_err(|_| invalid())?;

    if !state
        .db
        .refresh_token_is_active(&claims.jti, &claims.user_id)?
    {
        return Err(invalid());
    }

    let Some(user) = state.db.get_user(&claims.user_id)? else {
        return Err(AppError::forbidden("User not found"));
    };

    // Revocation doubles as the single-use gate under concurrent refreshes
    if !state.db.revoke_refresh_token(&claims.jti)? {
        return Err(invalid());
    }

    Ok(Json(issue_tokens(&state, &user.profile())?))
}

/// POST /api/auth/logout - Revoke a refresh token if one is supplied
pub async fn logout(
    State(state): State<Arc<AppState>>,
    body: Option<Json<RefreshRequest>>,
) -> Result<Json<MessageResponse>, AppError> {
    let token = body.and_then(|Json(req)| req.refresh_token);

    if let (Some(token), Some(jwt)) = (token, state.config.jwt.as_ref()) {
        if let Ok(claims) = jwt.verify_refresh_token(&token) {
            state.db.revoke_refresh_token(&claims.jti)?;
        }
    }

    Ok(Json(MessageResponse {
        message: "Logout successful".to_string(),
    }))
}

/// GET /api/auth/profile - The authenticated user
pub async fn get_profile(Extension(user): Extension<CurrentUser>) -> Json<UserProfile> {
    Json(user.0)
}
