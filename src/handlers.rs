//! Authentication HTTP Handlers
//!
//! REST API endpoints for sign-up, sign-in and the caller's profile.

use crate::config::REFRESH_TOKEN_TTL_SECS;
use crate::error::AuthError;
use crate::extractors::AuthUser;
use crate::middleware;
use crate::models::*;
use crate::service::AuthService;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::SET_COOKIE, HeaderValue, StatusCode},
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

/// Shared auth service state
pub type AuthState = Arc<AuthService>;

/// Name of the cookie carrying the refresh secret
pub const REFRESH_COOKIE: &str = "refreshToken";

// ============================================
// Route Builder
// ============================================

/// Create authentication routes
pub fn create_routes(auth_service: AuthState) -> Router {
    // Public routes (no authentication required)
    let public = Router::new()
        .route("/api/auth/signup", post(sign_up))
        .route("/api/auth/signin", post(sign_in));

    // Protected routes (require authentication)
    let protected = Router::new()
        .route("/api/user/profile", get(profile))
        .route_layer(axum_middleware::from_fn_with_state(
            auth_service.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .with_state(auth_service)
}

// ============================================
// Sign-up / Sign-in
// ============================================

/// POST /api/auth/signup
///
/// Register a new user account; succeeds with an empty 204
pub async fn sign_up(
    State(auth): State<AuthState>,
    payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<StatusCode, AuthError> {
    let Json(req) = payload?;

    auth.sign_up(req).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/auth/signin
///
/// Authenticate and return an access token; the refresh secret goes in a cookie
pub async fn sign_in(
    State(auth): State<AuthState>,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<Response, AuthError> {
    let Json(req) = payload?;

    let grant = auth.sign_in(req).await?;
    let cookie = refresh_cookie(&grant.refresh_token)?;

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(SignInResponse::from(&grant)),
    )
        .into_response())
}

/// Build the `Set-Cookie` value for a refresh secret
///
/// The browser client lives on another origin, hence `SameSite=None`.
pub fn refresh_cookie(refresh_token: &str) -> Result<HeaderValue, AuthError> {
    let value = format!(
        "{REFRESH_COOKIE}={refresh_token}; Path=/; Max-Age={REFRESH_TOKEN_TTL_SECS}; HttpOnly; Secure; SameSite=None"
    );

    HeaderValue::from_str(&value).map_err(|e| {
        tracing::error!("Refresh cookie could not be encoded: {}", e);
        AuthError::Internal
    })
}

// ============================================
// User Profile
// ============================================

/// GET /api/user/profile
///
/// Get the authenticated user's profile
pub async fn profile(AuthUser(user): AuthUser) -> impl IntoResponse {
    Json(serde_json::json!({ "user": user }))
}
