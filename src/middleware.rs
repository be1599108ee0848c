//! Authentication Middleware
//!
//! Guards protected routes: the bearer access token is verified, the user it
//! names is loaded, and the resulting [`UserProfile`] is stored in request
//! extensions for [`AuthUser`](crate::extractors::AuthUser) to pick up.

use crate::error::AuthError;
use crate::handlers::AuthState;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

/// Pull the token out of an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Require an authenticated user
///
/// Rejects with 401 when the token is absent or fails verification, and
/// with 404 when the token is valid but its user no longer exists.
pub async fn require_auth(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(req.headers())
        .ok_or(AuthError::MissingToken)?
        .to_owned();

    let profile = auth.authenticate(&token).await?;

    req.extensions_mut().insert(profile);

    Ok(next.run(req).await)
}
