//! Authentication Extractors

use crate::error::AuthError;
use crate::models::UserProfile;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

/// The principal attached by [`require_auth`](crate::middleware::require_auth)
///
/// Only usable on routes behind the gate; elsewhere it rejects as unauthenticated.
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserProfile);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<UserProfile>()
            .cloned()
            .map(AuthUser)
            .ok_or(AuthError::MissingToken)
    }
}
