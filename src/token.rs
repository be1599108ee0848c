//! Access Tokens and Refresh Secrets
//!
//! Access tokens are HS256 JWTs carrying `{userId, iat, exp}` and are valid
//! for a fixed 30 minutes. Refresh secrets are opaque random strings with no
//! structure; they only mean something when looked up in the session store.

use crate::config::{AuthConfig, ACCESS_TOKEN_TTL_SECS};
use crate::error::AuthError;
use crate::models::AccessTokenClaims;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use rand::{rngs::OsRng, RngCore};
use uuid::Uuid;

/// Why an access token was rejected
///
/// Callers collapse all three into a single "unauthenticated" answer; the
/// distinction exists for logging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    SignatureInvalid,

    #[error("token has expired")]
    Expired,
}

/// Issues and verifies access tokens, and mints refresh secrets
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    refresh_token_bytes: usize,
}

impl TokenIssuer {
    /// Create an issuer from configuration
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.access_token_secret.as_bytes();

        // Expiry is checked by hand against an explicit clock, with no leeway.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            refresh_token_bytes: config.refresh_token_bytes,
        }
    }

    /// Access token lifetime
    pub fn access_token_ttl(&self) -> Duration {
        Duration::seconds(ACCESS_TOKEN_TTL_SECS)
    }

    /// Raw byte length of generated refresh secrets
    pub fn refresh_token_bytes(&self) -> usize {
        self.refresh_token_bytes
    }

    /// Generate an access token for a user, valid from now
    pub fn issue_access_token(&self, user_id: Uuid) -> Result<String, AuthError> {
        self.issue_access_token_at(user_id, Utc::now())
    }

    /// Generate an access token as if issued at `now`
    pub fn issue_access_token_at(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let exp = now + self.access_token_ttl();

        let claims = AccessTokenClaims {
            user_id,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Access token signing failed: {:?}", e);
            AuthError::Internal
        })
    }

    /// Validate an access token against the current time
    pub fn verify_access_token(&self, token: &str) -> Result<AccessTokenClaims, TokenError> {
        self.verify_access_token_at(token, Utc::now())
    }

    /// Validate an access token against `now`
    ///
    /// A token is accepted strictly before its `exp` second.
    pub fn verify_access_token_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<AccessTokenClaims, TokenError> {
        let token_data = decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })?;

        if now.timestamp() >= token_data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(token_data.claims)
    }

    /// Generate a refresh secret from the OS random source
    pub fn issue_refresh_secret(&self) -> String {
        let mut buffer = vec![0u8; self.refresh_token_bytes];
        OsRng.fill_bytes(&mut buffer);
        URL_SAFE_NO_PAD.encode(buffer)
    }
}
