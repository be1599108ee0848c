//! Authentication Service
//!
//! Sign-up, sign-in and access token resolution. A sign-in attempt moves
//! through received, validated, authenticated and session-issued; nothing in
//! between is persisted, so any failure leaves no trace besides logs.

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::models::*;
use crate::password::CredentialHasher;
use crate::session::SessionManager;
use crate::store::{SessionStore, UserStore};
use crate::token::TokenIssuer;

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    sessions: SessionManager,
    hasher: CredentialHasher,
    tokens: TokenIssuer,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(
        config: AuthConfig,
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
    ) -> Result<Self, AuthError> {
        config.validate()?;

        let hasher = CredentialHasher::new(config.argon2_params()?)?;
        let tokens = TokenIssuer::new(&config);
        let sessions = SessionManager::new(sessions, tokens.clone());

        Ok(Self {
            users,
            sessions,
            hasher,
            tokens,
        })
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    // ============================================
    // Sign-up
    // ============================================

    /// Register a new user
    pub async fn sign_up(&self, req: SignUpRequest) -> Result<(), AuthError> {
        let req = req.normalized();
        req.validate()
            .map_err(|e| AuthError::Validation(e.to_string()))?;

        if self.users.find_user_by_username(&req.username).await?.is_some() {
            return Err(AuthError::UsernameExists);
        }

        if self.users.find_user_by_email(&req.email).await?.is_some() {
            return Err(AuthError::EmailExists);
        }

        let display_name = req.display_name();
        let password_hash = self.hasher.hash_async(req.password).await?;

        // The store re-checks uniqueness atomically; a racing sign-up surfaces here.
        let user = self
            .users
            .create_user(NewUser {
                username: req.username,
                email: req.email,
                password_hash,
                display_name,
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");

        Ok(())
    }

    // ============================================
    // Sign-in
    // ============================================

    /// Authenticate user and open a refresh session
    pub async fn sign_in(&self, req: SignInRequest) -> Result<SignInGrant, AuthError> {
        let req = req.normalized();
        req.validate()
            .map_err(|e| AuthError::Validation(e.to_string()))?;

        let user = self.users.find_user_by_username(&req.username).await?;

        // Unknown users still pay for a hash comparison.
        let digest = user.as_ref().map(|u| u.password_hash.clone());
        let password_ok = self.hasher.verify_async(req.password, digest).await?;

        let user = match user {
            Some(user) if password_ok => user,
            _ => {
                tracing::debug!(username = %req.username, "Sign-in rejected");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let now = Utc::now();
        let access_token = self.tokens.issue_access_token_at(user.id, now)?;
        let session = self.sessions.issue(user.id, now).await?;

        tracing::info!(user_id = %user.id, session_id = %session.id, "User signed in");

        Ok(SignInGrant {
            access_token,
            refresh_token: session.refresh_token,
            expires_at: session.expires_at,
            display_name: user.display_name,
        })
    }

    // ============================================
    // Token Resolution
    // ============================================

    /// Resolve the user behind an access token
    pub async fn authenticate(&self, access_token: &str) -> Result<UserProfile, AuthError> {
        let claims = self.tokens.verify_access_token(access_token)?;

        let user = self
            .get_user(claims.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(UserProfile::from(user))
    }

    /// Get user by ID
    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, AuthError> {
        let user = self.users.find_user_by_id(user_id).await?;
        Ok(user)
    }
}
