//! Refresh Sessions
//!
//! A session is created on every successful sign-in and simply expires; there
//! is no revocation or rotation.

use crate::config::REFRESH_TOKEN_TTL_SECS;
use crate::error::AuthError;
use crate::models::{NewSession, Session};
use crate::store::{SessionStore, StoreError, UniqueField};
use crate::token::TokenIssuer;

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Secret generation attempts before giving up on collisions
const MAX_SECRET_ATTEMPTS: usize = 3;

/// Creates, looks up and purges refresh sessions
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    tokens: TokenIssuer,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, tokens: TokenIssuer) -> Self {
        Self { store, tokens }
    }

    /// Refresh session lifetime
    pub fn ttl(&self) -> Duration {
        Duration::seconds(REFRESH_TOKEN_TTL_SECS)
    }

    /// Open a new session for `user_id`, expiring 14 days after `now`
    pub async fn issue(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<Session, AuthError> {
        let expires_at = now + self.ttl();

        for attempt in 1..=MAX_SECRET_ATTEMPTS {
            let new = NewSession {
                user_id,
                refresh_token: self.tokens.issue_refresh_secret(),
                expires_at,
            };

            match self.store.create_session(new).await {
                Ok(session) => return Ok(session),
                Err(StoreError::Duplicate(UniqueField::RefreshToken)) => {
                    tracing::warn!(user_id = %user_id, attempt, "Refresh secret collision, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }

        tracing::error!(user_id = %user_id, "Could not generate a unique refresh secret");
        Err(AuthError::Internal)
    }

    /// Look up a live session by its refresh secret
    pub async fn find(&self, refresh_token: &str) -> Result<Option<Session>, AuthError> {
        let now = Utc::now();
        let session = self
            .store
            .find_session_by_refresh_token(refresh_token)
            .await?
            .filter(|s| !s.is_expired_at(now));
        Ok(session)
    }

    /// Delete every expired session
    pub async fn purge_expired(&self) -> Result<u64, AuthError> {
        let removed = self.store.delete_expired_sessions(Utc::now()).await?;
        Ok(removed)
    }

    /// Spawn a background task that purges expired sessions every `every`
    pub fn spawn_expiry_sweeper(&self, every: std::time::Duration) -> JoinHandle<()> {
        let manager = self.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            // The first tick completes immediately.
            interval.tick().await;

            loop {
                interval.tick().await;

                match manager.purge_expired().await {
                    Ok(0) => {}
                    Ok(removed) => tracing::info!(removed, "Purged expired sessions"),
                    Err(e) => tracing::warn!(error = %e, "Session purge failed"),
                }
            }
        })
    }
}
