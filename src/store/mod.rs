//! Storage Interface
//!
//! The service only needs create and find-by-unique-field operations from its
//! backing store. Uniqueness must be enforced atomically by the store itself;
//! the service's own pre-checks are only there for friendlier errors.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::models::{NewSession, NewUser, Session, User};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Fields that must be unique across records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
    Phone,
    RefreshToken,
}

impl UniqueField {
    pub fn as_str(&self) -> &'static str {
        match self {
            UniqueField::Username => "username",
            UniqueField::Email => "email",
            UniqueField::Phone => "phone",
            UniqueField::RefreshToken => "refresh token",
        }
    }
}

impl std::fmt::Display for UniqueField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Storage errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate {0}")]
    Duplicate(UniqueField),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// User persistence
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user, failing with `Duplicate` if username, email or phone is taken
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}

/// Refresh session persistence
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a session, failing with `Duplicate(RefreshToken)` on a secret collision
    async fn create_session(&self, session: NewSession) -> Result<Session, StoreError>;

    async fn find_session_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<Session>, StoreError>;

    /// Remove sessions whose expiry is at or before `now`, returning how many were removed
    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}
