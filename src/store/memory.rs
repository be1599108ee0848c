//! In-process store backed by hash maps.

use super::{SessionStore, StoreError, UniqueField, UserStore};
use crate::models::{NewSession, NewUser, Session, User};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    sessions: HashMap<String, Session>,
}

/// Memory-backed user and session store
///
/// Uniqueness checks and inserts happen under one write lock, so concurrent
/// creates with the same username cannot both succeed.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, expired or not
    pub async fn session_count(&self) -> usize {
        self.tables.read().await.sessions.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;

        for existing in tables.users.values() {
            if existing.username == new.username {
                return Err(StoreError::Duplicate(UniqueField::Username));
            }
            if existing.email == new.email {
                return Err(StoreError::Duplicate(UniqueField::Email));
            }
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            display_name: new.display_name,
            avatar_url: None,
            avatar_id: None,
            bio: None,
            phone: None,
            created_at: now,
            updated_at: now,
        };

        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create_session(&self, new: NewSession) -> Result<Session, StoreError> {
        let mut tables = self.tables.write().await;

        if tables.sessions.contains_key(&new.refresh_token) {
            return Err(StoreError::Duplicate(UniqueField::RefreshToken));
        }

        let session = Session {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            refresh_token: new.refresh_token,
            expires_at: new.expires_at,
            created_at: Utc::now(),
        };

        tables
            .sessions
            .insert(session.refresh_token.clone(), session.clone());
        Ok(session)
    }

    async fn find_session_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<Session>, StoreError> {
        Ok(self.tables.read().await.sessions.get(refresh_token).cloned())
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.sessions.len();
        tables.sessions.retain(|_, s| !s.is_expired_at(now));
        Ok((before - tables.sessions.len()) as u64)
    }
}
