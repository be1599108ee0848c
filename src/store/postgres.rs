//! PostgreSQL store.

use super::{SessionStore, StoreError, UniqueField, UserStore};
use crate::models::{NewSession, NewUser, Session, User};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Postgres-backed user and session store
///
/// Uniqueness is enforced by table constraints, so concurrent inserts are
/// resolved by the database.
#[derive(Debug, Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create tables and indexes if they do not exist yet
    pub async fn migrate(&self) -> Result<(), StoreError> {
        tracing::info!("Running authentication database migrations");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                username VARCHAR(100) NOT NULL,
                email VARCHAR(255) NOT NULL,
                password_hash VARCHAR(255) NOT NULL,
                display_name VARCHAR(200) NOT NULL,
                avatar_url VARCHAR(500),
                avatar_id VARCHAR(255),
                bio VARCHAR(500),
                phone VARCHAR(32),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                CONSTRAINT users_username_key UNIQUE (username),
                CONSTRAINT users_email_key UNIQUE (email),
                CONSTRAINT users_phone_key UNIQUE (phone)
            );
            "#,
        )
        .execute(&self.db)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id UUID PRIMARY KEY,
                user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                refresh_token VARCHAR(512) NOT NULL,
                expires_at TIMESTAMPTZ NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                CONSTRAINT sessions_refresh_token_key UNIQUE (refresh_token)
            );
            "#,
        )
        .execute(&self.db)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);")
            .execute(&self.db)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_expires ON sessions(expires_at);")
            .execute(&self.db)
            .await?;

        tracing::info!("Authentication migrations completed successfully");
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash, display_name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.display_name)
        .fetch_one(&self.db)
        .await?;

        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn create_session(&self, new: NewSession) -> Result<Session, StoreError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (id, user_id, refresh_token, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, refresh_token, expires_at, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(&new.refresh_token)
        .bind(new.expires_at)
        .fetch_one(&self.db)
        .await?;

        Ok(session)
    }

    async fn find_session_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<Session>, StoreError> {
        let session = sqlx::query_as(
            "SELECT id, user_id, refresh_token, expires_at, created_at FROM sessions WHERE refresh_token = $1",
        )
        .bind(refresh_token)
        .fetch_optional(&self.db)
        .await?;
        Ok(session)
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                if let Some(field) = db_err.constraint().and_then(field_for_constraint) {
                    return StoreError::Duplicate(field);
                }
            }
        }
        StoreError::Backend(err.to_string())
    }
}

fn field_for_constraint(constraint: &str) -> Option<UniqueField> {
    match constraint {
        "users_username_key" => Some(UniqueField::Username),
        "users_email_key" => Some(UniqueField::Email),
        "users_phone_key" => Some(UniqueField::Phone),
        "sessions_refresh_token_key" => Some(UniqueField::RefreshToken),
        _ => None,
    }
}
