//! Account Authentication Service
//!
//! Registers users, verifies credentials and guards protected routes:
//! - Argon2id password hashing with tunable cost
//! - 30-minute HS256 JWT access tokens
//! - 14-day refresh sessions keyed by an opaque random secret
//! - An axum middleware that resolves the caller from a bearer token
//!
//! # Configuration
//!
//! Configuration is loaded from environment variables by the binary and
//! injected into [`AuthService::new`]:
//! - `ACCESS_TOKEN_SECRET` - Secret key for signing JWTs (required, min 32 bytes)
//! - `REFRESH_TOKEN_BYTES` - Raw refresh secret length (default: 64, min 32)
//! - `ARGON2_MEMORY_COST`, `ARGON2_TIME_COST`, `ARGON2_PARALLELISM` - Hashing cost
//! - `SESSION_SWEEP_INTERVAL` - Seconds between expired session purges (default: 3600)
//!
//! # Usage
//!
//! ```rust,ignore
//! use account_auth::{create_routes, AuthConfig, AuthService, MemoryStore};
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::new());
//! let auth = AuthService::new(AuthConfig::from_env()?, store.clone(), store)?;
//! let app = create_routes(Arc::new(auth));
//! ```

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;
pub mod session;
pub mod store;
pub mod token;

// Re-export commonly used types
pub use config::{AuthConfig, ServerConfig};
pub use error::AuthError;
pub use extractors::AuthUser;
pub use handlers::{create_routes, AuthState};
pub use models::*;
pub use password::CredentialHasher;
pub use service::AuthService;
pub use session::SessionManager;
pub use store::{MemoryStore, PgStore, SessionStore, StoreError, UniqueField, UserStore};
pub use token::{TokenError, TokenIssuer};
