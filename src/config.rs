//! Service Configuration
//!
//! Configuration values are loaded from environment variables once, at
//! startup, and then passed explicitly into the components that need them.

use crate::error::AuthError;
use std::env;
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

/// Lifetime of an access token in seconds (30 minutes)
pub const ACCESS_TOKEN_TTL_SECS: i64 = 30 * 60;

/// Lifetime of a refresh session in seconds (14 days)
pub const REFRESH_TOKEN_TTL_SECS: i64 = 14 * 24 * 60 * 60;

/// Smallest accepted refresh secret, in raw bytes before encoding
pub const MIN_REFRESH_TOKEN_BYTES: usize = 32;

/// Smallest accepted signing secret, in bytes
pub const MIN_SECRET_LENGTH: usize = 32;

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret for signing access tokens (from ACCESS_TOKEN_SECRET env var)
    pub access_token_secret: String,

    /// Raw byte length of refresh secrets (from REFRESH_TOKEN_BYTES env var)
    pub refresh_token_bytes: usize,

    /// Argon2 memory cost in KiB (from ARGON2_MEMORY_COST env var)
    pub argon2_memory_cost: u32,

    /// Argon2 time cost (iterations) (from ARGON2_TIME_COST env var)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (from ARGON2_PARALLELISM env var)
    pub argon2_parallelism: u32,

    /// How often expired sessions are purged (from SESSION_SWEEP_INTERVAL env var, seconds)
    pub session_sweep_interval: Duration,
}

impl AuthConfig {
    /// Build a configuration around a signing secret, using defaults for the rest
    pub fn new(access_token_secret: impl Into<String>) -> Self {
        Self {
            access_token_secret: access_token_secret.into(),
            refresh_token_bytes: 64,
            argon2_memory_cost: argon2::Params::DEFAULT_M_COST,
            argon2_time_cost: argon2::Params::DEFAULT_T_COST,
            argon2_parallelism: argon2::Params::DEFAULT_P_COST,
            session_sweep_interval: Duration::from_secs(60 * 60),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AuthError> {
        let secret = env::var("ACCESS_TOKEN_SECRET").map_err(|_| {
            AuthError::Config("ACCESS_TOKEN_SECRET environment variable must be set".to_string())
        })?;

        let defaults = Self::new(secret);

        let config = Self {
            refresh_token_bytes: parse_var("REFRESH_TOKEN_BYTES")?
                .unwrap_or(defaults.refresh_token_bytes),

            argon2_memory_cost: parse_var("ARGON2_MEMORY_COST")?
                .unwrap_or(defaults.argon2_memory_cost),

            argon2_time_cost: parse_var("ARGON2_TIME_COST")?
                .unwrap_or(defaults.argon2_time_cost),

            argon2_parallelism: parse_var("ARGON2_PARALLELISM")?
                .unwrap_or(defaults.argon2_parallelism),

            session_sweep_interval: parse_var("SESSION_SWEEP_INTERVAL")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.session_sweep_interval),

            ..defaults
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.access_token_secret.len() < MIN_SECRET_LENGTH {
            return Err(AuthError::Config(format!(
                "ACCESS_TOKEN_SECRET must be at least {MIN_SECRET_LENGTH} bytes"
            )));
        }

        if self.refresh_token_bytes < MIN_REFRESH_TOKEN_BYTES {
            return Err(AuthError::Config(format!(
                "REFRESH_TOKEN_BYTES must be at least {MIN_REFRESH_TOKEN_BYTES}"
            )));
        }

        self.argon2_params()?;

        if self.session_sweep_interval.is_zero() {
            return Err(AuthError::Config(
                "SESSION_SWEEP_INTERVAL must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Argon2 cost parameters derived from this configuration
    pub fn argon2_params(&self) -> Result<argon2::Params, AuthError> {
        argon2::Params::new(
            self.argon2_memory_cost,
            self.argon2_time_cost,
            self.argon2_parallelism,
            None,
        )
        .map_err(|e| AuthError::Config(format!("invalid argon2 parameters: {e}")))
    }
}

/// Settings for the HTTP server binary
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listening port (from PORT env var)
    pub port: u16,

    /// Postgres connection string; the in-memory store is used when absent (DATABASE_URL)
    pub database_url: Option<String>,

    /// Connection pool size (from DATABASE_MAX_CONNECTIONS env var)
    pub database_max_connections: u32,

    /// Browser origin allowed to call the API with credentials (from CLIENT_URL env var)
    pub client_url: Option<String>,
}

impl ServerConfig {
    /// Load server settings from environment variables
    pub fn from_env() -> Result<Self, AuthError> {
        Ok(Self {
            port: parse_var("PORT")?.unwrap_or(5001),
            database_url: env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS")?.unwrap_or(10),
            client_url: env::var("CLIENT_URL").ok().filter(|v| !v.is_empty()),
        })
    }

    /// Address the server binds to
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>, AuthError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AuthError::Config(format!("{name} has an invalid value"))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let config = AuthConfig::new("a".repeat(32));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_short_secret() {
        let config = AuthConfig::new("short");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_short_refresh_secret() {
        let config = AuthConfig {
            refresh_token_bytes: 16,
            ..AuthConfig::new("a".repeat(32))
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_argon2_params() {
        let config = AuthConfig {
            argon2_time_cost: 0,
            ..AuthConfig::new("a".repeat(32))
        };
        assert!(matches!(config.validate(), Err(AuthError::Config(_))));
    }

    #[test]
    fn test_fixed_lifetimes() {
        assert_eq!(ACCESS_TOKEN_TTL_SECS, 1800);
        assert_eq!(REFRESH_TOKEN_TTL_SECS, 1_209_600);
    }

    #[test]
    fn test_parse_var() {
        env::remove_var("ACCOUNT_AUTH_TEST_UNSET");
        env::set_var("ACCOUNT_AUTH_TEST_VALID", " 42 ");
        env::set_var("ACCOUNT_AUTH_TEST_INVALID", "forty-two");

        assert_eq!(parse_var::<u32>("ACCOUNT_AUTH_TEST_UNSET").unwrap(), None);
        assert_eq!(parse_var::<u32>("ACCOUNT_AUTH_TEST_VALID").unwrap(), Some(42));
        assert!(matches!(
            parse_var::<u32>("ACCOUNT_AUTH_TEST_INVALID"),
            Err(AuthError::Config(_))
        ));
    }

    #[test]
    fn test_auth_config_from_env() {
        env::remove_var("ACCESS_TOKEN_SECRET");
        assert!(matches!(AuthConfig::from_env(), Err(AuthError::Config(_))));

        env::set_var("ACCESS_TOKEN_SECRET", "short");
        assert!(matches!(AuthConfig::from_env(), Err(AuthError::Config(_))));

        env::set_var("ACCESS_TOKEN_SECRET", "a".repeat(32));
        let config = AuthConfig::from_env().unwrap();
        assert_eq!(config.refresh_token_bytes, 64);
        assert_eq!(config.argon2_memory_cost, argon2::Params::DEFAULT_M_COST);
        assert_eq!(config.session_sweep_interval, Duration::from_secs(3600));

        env::remove_var("ACCESS_TOKEN_SECRET");
    }

    #[test]
    fn test_server_config_from_env() {
        env::set_var("PORT", "8080");
        assert_eq!(ServerConfig::from_env().unwrap().port, 8080);

        env::set_var("PORT", "not-a-port");
        assert!(matches!(ServerConfig::from_env(), Err(AuthError::Config(_))));

        env::remove_var("PORT");
        assert_eq!(ServerConfig::from_env().unwrap().port, 5001);
    }
}
