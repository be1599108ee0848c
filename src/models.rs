//! Authentication Models
//!
//! Data structures for authentication requests, responses, and stored entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

// ============================================
// Stored Entities
// ============================================

/// User entity from storage
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    /// Image host identifier, kept so the avatar can be deleted later
    pub avatar_id: Option<String>,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to create a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
}

/// Refresh session entity from storage
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Check if the session has passed its expiry at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Fields needed to create a session
#[derive(Debug, Clone)]
pub struct NewSession {
    pub user_id: Uuid,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

// ============================================
// Request DTOs
// ============================================

/// Sign-up request
///
/// Absent fields deserialize as empty strings so they surface as
/// validation errors rather than body rejections.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct SignUpRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,

    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "firstName is required"))]
    pub first_name: String,

    #[validate(length(min = 1, message = "lastName is required"))]
    pub last_name: String,
}

impl SignUpRequest {
    /// Trim and lowercase identifiers, trim names; the password is left untouched
    pub fn normalized(self) -> Self {
        Self {
            username: normalize_identifier(&self.username),
            email: normalize_identifier(&self.email),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            password: self.password,
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Sign-in request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct SignInRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

impl SignInRequest {
    pub fn normalized(self) -> Self {
        Self {
            username: normalize_identifier(&self.username),
            password: self.password,
        }
    }
}

/// Usernames and emails are stored trimmed and lowercase
pub fn normalize_identifier(value: &str) -> String {
    value.trim().to_lowercase()
}

// ============================================
// Response DTOs
// ============================================

/// Public user view (the password hash is not part of it)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub avatar_id: Option<String>,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            display_name: user.display_name,
            avatar_url: user.avatar_url,
            avatar_id: user.avatar_id,
            bio: user.bio,
            phone: user.phone,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Everything a successful sign-in hands back to the transport layer
#[derive(Debug, Clone)]
pub struct SignInGrant {
    pub access_token: String,
    /// Delivered only as a cookie, never in a JSON body
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub display_name: String,
}

/// Sign-in response body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub message: String,
    pub access_token: String,
}

impl From<&SignInGrant> for SignInResponse {
    fn from(grant: &SignInGrant) -> Self {
        Self {
            message: format!("User {} logged in!", grant.display_name),
            access_token: grant.access_token.clone(),
        }
    }
}

// ============================================
// JWT Claims
// ============================================

/// JWT claims for access tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (user ID)
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "a@x.com".into(),
            password_hash: "$argon2id$v=19$m=8,t=1,p=1$c2FsdHNhbHQ$aGFzaA".into(),
            display_name: "Alice A".into(),
            avatar_url: None,
            avatar_id: None,
            bio: None,
            phone: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_user_serialization_hides_password_hash() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["displayName"], "Alice A");
    }

    #[test]
    fn test_profile_has_no_hash() {
        let json = serde_json::to_value(UserProfile::from(sample_user())).unwrap();
        let text = json.to_string();
        assert!(!text.contains("argon2"));
        assert_eq!(json["username"], "alice");
    }

    #[test]
    fn test_sign_up_normalization() {
        let req = SignUpRequest {
            username: "  Alice ".into(),
            password: " secret1 ".into(),
            email: "A@X.com".into(),
            first_name: " Alice".into(),
            last_name: "A ".into(),
        }
        .normalized();

        assert_eq!(req.username, "alice");
        assert_eq!(req.email, "a@x.com");
        assert_eq!(req.password, " secret1 ");
        assert_eq!(req.display_name(), "Alice A");
    }

    #[test]
    fn test_missing_fields_deserialize_as_empty() {
        let req: SignUpRequest = serde_json::from_str(r#"{"username":"alice"}"#).unwrap();
        assert_eq!(req.username, "alice");
        assert!(req.email.is_empty());
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_sign_up_request_uses_camel_case() {
        let req: SignUpRequest = serde_json::from_str(
            r#"{"username":"alice","password":"secret1","email":"a@x.com","firstName":"Alice","lastName":"A"}"#,
        )
        .unwrap();
        assert_eq!(req.first_name, "Alice");
        assert_eq!(req.last_name, "A");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_session_expiry_boundary() {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            refresh_token: "secret".into(),
            expires_at: now,
            created_at: now,
        };
        assert!(session.is_expired_at(now));
        assert!(!session.is_expired_at(now - chrono::Duration::seconds(1)));
    }
}
