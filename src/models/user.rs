//! User profile model, roles and token claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }
}

impl TryFrom<String> for UserRole {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            _ => Err(format!("Invalid user role: {}", s)),
        }
    }
}

/// Row of the `users` table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    #[sqlx(try_from = "String")]
    pub role: UserRole,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub member_since: DateTime<Utc>,
    pub max_borrow_limit: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Profile inserted the first time an identity signs in
    pub fn default_for(identity: &UserClaims, max_borrow_limit: i32) -> Self {
        let now = Utc::now();
        let email = identity.email.clone().unwrap_or_default();
        let full_name = identity
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| Some(email.clone()).filter(|e| !e.is_empty()))
            .unwrap_or_else(|| "User".to_string());

        Self {
            id: identity.sub,
            email,
            full_name,
            role: UserRole::User,
            phone: None,
            address: None,
            member_since: now,
            max_borrow_limit,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Require admin privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization("Administrator privileges required".to_string()))
        }
    }
}

/// Update own profile request
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProfile {
    #[validate(length(min = 1, message = "Full name cannot be empty"))]
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl UpdateProfile {
    pub fn normalized(self) -> Self {
        let trim = |v: Option<String>| v.map(|s| s.trim().to_string());
        Self {
            full_name: trim(self.full_name),
            phone: trim(self.phone),
            address: trim(self.address),
        }
    }
}

/// Claims of a token issued by the external auth provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// User id
    pub sub: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    /// Display name given at sign-up
    #[serde(default)]
    pub name: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
}

impl UserClaims {
    /// Create a JWT token (used by tooling and tests; production tokens come from the auth provider)
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let mut validation = Validation::default();
        // Provider tokens carry an audience we do not check
        validation.validate_aud = false;
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(name: Option<&str>, email: Option<&str>) -> UserClaims {
        UserClaims {
            sub: Uuid::new_v4(),
            email: email.map(String::from),
            name: name.map(String::from),
            exp: (Utc::now() + chrono::Duration::hours(1)).timestamp(),
            iat: None,
        }
    }

    #[test]
    fn test_default_profile_name_fallbacks() {
        let profile = UserProfile::default_for(&claims(Some("Ada"), Some("ada@example.org")), 5);
        assert_eq!(profile.full_name, "Ada");
        assert_eq!(profile.role, UserRole::User);
        assert_eq!(profile.max_borrow_limit, 5);

        let profile = UserProfile::default_for(&claims(None, Some("ada@example.org")), 5);
        assert_eq!(profile.full_name, "ada@example.org");

        let profile = UserProfile::default_for(&claims(None, None), 5);
        assert_eq!(profile.full_name, "User");
        assert_eq!(profile.email, "");
    }

    #[test]
    fn test_token_roundtrip() {
        let original = claims(Some("Ada"), None);
        let token = original.create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.sub, original.sub);
        assert!(UserClaims::from_token(&token, "other").is_err());
    }

    #[test]
    fn test_require_admin() {
        let mut profile = UserProfile::default_for(&claims(None, None), 5);
        assert!(profile.require_admin().is_err());
        profile.role = UserRole::Admin;
        assert!(profile.require_admin().is_ok());
    }
}
