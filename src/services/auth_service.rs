//! Domain service for accounts and bearer tokens.
//!
//! Handles registration, login, token refresh and resolving an access token
//! back to a user.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use thiserror::Error;

use crate::domain::UserId;

/// Characters that satisfy the "special character" password rule.
pub const PASSWORD_SPECIALS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("{0}")]
    Validation(String),

    #[error("A user with that username already exists.")]
    UsernameTaken,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub refresh: String,
    pub access: String,
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub user: UserInfo,
    pub tokens: TokenPair,
}

/// The caller behind a valid access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub username: String,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates a user with an empty profile and returns a fresh token pair.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for a bad username, email or weak
    /// password and [`AuthError::UsernameTaken`] for a duplicate username.
    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Registration, AuthError>;

    /// Verifies credentials and issues a token pair.
    async fn login(&self, username: &str, password: &str) -> Result<TokenPair, AuthError>;

    /// Exchanges a refresh token for a new access token.
    async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError>;

    /// Resolves an access token to its user.
    async fn authenticate(&self, access_token: &str) -> Result<AuthenticatedUser, AuthError>;
}

fn username_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\w.@+-]{1,150}$").expect("Invalid regex"))
}

pub fn validate_username(username: &str) -> Result<(), AuthError> {
    if username_regex().is_match(username) {
        Ok(())
    } else {
        Err(AuthError::Validation(
            "Username must be 1-150 characters: letters, digits and @/./+/-/_ only.".to_string(),
        ))
    }
}

pub fn validate_email(email: &str) -> Result<(), AuthError> {
    if email.is_empty() || (email.contains('@') && !email.chars().any(char::is_whitespace)) {
        Ok(())
    } else {
        Err(AuthError::Validation(
            "Enter a valid email address.".to_string(),
        ))
    }
}

pub fn validate_password_strength(password: &str) -> Result<(), AuthError> {
    let fail = |msg: &str| Err(AuthError::Validation(msg.to_string()));

    if password.chars().count() < 8 {
        return fail("Password must be at least 8 characters long.");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return fail("Password must contain at least one uppercase letter.");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return fail("Password must contain at least one lowercase letter.");
    }
    if !password.chars().any(char::is_numeric) {
        return fail("Password must contain at least one digit.");
    }
    if !password.chars().any(|c| PASSWORD_SPECIALS.contains(c)) {
        return fail(
            "Password must contain at least one special character (!@#$%^&*(),.?\":{}|<>).",
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_rules() {
        assert!(validate_password_strength("Str0ng!pw").is_ok());

        for weak in ["Sh0rt!", "lowercase1!", "UPPERCASE1!", "NoDigits!!", "NoSpecial11"] {
            assert!(
                matches!(validate_password_strength(weak), Err(AuthError::Validation(_))),
                "{weak} should be rejected"
            );
        }
    }

    #[test]
    fn test_password_rule_messages_are_specific() {
        let Err(AuthError::Validation(msg)) = validate_password_strength("abcdefgh") else {
            panic!("expected validation error");
        };
        assert!(msg.contains("uppercase"));
    }

    #[test]
    fn test_username_rules() {
        assert!(validate_username("spike.spiegel+bebop@ship_1-a").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("semi;colon").is_err());
        assert!(validate_username(&"x".repeat(150)).is_ok());
        assert!(validate_username(&"x".repeat(151)).is_err());
    }

    #[test]
    fn test_email_rules() {
        assert!(validate_email("").is_ok());
        assert!(validate_email("faye@bebop.space").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("a b@c.d").is_err());
    }
}
