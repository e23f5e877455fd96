//! Signed bearer tokens.
//!
//! Access and refresh tokens are both HS256 JWTs. They differ only in
//! lifetime and in the `kind` claim, which is checked on every decode so
//! one can never stand in for the other.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::db::User;
use crate::services::auth_service::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims embedded in every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's id.
    pub sub: i32,
    pub username: String,
    pub kind: TokenKind,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4).
    pub jti: String,
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl: Duration::try_minutes(config.access_token_minutes).unwrap_or(Duration::MAX),
            refresh_ttl: Duration::try_days(config.refresh_token_days).unwrap_or(Duration::MAX),
        }
    }

    pub fn issue(&self, user: &User, kind: TokenKind) -> Result<String, AuthError> {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };

        let claims = Claims {
            sub: user.id.value(),
            username: user.username.clone(),
            kind,
            exp: now
                .checked_add_signed(ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
                .timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Checks signature, expiry and that the token is of the `expected` kind.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| AuthError::InvalidToken)?;

        if data.claims.kind != expected {
            return Err(AuthError::InvalidToken);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            access_token_minutes: 5,
            refresh_token_days: 1,
        }
    }

    fn user() -> User {
        User {
            id: UserId::new(3),
            username: "kaneda".to_string(),
            email: String::new(),
            created_at: String::new(),
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let issuer = TokenIssuer::new(&config("unit-test-secret"));
        let token = issuer.issue(&user(), TokenKind::Access).unwrap();

        let claims = issuer.verify(&token, TokenKind::Access).unwrap();
        assert_eq!(claims.sub, 3);
        assert_eq!(claims.username, "kaneda");
        assert_eq!(claims.exp - claims.iat, 5 * 60);
    }

    #[test]
    fn test_kinds_are_not_interchangeable() {
        let issuer = TokenIssuer::new(&config("unit-test-secret"));
        let refresh = issuer.issue(&user(), TokenKind::Refresh).unwrap();
        let access = issuer.issue(&user(), TokenKind::Access).unwrap();

        assert!(matches!(
            issuer.verify(&refresh, TokenKind::Access),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            issuer.verify(&access, TokenKind::Refresh),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = TokenIssuer::new(&config("one"))
            .issue(&user(), TokenKind::Access)
            .unwrap();

        assert!(
            TokenIssuer::new(&config("two"))
                .verify(&token, TokenKind::Access)
                .is_err()
        );
    }

    #[test]
    fn test_expired_token_rejected() {
        let mut cfg = config("unit-test-secret");
        cfg.access_token_minutes = -10;
        let issuer = TokenIssuer::new(&cfg);

        let token = issuer.issue(&user(), TokenKind::Access).unwrap();
        assert!(issuer.verify(&token, TokenKind::Access).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        let issuer = TokenIssuer::new(&config("unit-test-secret"));
        assert!(issuer.verify("not.a.jwt", TokenKind::Access).is_err());
    }

    #[test]
    fn test_oversized_lifetimes_do_not_overflow() {
        let mut cfg = config("unit-test-secret");
        cfg.access_token_minutes = i64::MAX;
        cfg.refresh_token_days = i64::MAX;
        let issuer = TokenIssuer::new(&cfg);

        let token = issuer.issue(&user(), TokenKind::Refresh).unwrap();
        let claims = issuer.verify(&token, TokenKind::Refresh).unwrap();
        assert!(claims.exp > claims.iat);
    }
}
