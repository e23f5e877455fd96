//! `SeaORM` implementation of the `AuthService` trait.

use crate::config::SecurityConfig;
use crate::db::{Store, User};
use crate::domain::UserId;
use crate::services::auth_service::{
    AuthError, AuthService, AuthenticatedUser, Registration, TokenPair, UserInfo,
    validate_email, validate_password_strength, validate_username,
};
use crate::services::tokens::{TokenIssuer, TokenKind};
use async_trait::async_trait;
use tracing::info;

pub struct SeaOrmAuthService {
    store: Store,
    tokens: TokenIssuer,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, tokens: TokenIssuer, security: SecurityConfig) -> Self {
        Self {
            store,
            tokens,
            security,
        }
    }

    fn token_pair(&self, user: &User) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            refresh: self.tokens.issue(user, TokenKind::Refresh)?,
            access: self.tokens.issue(user, TokenKind::Access)?,
        })
    }

    async fn user_for_claims(&self, sub: i32) -> Result<User, AuthError> {
        self.store
            .get_user(UserId::new(sub))
            .await?
            .ok_or(AuthError::InvalidToken)
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Registration, AuthError> {
        validate_username(username)?;
        validate_email(email)?;
        validate_password_strength(password)?;

        if self.store.get_user_by_username(username).await?.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        // The pre-check gives a fast answer; the unique index settles races.
        let user = self
            .store
            .create_user(username, email, password, &self.security)
            .await?
            .ok_or(AuthError::UsernameTaken)?;

        info!(user_id = %user.id, username = %user.username, "User registered");

        let tokens = self.token_pair(&user)?;

        Ok(Registration {
            user: UserInfo {
                id: user.id,
                username: user.username,
                email: user.email,
            },
            tokens,
        })
    }

    async fn login(&self, username: &str, password: &str) -> Result<TokenPair, AuthError> {
        let user = self
            .store
            .verify_credentials(username, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        self.token_pair(&user)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = self.tokens.verify(refresh_token, TokenKind::Refresh)?;
        let user = self.user_for_claims(claims.sub).await?;

        self.tokens.issue(&user, TokenKind::Access)
    }

    async fn authenticate(&self, access_token: &str) -> Result<AuthenticatedUser, AuthError> {
        let claims = self.tokens.verify(access_token, TokenKind::Access)?;
        let user = self.user_for_claims(claims.sub).await?;

        Ok(AuthenticatedUser {
            id: user.id,
            username: user.username,
        })
    }
}
