use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ErrorBody;
use crate::clients::anilist::CatalogError;
use crate::services::{AnimeError, AuthError, ProfileError, RecommendationError};

pub const CATALOG_UNAVAILABLE: &str = "Failed to fetch anime data. Please try again later.";
pub const RECOMMENDATIONS_UNAVAILABLE: &str =
    "Failed to fetch recommendations. Please try again later.";

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    /// Upstream failure; `message` is what the client sees.
    ExternalApiError { service: String, message: String },

    ValidationError(String),

    Conflict(String),

    InternalError(String),

    Unauthorized(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::ExternalApiError { service, message } => write!(f, "{service} error: {message}"),
            Self::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            Self::ExternalApiError { message, .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
            Self::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
        };

        (status, Json(ErrorBody::new(error_message))).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl From<AnimeError> for ApiError {
    fn from(err: AnimeError) -> Self {
        match err {
            AnimeError::Catalog(CatalogError::EmptyResult) => {
                Self::NotFound("No results found".to_string())
            }
            AnimeError::Catalog(CatalogError::NotFound) => {
                Self::NotFound("Anime not found".to_string())
            }
            AnimeError::Catalog(e) => {
                tracing::error!(error = %e, "Catalog request failed");
                Self::anilist_error(CATALOG_UNAVAILABLE)
            }
            AnimeError::NotFound(id) => Self::not_found("Anime", id),
            AnimeError::Validation(msg) => Self::ValidationError(msg),
            AnimeError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl From<RecommendationError> for ApiError {
    fn from(err: RecommendationError) -> Self {
        match err {
            RecommendationError::NoFavoriteGenres => Self::ValidationError(err.to_string()),
            RecommendationError::ProfileNotFound | RecommendationError::NoRecommendations => {
                Self::NotFound(err.to_string())
            }
            RecommendationError::Catalog(e) => {
                tracing::error!(error = %e, "Recommendation catalog request failed");
                Self::anilist_error(RECOMMENDATIONS_UNAVAILABLE)
            }
            RecommendationError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::InvalidToken => {
                Self::Unauthorized(err.to_string())
            }
            AuthError::Validation(msg) => Self::ValidationError(msg),
            AuthError::UsernameTaken => Self::Conflict(err.to_string()),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<ProfileError> for ApiError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::NotFound => Self::NotFound(err.to_string()),
            ProfileError::Validation(msg) => Self::ValidationError(msg),
            ProfileError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::ValidationError(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::ValidationError(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::ValidationError(rejection.body_text())
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        Self::NotFound(format!("{resource} {id} not found"))
    }

    pub fn anilist_error(msg: impl Into<String>) -> Self {
        Self::ExternalApiError {
            service: "AniList".to_string(),
            message: msg.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CatalogId;

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_catalog_error_mapping() {
        assert_eq!(
            status_of(AnimeError::Catalog(CatalogError::Transport("timeout".into()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(AnimeError::Catalog(CatalogError::Decode("bad".into()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(AnimeError::Catalog(CatalogError::EmptyResult)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AnimeError::NotFound(CatalogId::new(1))),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_recommendation_error_mapping() {
        assert_eq!(
            status_of(RecommendationError::NoFavoriteGenres),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(RecommendationError::NoRecommendations),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(RecommendationError::Catalog(CatalogError::Transport(
                "down".into()
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_and_profile_error_mapping() {
        assert_eq!(
            status_of(AuthError::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_of(AuthError::InvalidToken), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AuthError::UsernameTaken), StatusCode::CONFLICT);
        assert_eq!(
            status_of(AuthError::Validation("weak".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(ProfileError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(ProfileError::Validation("bad".into())),
            StatusCode::BAD_REQUEST
        );
    }
}
