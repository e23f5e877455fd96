pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{
    AuthError, AuthService, AuthenticatedUser, Registration, TokenPair, UserInfo,
};
pub use auth_service_impl::SeaOrmAuthService;

pub mod catalog_service;
pub mod catalog_service_impl;
pub use catalog_service::{AnimeError, CatalogService, GenreRefresh, SearchOutcome, SearchQuery};
pub use catalog_service_impl::SeaOrmCatalogService;

pub mod profile_service;
pub mod profile_service_impl;
pub use profile_service::{
    PreferencesUpdate, ProfileError, ProfileService, RatingInput, UserPreferences,
};
pub use profile_service_impl::SeaOrmProfileService;

pub mod recommendation;
pub use recommendation::{
    Freshness, RecommendationError, RecommendationService, RecommendationSource, Recommendations,
    StaleReason,
};

pub mod tokens;
pub use tokens::{TokenIssuer, TokenKind};
