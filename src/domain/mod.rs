//! Domain primitives shared by the catalog, profile and recommendation code.
//!
//! Catalog ids and local user ids are both plain integers in storage; the
//! newtypes here keep them from being swapped at call sites.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned to a title by the external catalog (`cached_anime.anime_id`).
///
/// # Examples
///
/// ```rust
/// use anirec::domain::CatalogId;
///
/// let id = CatalogId::new(21);
/// assert_eq!(id.value(), 21);
/// assert_eq!(id.to_string(), "21");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogId(i32);

impl CatalogId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }

    /// Catalog ids are always positive.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for CatalogId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

impl From<CatalogId> for i32 {
    fn from(id: CatalogId) -> Self {
        id.0
    }
}

/// Local user id (`users.id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i32);

impl UserId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for UserId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

/// Airing status as reported by the catalog.
///
/// Anything the catalog omits or that we do not recognise is stored as
/// [`MediaStatus::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaStatus {
    Finished,
    Releasing,
    NotYetReleased,
    Cancelled,
    Hiatus,
    #[default]
    Unknown,
}

impl MediaStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Finished => "FINISHED",
            Self::Releasing => "RELEASING",
            Self::NotYetReleased => "NOT_YET_RELEASED",
            Self::Cancelled => "CANCELLED",
            Self::Hiatus => "HIATUS",
            Self::Unknown => "UNKNOWN",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "FINISHED" => Self::Finished,
            "RELEASING" => Self::Releasing,
            "NOT_YET_RELEASED" => Self::NotYetReleased,
            "CANCELLED" => Self::Cancelled,
            "HIATUS" => Self::Hiatus,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for MediaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_status_parse() {
        assert_eq!(MediaStatus::parse("FINISHED"), MediaStatus::Finished);
        assert_eq!(MediaStatus::parse("releasing"), MediaStatus::Releasing);
        assert_eq!(
            MediaStatus::parse("NOT_YET_RELEASED"),
            MediaStatus::NotYetReleased
        );
        assert_eq!(MediaStatus::parse(""), MediaStatus::Unknown);
        assert_eq!(MediaStatus::parse("SOMETHING_NEW"), MediaStatus::Unknown);
    }

    #[test]
    fn test_media_status_roundtrip_str() {
        for status in [
            MediaStatus::Finished,
            MediaStatus::Releasing,
            MediaStatus::NotYetReleased,
            MediaStatus::Cancelled,
            MediaStatus::Hiatus,
            MediaStatus::Unknown,
        ] {
            assert_eq!(MediaStatus::parse(status.as_str()), status);
        }
    }

    #[test]
    fn test_media_status_serde() {
        let json = serde_json::to_string(&MediaStatus::NotYetReleased).unwrap();
        assert_eq!(json, "\"NOT_YET_RELEASED\"");
    }

    #[test]
    fn test_catalog_id_validity() {
        assert!(CatalogId::new(1).is_valid());
        assert!(!CatalogId::new(0).is_valid());
        assert!(!CatalogId::new(-5).is_valid());
    }
}
