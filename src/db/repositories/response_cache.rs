use crate::db::{now_timestamp, timestamp};
use crate::entities::{catalog_response_cache, prelude::*};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

/// 9999-12-31T23:59:59Z
const LATEST_EXPIRY_SECS: i64 = 253_402_300_799;

/// Raw catalog responses keyed by request signature.
pub struct ResponseCacheRepository {
    conn: DatabaseConnection,
}

impl ResponseCacheRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, signature: &str) -> Result<Option<String>> {
        let now = now_timestamp();

        // Opportunistic cleanup
        let _ = CatalogResponseCache::delete_many()
            .filter(catalog_response_cache::Column::ExpiresAt.lte(&now))
            .exec(&self.conn)
            .await;

        let entry = CatalogResponseCache::find()
            .filter(catalog_response_cache::Column::Signature.eq(signature))
            .filter(catalog_response_cache::Column::ExpiresAt.gt(&now))
            .one(&self.conn)
            .await?;

        Ok(entry.map(|e| e.response_json))
    }

    /// Stores or replaces the entry for `signature`. Expiry is capped at the
    /// end of year 9999 so stored timestamps keep sorting as text.
    pub async fn put(&self, signature: &str, body: &str, ttl: chrono::Duration) -> Result<()> {
        let now = Utc::now();
        let latest = DateTime::from_timestamp(LATEST_EXPIRY_SECS, 0).unwrap_or(now);
        let expires_at = now
            .checked_add_signed(ttl)
            .map_or(latest, |at| at.min(latest));

        let active = catalog_response_cache::ActiveModel {
            signature: Set(signature.to_string()),
            response_json: Set(body.to_string()),
            created_at: Set(timestamp(now)),
            expires_at: Set(timestamp(expires_at)),
            ..Default::default()
        };

        CatalogResponseCache::insert(active)
            .on_conflict(
                OnConflict::column(catalog_response_cache::Column::Signature)
                    .update_columns([
                        catalog_response_cache::Column::ResponseJson,
                        catalog_response_cache::Column::CreatedAt,
                        catalog_response_cache::Column::ExpiresAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(())
    }
}
