//! # Cart Mirror Repository
//!
//! Best-effort server copies of client carts.
//!
//! The client cart is the source of truth for the session; the mirror exists
//! so a returning customer (or support staff) can see what a cart held. It
//! stores the raw client snapshot as an opaque JSON payload and is NEVER
//! read during checkout pricing - checkout re-prices from the catalog.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// A mirrored cart row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartMirror {
    pub cart_id: String,
    /// Raw client snapshot (items + coupon code) as JSON.
    pub payload: String,
    pub updated_at: DateTime<Utc>,
}

/// Repository for cart mirror operations.
#[derive(Debug, Clone)]
pub struct CartMirrorRepository {
    pool: SqlitePool,
}

impl CartMirrorRepository {
    /// Creates a new CartMirrorRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartMirrorRepository { pool }
    }

    /// Inserts or replaces the mirror for a cart.
    pub async fn upsert(&self, cart_id: &str, payload: &str) -> DbResult<()> {
        debug!(cart_id = %cart_id, "Mirroring cart");

        sqlx::query(
            "INSERT INTO cart_mirrors (cart_id, payload, updated_at) \
             VALUES (?1, ?2, ?3) \
             ON CONFLICT (cart_id) DO UPDATE SET \
               payload = excluded.payload, \
               updated_at = excluded.updated_at",
        )
        .bind(cart_id)
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets the mirror for a cart, if one was ever synced.
    pub async fn get(&self, cart_id: &str) -> DbResult<Option<CartMirror>> {
        let mirror = sqlx::query_as::<_, CartMirror>(
            "SELECT cart_id, payload, updated_at FROM cart_mirrors WHERE cart_id = ?1",
        )
        .bind(cart_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(mirror)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_upsert_replaces_payload() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.cart_mirrors();

        repo.upsert("cart-1", r#"{"items":[]}"#).await.unwrap();
        repo.upsert("cart-1", r#"{"items":[{"bookId":"b1"}]}"#)
            .await
            .unwrap();

        let mirror = repo.get("cart-1").await.unwrap().unwrap();
        assert!(mirror.payload.contains("b1"));
    }

    #[tokio::test]
    async fn test_get_unknown_cart() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.cart_mirrors().get("nope").await.unwrap().is_none());
    }
}
