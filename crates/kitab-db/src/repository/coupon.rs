//! # Coupon Repository
//!
//! Database operations for coupons.
//!
//! ## The Usage-Limit Race
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Two checkouts, one redemption left (usage_limit 1, used_count 0)       │
//! │                                                                         │
//! │  Checkout A                      Checkout B                             │
//! │  evaluate → OK                   evaluate → OK                          │
//! │  BEGIN                           BEGIN                                  │
//! │  UPDATE … WHERE used_count <     UPDATE … WHERE used_count <            │
//! │         usage_limit → 1 row             usage_limit → 0 rows            │
//! │  COMMIT                          ROLLBACK + CouponExhausted             │
//! │                                                                         │
//! │  The WHERE clause is the guard: the increment and the limit check are   │
//! │  one atomic statement, so at most `usage_limit` orders can ever         │
//! │  commit against a coupon.                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use kitab_core::coupon::normalize_code;
use kitab_core::Coupon;

const COUPON_COLUMNS: &str = "id, code, discount_type, discount_value, min_purchase_cents, \
     max_discount_cents, usage_limit, used_count, valid_from, valid_until, \
     is_active, created_at, updated_at";

/// Repository for coupon database operations.
#[derive(Debug, Clone)]
pub struct CouponRepository {
    pool: SqlitePool,
}

impl CouponRepository {
    /// Creates a new CouponRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CouponRepository { pool }
    }

    /// Looks up a coupon by code. The code is normalized (trimmed,
    /// uppercased) before comparison; codes are stored uppercased.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Coupon>> {
        let code = normalize_code(code);

        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons WHERE code = ?1"
        ))
        .bind(&code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(coupon)
    }

    /// Atomically consumes one redemption if any remain.
    ///
    /// ## Returns
    /// `true` if the increment happened, `false` if the coupon is inactive
    /// or already at its limit. Checkout runs this inside the order
    /// transaction via [`increment_usage_guarded`]; this standalone form is
    /// the plain contract for other callers.
    pub async fn increment_usage(&self, id: &str) -> DbResult<bool> {
        increment_usage_guarded(&self.pool, id, Utc::now()).await
    }

    /// Inserts a coupon. Used by the seed binary and tests; coupon
    /// administration lives outside this service.
    pub async fn insert(&self, coupon: &Coupon) -> DbResult<()> {
        debug!(code = %coupon.code, "Inserting coupon");

        sqlx::query(
            "INSERT INTO coupons (id, code, discount_type, discount_value, min_purchase_cents, \
             max_discount_cents, usage_limit, used_count, valid_from, valid_until, \
             is_active, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        )
        .bind(&coupon.id)
        .bind(normalize_code(&coupon.code))
        .bind(coupon.discount_type)
        .bind(coupon.discount_value)
        .bind(coupon.min_purchase_cents)
        .bind(coupon.max_discount_cents)
        .bind(coupon.usage_limit)
        .bind(coupon.used_count)
        .bind(coupon.valid_from)
        .bind(coupon.valid_until)
        .bind(coupon.is_active)
        .bind(coupon.created_at)
        .bind(coupon.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// The guarded compare-and-increment, usable on a pool or inside a
/// transaction. The limit check and the increment are one statement, which
/// is what makes concurrent exhaustion impossible.
pub(crate) async fn increment_usage_guarded<'e, E>(
    executor: E,
    id: &str,
    now: DateTime<Utc>,
) -> DbResult<bool>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result = sqlx::query(
        "UPDATE coupons \
         SET used_count = used_count + 1, updated_at = ?2 \
         WHERE id = ?1 \
           AND is_active = 1 \
           AND (usage_limit IS NULL OR used_count < usage_limit)",
    )
    .bind(id)
    .bind(now)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Generates a new coupon ID.
pub fn generate_coupon_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
