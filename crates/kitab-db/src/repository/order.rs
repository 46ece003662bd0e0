//! # Order Repository
//!
//! Database operations for orders and order items.
//!
//! ## Order Creation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 create_order() transaction                              │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    INSERT INTO orders       (recomputed snapshot)                       │
//! │    INSERT INTO order_items  (one per line, frozen title + price)        │
//! │    UPDATE coupons …         (guarded increment, only when a coupon      │
//! │                              was applied)                               │
//! │      └── 0 rows? ROLLBACK → CouponExhausted                             │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  All-or-nothing: a failed insert or a lost coupon race leaves no        │
//! │  order row and no item rows behind. A retried request re-runs the       │
//! │  whole transaction, so the increment can never double-apply for one     │
//! │  committed order.                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::coupon::increment_usage_guarded;
use kitab_core::{Order, OrderItem};

const ORDER_COLUMNS: &str = "id, order_number, tracking_number, status, customer_name, email, \
     phone, address, city, delivery_type, coupon_code, subtotal_cents, \
     discount_cents, delivery_fee_cents, total_cents, created_at, updated_at";

const ORDER_ITEM_COLUMNS: &str =
    "id, order_id, book_id, title_snapshot, unit_price_cents, quantity, line_total_cents, created_at";

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Persists an order with its items, consuming one coupon redemption
    /// when `coupon_id` is set - all inside a single transaction.
    ///
    /// ## Errors
    /// - [`DbError::CouponExhausted`] when a concurrent checkout consumed
    ///   the last redemption; nothing is persisted.
    /// - Any insert failure rolls the whole order back.
    pub async fn create_order(
        &self,
        order: &Order,
        items: &[OrderItem],
        coupon_id: Option<&str>,
    ) -> DbResult<()> {
        debug!(order_number = %order.order_number, items = items.len(), "Creating order");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO orders (id, order_number, tracking_number, status, customer_name, \
             email, phone, address, city, delivery_type, coupon_code, subtotal_cents, \
             discount_cents, delivery_fee_cents, total_cents, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        )
        .bind(&order.id)
        .bind(&order.order_number)
        .bind(&order.tracking_number)
        .bind(order.status)
        .bind(&order.customer_name)
        .bind(&order.email)
        .bind(&order.phone)
        .bind(&order.address)
        .bind(&order.city)
        .bind(order.delivery_type)
        .bind(&order.coupon_code)
        .bind(order.subtotal_cents)
        .bind(order.discount_cents)
        .bind(order.delivery_fee_cents)
        .bind(order.total_cents)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                "INSERT INTO order_items (id, order_id, book_id, title_snapshot, \
                 unit_price_cents, quantity, line_total_cents, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )
            .bind(&item.id)
            .bind(&item.order_id)
            .bind(&item.book_id)
            .bind(&item.title_snapshot)
            .bind(item.unit_price_cents)
            .bind(item.quantity)
            .bind(item.line_total_cents)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(coupon_id) = coupon_id {
            let consumed = increment_usage_guarded(&mut *tx, coupon_id, Utc::now()).await?;
            if !consumed {
                tx.rollback().await?;
                return Err(DbError::CouponExhausted {
                    code: order.coupon_code.clone().unwrap_or_default(),
                });
            }
        }

        tx.commit().await?;

        info!(
            order_number = %order.order_number,
            total_cents = order.total_cents,
            "Order created"
        );

        Ok(())
    }

    /// Gets an order by its public tracking number.
    pub async fn get_by_tracking_number(&self, tracking_number: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE tracking_number = ?1"
        ))
        .bind(tracking_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets all items for an order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ORDER_ITEM_COLUMNS} FROM order_items \
             WHERE order_id = ?1 ORDER BY created_at"
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Counts all orders (diagnostics and tests).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Generates a new order ID.
pub fn generate_order_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates an order number in format: KB-YYYYMMDD-NNNN
///
/// ## Example
/// `KB-20260806-0042`
// TODO: the sequence is timestamp-derived; replace with a daily counter
// table once order volume makes collisions plausible.
pub fn generate_order_number() -> String {
    let now = Utc::now();
    let seq = (now.timestamp_millis() % 10000) as u32;
    format!("KB-{}-{:04}", now.format("%Y%m%d"), seq)
}

/// Generates an opaque tracking number customers can share.
pub fn generate_tracking_number() -> String {
    let raw = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("KT-{}", &raw[..12])
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::coupon::generate_coupon_id;
    use chrono::Duration;
    use kitab_core::{Coupon, DeliveryType, DiscountType, OrderStatus};

    fn test_order(coupon_code: Option<&str>) -> Order {
        let now = Utc::now();
        Order {
            id: generate_order_id(),
            order_number: generate_order_number(),
            tracking_number: generate_tracking_number(),
            status: OrderStatus::Pending,
            customer_name: "Amine B.".to_string(),
            email: "reader@example.com".to_string(),
            phone: "0555123456".to_string(),
            address: "12 Rue Didouche Mourad".to_string(),
            city: "Algiers".to_string(),
            delivery_type: DeliveryType::Home,
            coupon_code: coupon_code.map(|c| c.to_string()),
            subtotal_cents: 2000,
            discount_cents: 200,
            delivery_fee_cents: 700,
            total_cents: 2500,
            created_at: now,
            updated_at: now,
        }
    }

    fn test_item(order_id: &str) -> OrderItem {
        OrderItem {
            id: Uuid::new_v4().to_string(),
            order_id: order_id.to_string(),
            book_id: "b1".to_string(),
            title_snapshot: "The Stranger".to_string(),
            unit_price_cents: 2000,
            quantity: 1,
            line_total_cents: 2000,
            created_at: Utc::now(),
        }
    }

    fn limited_coupon(code: &str, usage_limit: i64, used_count: i64) -> Coupon {
        let now = Utc::now();
        Coupon {
            id: generate_coupon_id(),
            code: code.to_string(),
            discount_type: DiscountType::Percentage,
            discount_value: 10,
            min_purchase_cents: None,
            max_discount_cents: None,
            usage_limit: Some(usage_limit),
            used_count,
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(1),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();

        let order = test_order(None);
        let items = vec![test_item(&order.id)];
        repo.create_order(&order, &items, None).await.unwrap();

        let fetched = repo
            .get_by_tracking_number(&order.tracking_number)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.order_number, order.order_number);
        assert_eq!(fetched.status, OrderStatus::Pending);
        assert_eq!(fetched.total_cents, 2500);

        let fetched_items = repo.get_items(&order.id).await.unwrap();
        assert_eq!(fetched_items.len(), 1);
        assert_eq!(fetched_items[0].title_snapshot, "The Stranger");
    }

    #[tokio::test]
    async fn test_order_with_coupon_consumes_redemption() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let coupon = limited_coupon("ONCE", 1, 0);
        db.coupons().insert(&coupon).await.unwrap();

        let order = test_order(Some("ONCE"));
        let items = vec![test_item(&order.id)];
        db.orders()
            .create_order(&order, &items, Some(&coupon.id))
            .await
            .unwrap();

        let stored = db.coupons().get_by_code("ONCE").await.unwrap().unwrap();
        assert_eq!(stored.used_count, 1);
    }

    #[tokio::test]
    async fn test_exhausted_coupon_rolls_back_whole_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        // Already at its limit: the guard must refuse
        let coupon = limited_coupon("SPENT", 1, 1);
        db.coupons().insert(&coupon).await.unwrap();

        let order = test_order(Some("SPENT"));
        let items = vec![test_item(&order.id)];
        let result = db
            .orders()
            .create_order(&order, &items, Some(&coupon.id))
            .await;

        assert!(matches!(result, Err(DbError::CouponExhausted { .. })));

        // No order row and no item rows survive the rollback
        assert_eq!(db.orders().count().await.unwrap(), 0);
        assert!(db
            .orders()
            .get_by_tracking_number(&order.tracking_number)
            .await
            .unwrap()
            .is_none());
        assert!(db.orders().get_items(&order.id).await.unwrap().is_empty());
    }

    #[test]
    fn test_number_formats() {
        let order_number = generate_order_number();
        assert!(order_number.starts_with("KB-"));
        assert_eq!(order_number.len(), "KB-20260806-0042".len());

        let tracking = generate_tracking_number();
        assert!(tracking.starts_with("KT-"));
        assert_eq!(tracking.len(), 15);
    }
}
