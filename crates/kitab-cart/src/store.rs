//! # Cart Store
//!
//! The session-facing cart manager.
//!
//! ## Thread Safety
//! The cart is wrapped in `Arc<Mutex<T>>` because:
//! 1. UI events and the session owner may share the store
//! 2. Only one caller should mutate the cart at a time
//! 3. Mutations are quick (pure math), so a Mutex is enough
//!
//! ## Mutation Protocol
//! Every mutation runs the same three steps, in order:
//! 1. Mutate the pure [`Cart`] under the lock (cannot fail)
//! 2. Persist raw state via [`CartStorage`] (failure logged, swallowed)
//! 3. Queue a snapshot on the [`SyncHandle`] (never blocks, best effort)
//!
//! Totals returned to the caller are recomputed inside the same lock hold,
//! so the caller always sees figures consistent with the mutation it made.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::warn;

use kitab_core::coupon::CouponBenefit;
use kitab_core::{Book, Cart, CartTotals, Coupon, CouponRejection, DeliveryType};

use crate::storage::{CartStorage, PersistedCart};
use crate::sync::SyncHandle;

/// The client cart session store.
pub struct CartStore {
    cart: Arc<Mutex<Cart>>,
    storage: Arc<dyn CartStorage + Send + Sync>,
    sync: Option<SyncHandle>,
}

impl CartStore {
    /// Opens a cart session, restoring persisted raw state when present.
    ///
    /// A corrupt or unreadable cart file is logged and replaced with an
    /// empty cart - a shopper with a broken file should get a working cart,
    /// not an error page. Derived totals are recomputed from the restored
    /// items; they were never persisted.
    pub fn open(storage: Arc<dyn CartStorage + Send + Sync>, sync: Option<SyncHandle>) -> Self {
        let cart = match storage.load() {
            Ok(Some(persisted)) => persisted.into_cart(),
            Ok(None) => Cart::new(),
            Err(e) => {
                warn!(error = %e, "Failed to load persisted cart, starting empty");
                Cart::new()
            }
        };

        CartStore {
            cart: Arc::new(Mutex::new(cart)),
            storage,
            sync,
        }
    }

    /// Executes a function with read access to the cart.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().expect("Cart mutex poisoned");
        f(&cart)
    }

    /// Current derived totals.
    pub fn totals(&self) -> CartTotals {
        self.with_cart(|c| c.totals(Utc::now()))
    }

    /// Adds a book (quantity 1). Adding a book already in the cart is a
    /// no-op; either way the caller gets fresh totals.
    pub fn add_item(&self, book: &Book) -> CartTotals {
        self.mutate(|cart| {
            cart.add_item(book);
        })
    }

    /// Removes a line by book id.
    pub fn remove_item(&self, book_id: &str) -> CartTotals {
        self.mutate(|cart| {
            cart.remove_item(book_id);
        })
    }

    /// Updates a line quantity (clamped to `{0,1}`; 0 removes, negatives
    /// are a no-op).
    pub fn update_quantity(&self, book_id: &str, quantity: i64) -> CartTotals {
        self.mutate(|cart| {
            cart.update_quantity(book_id, quantity);
        })
    }

    /// Selects the delivery method for the fee preview.
    pub fn set_delivery_type(&self, delivery_type: DeliveryType) -> CartTotals {
        self.mutate(|cart| cart.set_delivery_type(delivery_type))
    }

    /// Applies a coupon that upstream validation accepted. The shared
    /// evaluator re-runs against the CURRENT subtotal, so a cart that
    /// changed since validation can still reject here.
    pub fn apply_coupon(&self, coupon: Coupon) -> Result<(CouponBenefit, CartTotals), CouponRejection> {
        let now = Utc::now();
        let (result, snapshot, totals) = {
            let mut cart = self.cart.lock().expect("Cart mutex poisoned");
            let result = cart.apply_coupon(coupon, now);
            (result, PersistedCart::from_cart(&cart), cart.totals(now))
        };

        match result {
            Ok(benefit) => {
                self.persist_and_sync(snapshot);
                Ok((benefit, totals))
            }
            Err(rejection) => Err(rejection),
        }
    }

    /// Clears the applied coupon.
    pub fn remove_coupon(&self) -> CartTotals {
        self.mutate(|cart| {
            cart.remove_coupon();
        })
    }

    /// Empties items and coupon.
    pub fn clear(&self) -> CartTotals {
        self.mutate(|cart| cart.clear())
    }

    /// The shared mutation protocol: mutate under lock, snapshot, recompute,
    /// then persist + sync outside the lock.
    fn mutate<F>(&self, f: F) -> CartTotals
    where
        F: FnOnce(&mut Cart),
    {
        let (snapshot, totals) = {
            let mut cart = self.cart.lock().expect("Cart mutex poisoned");
            f(&mut cart);
            (PersistedCart::from_cart(&cart), cart.totals(Utc::now()))
        };

        self.persist_and_sync(snapshot);
        totals
    }

    fn persist_and_sync(&self, snapshot: PersistedCart) {
        if let Err(e) = self.storage.save(&snapshot) {
            warn!(error = %e, "Failed to persist cart, keeping in-memory state");
        }

        if let Some(sync) = &self.sync {
            sync.queue(snapshot);
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::sync::{spawn_sync_worker, sync_channel};
    use chrono::{Duration, Utc};
    use kitab_core::DiscountType;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn test_book(id: &str, price_cents: i64) -> Book {
        let now = Utc::now();
        Book {
            id: id.to_string(),
            title: format!("Book {}", id),
            author: None,
            price_cents,
            cover_image: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn test_coupon(min_purchase: Option<i64>) -> Coupon {
        let now = Utc::now();
        Coupon {
            id: "c1".to_string(),
            code: "SAVE10".to_string(),
            discount_type: DiscountType::Percentage,
            discount_value: 10,
            min_purchase_cents: min_purchase,
            max_discount_cents: None,
            usage_limit: None,
            used_count: 0,
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(1),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_mutations_persist_raw_state() {
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::open(storage.clone(), None);

        store.add_item(&test_book("a", 2000));

        let persisted = storage.load().unwrap().unwrap();
        assert_eq!(persisted.items.len(), 1);
        assert_eq!(persisted.items[0].book_id, "a");
    }

    #[test]
    fn test_session_restores_from_storage() {
        let storage = Arc::new(MemoryStorage::new());

        {
            let store = CartStore::open(storage.clone(), None);
            store.add_item(&test_book("a", 2000));
            store.add_item(&test_book("b", 1500));
        }

        // A new session over the same storage sees the items, and totals
        // are derived fresh from them.
        let store = CartStore::open(storage, None);
        let totals = store.totals();
        assert_eq!(totals.item_count, 2);
        assert_eq!(totals.subtotal_cents, 3500);
    }

    #[test]
    fn test_duplicate_add_is_noop() {
        let store = CartStore::open(Arc::new(MemoryStorage::new()), None);
        let book = test_book("a", 2000);

        store.add_item(&book);
        let totals = store.add_item(&book);

        assert_eq!(totals.item_count, 1);
        assert_eq!(totals.subtotal_cents, 2000);
    }

    #[test]
    fn test_rejected_coupon_is_not_stored() {
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::open(storage.clone(), None);
        store.add_item(&test_book("a", 1000));

        let result = store.apply_coupon(test_coupon(Some(1500)));
        assert!(matches!(
            result,
            Err(CouponRejection::BelowMinimumPurchase { .. })
        ));

        assert!(storage.load().unwrap().unwrap().coupon.is_none());
        assert_eq!(store.totals().discount_cents, 0);
    }

    #[tokio::test]
    async fn test_mutations_queue_sync_snapshots() {
        let (handle, rx) = sync_channel(16);
        let pushed = Arc::new(AtomicUsize::new(0));

        let counter = pushed.clone();
        let worker = spawn_sync_worker(rx, move |_snapshot| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<(), crate::sync::SyncError>(())
            }
        });

        let store = CartStore::open(Arc::new(MemoryStorage::new()), Some(handle));
        store.add_item(&test_book("a", 2000));
        store.update_quantity("a", 0);
        drop(store);

        worker.await.unwrap();
        assert_eq!(pushed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_sync_failure_leaves_cart_usable() {
        let (handle, rx) = sync_channel(16);
        let worker = spawn_sync_worker(rx, move |_snapshot| async move {
            Err(crate::sync::SyncError::Transport("offline".to_string()))
        });

        let store = CartStore::open(Arc::new(MemoryStorage::new()), Some(handle));
        let totals = store.add_item(&test_book("a", 2000));

        // The failed push changes nothing locally
        assert_eq!(totals.subtotal_cents, 2000);
        assert_eq!(store.totals().subtotal_cents, 2000);

        drop(store);
        worker.await.unwrap();
    }
}
