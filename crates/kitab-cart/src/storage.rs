//! # Cart Storage
//!
//! Durable local persistence for the cart session.
//!
//! Only RAW state is persisted (items, coupon, delivery choice). Derived
//! totals are recomputed on load, so a stale file can never present totals
//! that disagree with its own items.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use kitab_core::{Cart, CartItem, Coupon, DeliveryType};

// =============================================================================
// Persisted Form
// =============================================================================

/// The raw cart state that goes to disk and to the server mirror.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PersistedCart {
    pub items: Vec<CartItem>,
    pub coupon: Option<Coupon>,
    #[serde(default)]
    pub delivery_type: DeliveryType,
}

impl PersistedCart {
    /// Captures the raw state of a cart.
    pub fn from_cart(cart: &Cart) -> Self {
        PersistedCart {
            items: cart.items.clone(),
            coupon: cart.coupon.clone(),
            delivery_type: cart.delivery_type,
        }
    }

    /// Rebuilds a cart from persisted raw state. Totals are derived on
    /// demand by the cart itself, which is the whole point of persisting
    /// only raw state.
    pub fn into_cart(self) -> Cart {
        let mut cart = Cart::new();
        cart.items = self.items;
        cart.coupon = self.coupon;
        cart.delivery_type = self.delivery_type;
        cart
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Storage failures. The cart store logs and swallows these - the session
/// keeps its in-memory state either way.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("No platform data directory available")]
    NoDataDir,
}

// =============================================================================
// Storage Trait
// =============================================================================

/// Durable key-value persistence for the cart.
pub trait CartStorage {
    /// Persists the raw cart state.
    fn save(&self, cart: &PersistedCart) -> Result<(), StorageError>;

    /// Loads the raw cart state, `None` if nothing was ever saved.
    fn load(&self) -> Result<Option<PersistedCart>, StorageError>;
}

// =============================================================================
// JSON File Storage
// =============================================================================

/// Cart persistence as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Storage at an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStorage { path: path.into() }
    }

    /// Storage at the platform data directory
    /// (e.g. `~/.local/share/kitab/cart.json` on Linux).
    pub fn at_default_path() -> Result<Self, StorageError> {
        let dirs = ProjectDirs::from("com", "kitab", "kitab").ok_or(StorageError::NoDataDir)?;
        Ok(JsonFileStorage {
            path: dirs.data_dir().join("cart.json"),
        })
    }

    /// The file path in use.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl CartStorage for JsonFileStorage {
    fn save(&self, cart: &PersistedCart) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write-then-rename so a crash mid-write can't truncate the cart
        let tmp = self.path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp)?;
        file.write_all(serde_json::to_string_pretty(cart)?.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)?;

        Ok(())
    }

    fn load(&self) -> Result<Option<PersistedCart>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// In-Memory Storage (tests)
// =============================================================================

/// Storage backed by a mutex-guarded slot. For tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<PersistedCart>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage::default()
    }
}

impl CartStorage for MemoryStorage {
    fn save(&self, cart: &PersistedCart) -> Result<(), StorageError> {
        *self.slot.lock().expect("storage mutex poisoned") = Some(cart.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<PersistedCart>, StorageError> {
        Ok(self.slot.lock().expect("storage mutex poisoned").clone())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
