//! # kitab-cart: Client Cart Session
//!
//! The client-side cart manager: the pure reducer from `kitab-core` wrapped
//! with durable local storage and a best-effort server sync.
//!
//! ## Separation of Concerns
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Session Layers                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   CartStore (store.rs)                          │   │
//! │  │                                                                 │   │
//! │  │   add_item / remove_item / update_quantity / apply_coupon /    │   │
//! │  │   remove_coupon / clear                                        │   │
//! │  │        │                                                        │   │
//! │  │        ▼                                                        │   │
//! │  │   pure Cart mutation (kitab-core) - cannot fail                │   │
//! │  │        │                                                        │   │
//! │  │        ├──► CartStorage.save()  raw state only, totals are     │   │
//! │  │        │    (storage.rs)        recomputed on load             │   │
//! │  │        │                                                        │   │
//! │  │        └──► SyncHandle.queue()  non-blocking try_send;         │   │
//! │  │             (sync.rs)           worker pushes in background    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  Failure policy: storage and sync failures are logged and SWALLOWED.   │
//! │  The in-memory cart keeps working offline; the server only becomes     │
//! │  authoritative at checkout, which re-prices everything anyway.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod storage;
pub mod store;
pub mod sync;

pub use storage::{CartStorage, JsonFileStorage, MemoryStorage, PersistedCart, StorageError};
pub use store::CartStore;
pub use sync::{spawn_sync_worker, sync_channel, SyncError, SyncHandle};
