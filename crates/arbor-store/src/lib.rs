//! Arbor Nested Store
//!
//! In-memory hierarchical container addressed by strings such as
//! `"app:server.port!integer"`.
//!
//! # Core Operations
//!
//! - **Read**: `get`, `get_or` and the typed getters (`get_integer`, ...)
//! - **Write**: `set` (auto-vivifying), `extend` (structural merge), `clear`
//! - **Inspect**: `exist`, `each`
//!
//! # Architecture
//!
//! ```text
//! address ──► PathIndex (memo) ──► SearchCache ──► search / search_mut ──► Value
//!                                      ▲                    │
//!                                      └──── invalidate ◄───┘ (set/extend/clear)
//! ```
//!
//! # Example
//!
//! ```rust
//! use arbor_store::{NestedStore, PathStore};
//!
//! let mut store = NestedStore::new();
//! store.set("app:db.port", "5432");
//!
//! assert_eq!(store.get_integer("app:db.port"), Some(5432));
//! assert_eq!(store.get_boolean("app:db.port"), None);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod access;
mod cache;
pub mod coerce;
mod config;
mod store;

pub use access::PathStore;
pub use cache::{CacheStats, SearchCache};
pub use config::{CacheMode, StoreConfig};
pub use store::NestedStore;

// Re-export the value model so dependents need a single import
pub use arbor_collection::{Callable, Map, Number, Shape, Value};
pub use arbor_path::{ParsedIndex, PathError, TypeHint};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with nested stores
    pub use crate::{CacheMode, NestedStore, PathStore, StoreConfig, Value};
}
