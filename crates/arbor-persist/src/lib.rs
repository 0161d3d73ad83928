//! Arbor Persistence
//!
//! File-backed stores built on [`arbor_store::NestedStore`].
//!
//! # Core Concepts
//!
//! - [`PersistentStore`]: namespaces loaded from and saved to files, with
//!   transparent loading on first access
//! - [`Configuration`] / [`Localization`]: persistent stores whose files are
//!   looked up in an environment or locale subdirectory first
//! - [`OverlayContext`]: shareable active environment and locale
//! - [`StoreError`]: I/O failures, retained rather than returned
//!
//! # Example
//!
//! ```rust,no_run
//! use arbor_persist::{PersistConfig, PersistentStore};
//! use arbor_store::PathStore;
//!
//! let mut store = PersistentStore::new(PersistConfig::new("data/"))?;
//! store.set("app:server.port", 8080);
//! if !store.save(Some("app"), Some("xml")) {
//!     eprintln!("save failed: {:?}", store.last_error());
//! }
//! # Ok::<(), arbor_persist::StoreError>(())
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod config;
mod error;
pub mod overlay;
mod store;

pub use config::{OverlayConfig, PersistConfig, DEFAULT_EXTENSIONS, DEFAULT_FORMAT};
pub use error::{StoreError, StoreErrorKind, StoreResult};
pub use overlay::{Configuration, Localization, Overlay, OverlayContext, OverlayStore};
pub use store::{DirectoryGuard, NamespaceState, PersistentStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with persistent stores
    pub use crate::{
        Configuration, Localization, OverlayContext, PersistConfig, PersistentStore, StoreError,
    };
    pub use arbor_store::{PathStore, Value};
}
