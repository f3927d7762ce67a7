//! Type-safe Key-Value storage layer for the RocketShoes cart.
//!
//! Provides a simple, ergonomic API for persisting data with automatic JSON
//! serialization, over either a process-local map or a single JSON file.
//!
//! # Example
//!
//! ```rust,ignore
//! use rocket_cache::Cache;
//!
//! let cache = Cache::open_file(".rocketshoes/storage.json")?;
//!
//! // Store a value
//! cache.set("@RocketShoes:cart", &items)?;
//!
//! // Retrieve a value
//! let items: Option<Vec<CartItem>> = cache.get("@RocketShoes:cart")?;
//!
//! // Delete a value
//! cache.delete("@RocketShoes:cart")?;
//! ```

mod backend;
mod error;
mod kv;

pub use backend::{FileBackend, KvBackend, MemoryBackend};
pub use error::CacheError;
pub use kv::Cache;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, FileBackend, KvBackend, MemoryBackend};
}
