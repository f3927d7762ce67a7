//! Storefront API access for the RocketShoes cart.
//!
//! This crate provides:
//! - `FetchClient` - HTTP GET with automatic timeout/retry
//! - `DependencyTag` - Semantic dependency categories
//! - `TimeoutConfig` - Per-attempt timeouts
//! - `RetryPolicy` - Retry strategies
//! - `StoreApi` - The HTTP-backed cart `Catalog`

mod api;
mod client;
mod dependency;
mod retry;
mod timeout;

pub use api::*;
pub use client::*;
pub use dependency::*;
pub use retry::*;
pub use timeout::*;
