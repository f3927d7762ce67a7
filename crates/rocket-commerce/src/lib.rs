//! Cart domain types and the persisted cart store for RocketShoes.
//!
//! - **Catalog**: `Product` and `Stock` records served by the storefront API
//! - **Cart**: ordered, id-unique line items with copy-on-write transitions
//! - **Store**: `CartStore`, which validates quantities against the catalog
//!   and persists every mutation under `@RocketShoes:cart`
//!
//! # Example
//!
//! ```rust,ignore
//! use rocket_commerce::prelude::*;
//!
//! let store = CartStore::load(catalog, Cache::in_memory(), Arc::new(LogNotifier));
//!
//! store.add_product(ProductId::new(1)).await;
//! store
//!     .update_product_amount(UpdateProductAmount {
//!         product_id: ProductId::new(1),
//!         amount: 3,
//!     })
//!     .await;
//!
//! let pricing = store.cart().pricing(Currency::BRL)?;
//! println!("Total: {}", pricing.total);
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod ports;
pub mod store;

pub use error::{CartError, CartOperation, CatalogError};
pub use ids::ProductId;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{CartError, CartOperation, CatalogError};
    pub use crate::ids::ProductId;
    pub use crate::money::{Currency, Money};

    pub use crate::cart::{Cart, CartItem, CartPricing, LinePricing};
    pub use crate::catalog::{Product, Stock};
    pub use crate::ports::{Catalog, LogNotifier, Notifier};
    pub use crate::store::{CartSnapshot, CartStore, UpdateProductAmount, CART_STORAGE_KEY};

    pub use rocket_cache::Cache;
}
