//! Seams the cart store depends on: catalog lookups and user notifications.

use async_trait::async_trait;

use crate::catalog::{Product, Stock};
use crate::error::CatalogError;
use crate::ids::ProductId;

/// Remote source of product details and stock levels.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Current stock level for a product.
    async fn stock(&self, id: ProductId) -> Result<Stock, CatalogError>;

    /// Display details for a product.
    async fn product(&self, id: ProductId) -> Result<Product, CatalogError>;

    /// Every product on sale.
    async fn products(&self) -> Result<Vec<Product>, CatalogError>;
}

/// Fire-and-forget channel for user-visible failure messages (a toast).
pub trait Notifier: Send + Sync {
    /// Show an error message to the user.
    fn error(&self, message: &str);
}

/// Notifier that only writes to the log, for headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn error(&self, message: &str) {
        tracing::error!(target: "rocket_commerce::notify", "{message}");
    }
}
