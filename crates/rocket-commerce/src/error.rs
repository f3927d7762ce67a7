//! Cart error types.

use std::fmt;

use thiserror::Error;

use crate::ids::ProductId;

/// Errors raised by a catalog lookup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The catalog has no record for this product.
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// The lookup could not be completed.
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    /// The catalog answered with a payload that could not be decoded.
    #[error("Invalid catalog response: {0}")]
    InvalidResponse(String),
}

/// Errors that can occur in cart operations.
#[derive(Error, Debug)]
pub enum CartError {
    /// Requested quantity exceeds the available stock.
    #[error("Out of stock for {product_id}: requested {requested}, available {available}")]
    OutOfStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    /// Product details could not be fetched.
    #[error("Failed to fetch product {product_id}: {source}")]
    ProductFetch {
        product_id: ProductId,
        #[source]
        source: CatalogError,
    },

    /// Stock level could not be fetched.
    #[error("Failed to fetch stock for {product_id}: {source}")]
    StockFetch {
        product_id: ProductId,
        #[source]
        source: CatalogError,
    },

    /// Product is not in the cart.
    #[error("Product not in cart: {0}")]
    ProductNotInCart(ProductId),

    /// Persisting the cart failed.
    #[error("Storage error: {0}")]
    Storage(#[from] rocket_cache::CacheError),

    /// Arithmetic overflow in a price calculation.
    #[error("Arithmetic overflow in price calculation")]
    Overflow,
}

/// The public cart operations, used to pick a notification message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOperation {
    Add,
    Remove,
    Update,
}

impl fmt::Display for CartOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Remove => write!(f, "remove"),
            Self::Update => write!(f, "update"),
        }
    }
}

/// Shown for any out-of-stock failure.
pub const OUT_OF_STOCK_MESSAGE: &str = "Quantidade solicitada fora de estoque";
/// Shown for any other failure while adding.
pub const ADD_FAILED_MESSAGE: &str = "Erro na adição do produto";
/// Shown for any failure while removing.
pub const REMOVE_FAILED_MESSAGE: &str = "Erro na remoção do produto";
/// Shown for any other failure while updating a quantity.
pub const UPDATE_FAILED_MESSAGE: &str = "Erro na alteração de quantidade do produto";

impl CartError {
    /// The user-facing notification for this error raised by `op`.
    ///
    /// Only stock shortages get their own message; every other failure maps
    /// to the operation's generic message. Details stay in the logs.
    pub fn user_message(&self, op: CartOperation) -> &'static str {
        match (self, op) {
            (Self::OutOfStock { .. }, _) => OUT_OF_STOCK_MESSAGE,
            (_, CartOperation::Add) => ADD_FAILED_MESSAGE,
            (_, CartOperation::Remove) => REMOVE_FAILED_MESSAGE,
            (_, CartOperation::Update) => UPDATE_FAILED_MESSAGE,
        }
    }
}
