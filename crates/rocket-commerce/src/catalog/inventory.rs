//! Stock level type.

use crate::ids::ProductId;
use serde::{Deserialize, Serialize};

/// Authoritative available quantity for a product, as served by
/// `GET /stock/{id}`. Never cached beyond the request that fetched it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stock {
    /// Product this stock level belongs to.
    pub id: ProductId,
    /// Units available.
    pub amount: i64,
}

impl Stock {
    /// Whether `requested` units can be held in a cart.
    pub fn covers(&self, requested: i64) -> bool {
        self.amount >= requested
    }
}
