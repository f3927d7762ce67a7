//! Cart pricing calculations.

use crate::cart::Cart;
use crate::error::CartError;
use crate::ids::ProductId;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Pricing breakdown for a whole cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartPricing {
    /// Per-line breakdown, in cart order.
    pub lines: Vec<LinePricing>,
    /// Sum of every line subtotal.
    pub total: Money,
    /// Sum of quantities.
    pub item_count: i64,
}

/// Pricing breakdown for a single line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinePricing {
    /// Product on this line.
    pub product_id: ProductId,
    /// Unit price.
    pub unit_price: Money,
    /// Quantity.
    pub amount: i64,
    /// unit_price * amount.
    pub subtotal: Money,
}

impl Cart {
    /// Calculate line subtotals and the cart total.
    ///
    /// Returns error if arithmetic overflow occurs.
    pub fn pricing(&self, currency: Currency) -> Result<CartPricing, CartError> {
        let lines = self
            .iter()
            .map(|item| {
                let unit_price = item.product.unit_price(currency);
                let subtotal = unit_price
                    .try_multiply(item.amount)
                    .ok_or(CartError::Overflow)?;
                Ok(LinePricing {
                    product_id: item.id(),
                    unit_price,
                    amount: item.amount,
                    subtotal,
                })
            })
            .collect::<Result<Vec<_>, CartError>>()?;

        let total = Money::try_sum(lines.iter().map(|l| &l.subtotal), currency)
            .ok_or(CartError::Overflow)?;

        Ok(CartPricing {
            lines,
            total,
            item_count: self.item_count(),
        })
    }
}
