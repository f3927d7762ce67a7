//! Shopping cart module.
//!
//! Contains the cart value type and its pricing breakdown.

#[allow(clippy::module_inception)]
mod cart;
mod pricing;

pub use cart::{Cart, CartItem};
pub use pricing::{CartPricing, LinePricing};
