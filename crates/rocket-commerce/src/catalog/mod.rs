//! Product catalog module.
//!
//! Contains the product and stock records served by the storefront API.

mod inventory;
mod product;

pub use inventory::Stock;
pub use product::Product;
