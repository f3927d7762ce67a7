//! Cart and line item types.

use crate::catalog::Product;
use crate::ids::ProductId;
use serde::{Deserialize, Serialize};

/// A product held in the cart together with its quantity.
///
/// Serialized flat, so a persisted entry reads
/// `{ "id", "title", "price", "image", "amount" }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    /// The product being purchased.
    #[serde(flatten)]
    pub product: Product,
    /// Quantity in cart. Always at least 1.
    pub amount: i64,
}

impl CartItem {
    /// Create a line for `product` with quantity 1.
    pub fn new(product: Product) -> Self {
        Self { product, amount: 1 }
    }

    /// Product identifier.
    pub fn id(&self) -> ProductId {
        self.product.id
    }
}

/// A shopping cart: ordered, unique by product id.
///
/// Values are never edited in place. Every transition returns a new `Cart`
/// and leaves `self` untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from raw entries, dropping lines that break the cart
    /// invariants (non-positive amounts, repeated ids; first occurrence wins).
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            if item.amount >= 1 && cart.find(item.id()).is_none() {
                cart.items.push(item);
            }
        }
        cart
    }

    /// Items in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Iterate over items in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, CartItem> {
        self.items.iter()
    }

    /// Find the line for a product.
    pub fn find(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.id() == product_id)
    }

    /// Whether the product has a line in the cart.
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.find(product_id).is_some()
    }

    /// Quantity held for a product (0 if absent).
    pub fn amount_of(&self, product_id: ProductId) -> i64 {
        self.find(product_id).map_or(0, |i| i.amount)
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total item count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.amount).sum()
    }

    /// A new cart with `product` appended at quantity 1.
    ///
    /// Returns an unchanged copy if the product already has a line.
    pub fn with_product(&self, product: Product) -> Cart {
        let mut next = self.clone();
        if !self.contains(product.id) {
            next.items.push(CartItem::new(product));
        }
        next
    }

    /// A new cart where the product's quantity is `amount`; order and all
    /// other lines are preserved.
    pub fn with_amount(&self, product_id: ProductId, amount: i64) -> Cart {
        let items = self
            .items
            .iter()
            .map(|item| {
                if item.id() == product_id {
                    CartItem {
                        amount,
                        ..item.clone()
                    }
                } else {
                    item.clone()
                }
            })
            .collect();
        Cart { items }
    }

    /// A new cart without the product's line.
    pub fn without(&self, product_id: ProductId) -> Cart {
        let items = self
            .items
            .iter()
            .filter(|i| i.id() != product_id)
            .cloned()
            .collect();
        Cart { items }
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
