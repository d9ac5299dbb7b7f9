//! Product catalog row.

use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

/// A product as seen by the checkout core.
///
/// `stock` is unsigned, so it can never be observed negative; the only
/// thing that may decrement it is the store's atomic conditional decrement
/// (the inventory ledger's reserve operation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    /// Current catalog price; orders snapshot it at checkout time.
    pub price: Money,
    pub stock: u32,
}

impl Product {
    /// Creates a product with a fresh id.
    pub fn new(slug: impl Into<String>, name: impl Into<String>, price: Money, stock: u32) -> Self {
        Self {
            id: ProductId::new(),
            slug: slug.into(),
            name: name.into(),
            price,
            stock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_assigns_unique_ids() {
        let a = Product::new("widget", "Widget", Money::from_cents(1000), 5);
        let b = Product::new("widget", "Widget", Money::from_cents(1000), 5);
        assert_ne!(a.id, b.id);
    }
}
