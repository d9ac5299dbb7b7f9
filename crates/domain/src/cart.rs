//! Shopping cart rows and the checkout snapshot line.

use chrono::{DateTime, Utc};
use common::{CartId, Money, ProductId, SessionToken, UserId};
use serde::{Deserialize, Serialize};

use crate::product::Product;

/// Who owns a cart: a user account or an anonymous session, never both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CartOwner {
    User(UserId),
    Session(SessionToken),
}

/// A shopping cart, created lazily on first access for its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub owner: CartOwner,
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a fresh cart for the given owner.
    pub fn new(owner: CartOwner) -> Self {
        Self {
            id: CartId::new(),
            owner,
            created_at: Utc::now(),
        }
    }
}

/// A line in a cart. At most one per (cart, product) pair; adding the same
/// product again increments `quantity` instead of duplicating the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: u32,
    /// Catalog price when the item was first added. Display-only; checkout
    /// re-reads the current price.
    pub price_at_add: Money,
    pub added_at: DateTime<Utc>,
}

/// A cart line joined with its product, as read by the checkout
/// orchestrator inside its own transaction. Carries the current catalog
/// price, which is authoritative for the order total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    /// Line total at the current catalog price.
    pub fn line_total(&self) -> Money {
        self.product.price.multiply(self.quantity)
    }
}
