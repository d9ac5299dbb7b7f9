//! Transactional storage port for the storefront.
//!
//! Core services depend on the [`Store`] trait, never on a concrete
//! client. A [`Store`] hands out [`StoreTx`] units of work: every mutation
//! inside one transaction commits together or not at all, which is what
//! makes "reserve every line and create the order" and "transition the
//! order and release its stock" atomic pairs.
//!
//! Two implementations ship here:
//! - [`MemoryStore`] — serializable in-memory store for tests and local
//!   runs (a transaction holds the state lock for its whole lifetime).
//! - [`PgStore`] — PostgreSQL over sqlx, where the stock reserve is an
//!   atomic conditional decrement on the product row.

pub mod error;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use common::{CartId, Money, OrderId, ProductId, UserId};
use domain::{Cart, CartItem, CartLine, CartOwner, NewOrder, Order, OrderItem, OrderStatus, Product};

pub use error::{Result, StoreError};
pub use memory::{MemoryStore, MemoryTx};
pub use postgres::{PgStore, PgTx};

/// Outcome of an atomic conditional stock decrement.
///
/// Decrementing stock IS the reservation; there is no separate hold phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockReservation {
    /// The quantity was decremented.
    Reserved,
    /// Not enough stock; nothing was decremented.
    Insufficient { available: u32 },
}

/// A handle to the durable store, able to open transactions.
#[async_trait]
pub trait Store: Send + Sync {
    type Tx: StoreTx;

    /// Opens a transactional unit of work.
    async fn begin(&self) -> Result<Self::Tx>;
}

/// One transactional unit of work against the store.
///
/// Dropping a transaction without calling [`StoreTx::commit`] rolls back
/// everything it did.
#[async_trait]
pub trait StoreTx: Send {
    // -- products / inventory ledger --

    /// Reads a product row.
    async fn product(&mut self, id: ProductId) -> Result<Option<Product>>;

    /// Reads a product row by slug.
    async fn product_by_slug(&mut self, slug: &str) -> Result<Option<Product>>;

    /// Atomically decrements stock if at least `quantity` is available.
    ///
    /// This is a conditional decrement, not a read-then-write: two
    /// transactions racing on the same product serialize here, and the
    /// loser observes `Insufficient`, never negative stock.
    async fn reserve_stock(&mut self, id: ProductId, quantity: u32) -> Result<StockReservation>;

    /// Atomically increments stock (compensation for a failed or canceled
    /// reservation). Callers guarantee at-most-once invocation per
    /// compensating event.
    async fn release_stock(&mut self, id: ProductId, quantity: u32) -> Result<()>;

    // -- carts --

    /// Finds the cart owned by the given identity, if one exists.
    async fn find_cart(&mut self, owner: &CartOwner) -> Result<Option<Cart>>;

    /// Inserts a new cart row.
    async fn insert_cart(&mut self, cart: &Cart) -> Result<()>;

    /// Returns all items of a cart in add order.
    async fn cart_items(&mut self, cart_id: CartId) -> Result<Vec<CartItem>>;

    /// Returns one cart line, if present.
    async fn find_cart_item(
        &mut self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<Option<CartItem>>;

    /// Inserts a cart line, or increments the quantity of the existing
    /// line for the same (cart, product) pair.
    async fn upsert_cart_item(
        &mut self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: u32,
        price_at_add: Money,
    ) -> Result<()>;

    /// Overwrites the quantity of an existing cart line.
    async fn set_cart_item_quantity(
        &mut self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<()>;

    /// Deletes one cart line.
    async fn remove_cart_item(&mut self, cart_id: CartId, product_id: ProductId) -> Result<()>;

    /// Deletes all lines of a cart.
    async fn clear_cart(&mut self, cart_id: CartId) -> Result<()>;

    /// Reads the cart joined with current product rows, in add order.
    /// Checkout calls this inside the same transaction that reserves
    /// stock, so it cannot race a concurrent cart mutation.
    async fn cart_snapshot(&mut self, cart_id: CartId) -> Result<Vec<CartLine>>;

    // -- orders --

    /// Writes an order plus all of its lines as one atomic insert.
    async fn insert_order(&mut self, order: NewOrder) -> Result<Order>;

    /// Reads an order by id.
    async fn order_by_id(&mut self, id: OrderId) -> Result<Option<Order>>;

    /// Reads an order by its payment provider reference.
    async fn order_by_reference(&mut self, reference: &str) -> Result<Option<Order>>;

    /// Reads an order by reference, scoped to its owner (status poll).
    async fn order_for_user(&mut self, reference: &str, user_id: UserId)
    -> Result<Option<Order>>;

    /// Returns the immutable lines of an order.
    async fn order_items(&mut self, order_id: OrderId) -> Result<Vec<OrderItem>>;

    /// Overwrites an order's status and bumps its updated timestamp.
    async fn set_order_status(&mut self, id: OrderId, status: OrderStatus) -> Result<()>;

    /// Commits the unit of work.
    async fn commit(self) -> Result<()>;
}
