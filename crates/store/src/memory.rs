//! In-memory store implementation for tests and local runs.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{CartId, Money, OrderId, ProductId, UserId};
use domain::{
    Cart, CartItem, CartLine, CartOwner, NewOrder, Order, OrderItem, OrderStatus, Product,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{Result, StockReservation, Store, StoreError, StoreTx};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    products: HashMap<ProductId, Product>,
    carts: Vec<Cart>,
    cart_items: Vec<CartItem>,
    orders: Vec<Order>,
    order_items: Vec<OrderItem>,
}

/// In-memory store with serializable transactions.
///
/// A transaction acquires the state mutex for its entire lifetime and
/// works on a scratch copy; commit writes the copy back, drop discards it.
/// Holding the lock across the transaction serializes concurrent checkouts
/// the same way row locks do in the PostgreSQL backend.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a product row.
    pub async fn insert_product(&self, product: Product) {
        self.state
            .lock()
            .await
            .products
            .insert(product.id, product);
    }

    /// Returns a product's current stock, for assertions in tests.
    pub async fn product_stock(&self, id: ProductId) -> Option<u32> {
        self.state.lock().await.products.get(&id).map(|p| p.stock)
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.state.lock().await.orders.len()
    }
}

/// An in-flight transaction against a [`MemoryStore`].
pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    scratch: MemoryState,
}

#[async_trait]
impl Store for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx> {
        let guard = self.state.clone().lock_owned().await;
        let scratch = guard.clone();
        Ok(MemoryTx { guard, scratch })
    }
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn product(&mut self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.scratch.products.get(&id).cloned())
    }

    async fn product_by_slug(&mut self, slug: &str) -> Result<Option<Product>> {
        Ok(self
            .scratch
            .products
            .values()
            .find(|p| p.slug == slug)
            .cloned())
    }

    async fn reserve_stock(&mut self, id: ProductId, quantity: u32) -> Result<StockReservation> {
        match self.scratch.products.get_mut(&id) {
            Some(product) if product.stock >= quantity => {
                product.stock -= quantity;
                Ok(StockReservation::Reserved)
            }
            Some(product) => Ok(StockReservation::Insufficient {
                available: product.stock,
            }),
            None => Ok(StockReservation::Insufficient { available: 0 }),
        }
    }

    async fn release_stock(&mut self, id: ProductId, quantity: u32) -> Result<()> {
        if let Some(product) = self.scratch.products.get_mut(&id) {
            product.stock += quantity;
        }
        Ok(())
    }

    async fn find_cart(&mut self, owner: &CartOwner) -> Result<Option<Cart>> {
        Ok(self
            .scratch
            .carts
            .iter()
            .find(|c| &c.owner == owner)
            .cloned())
    }

    async fn insert_cart(&mut self, cart: &Cart) -> Result<()> {
        if self.scratch.carts.iter().any(|c| c.owner == cart.owner) {
            return Err(StoreError::Constraint(format!(
                "cart already exists for owner of cart {}",
                cart.id
            )));
        }
        self.scratch.carts.push(cart.clone());
        Ok(())
    }

    async fn cart_items(&mut self, cart_id: CartId) -> Result<Vec<CartItem>> {
        Ok(self
            .scratch
            .cart_items
            .iter()
            .filter(|i| i.cart_id == cart_id)
            .cloned()
            .collect())
    }

    async fn find_cart_item(
        &mut self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<Option<CartItem>> {
        Ok(self
            .scratch
            .cart_items
            .iter()
            .find(|i| i.cart_id == cart_id && i.product_id == product_id)
            .cloned())
    }

    async fn upsert_cart_item(
        &mut self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: u32,
        price_at_add: Money,
    ) -> Result<()> {
        if let Some(item) = self
            .scratch
            .cart_items
            .iter_mut()
            .find(|i| i.cart_id == cart_id && i.product_id == product_id)
        {
            item.quantity += quantity;
        } else {
            self.scratch.cart_items.push(CartItem {
                cart_id,
                product_id,
                quantity,
                price_at_add,
                added_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn set_cart_item_quantity(
        &mut self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<()> {
        if let Some(item) = self
            .scratch
            .cart_items
            .iter_mut()
            .find(|i| i.cart_id == cart_id && i.product_id == product_id)
        {
            item.quantity = quantity;
        }
        Ok(())
    }

    async fn remove_cart_item(&mut self, cart_id: CartId, product_id: ProductId) -> Result<()> {
        self.scratch
            .cart_items
            .retain(|i| !(i.cart_id == cart_id && i.product_id == product_id));
        Ok(())
    }

    async fn clear_cart(&mut self, cart_id: CartId) -> Result<()> {
        self.scratch.cart_items.retain(|i| i.cart_id != cart_id);
        Ok(())
    }

    async fn cart_snapshot(&mut self, cart_id: CartId) -> Result<Vec<CartLine>> {
        let mut lines = Vec::new();
        for item in self.scratch.cart_items.iter().filter(|i| i.cart_id == cart_id) {
            let product = self
                .scratch
                .products
                .get(&item.product_id)
                .cloned()
                .ok_or_else(|| {
                    StoreError::Constraint(format!(
                        "cart references missing product {}",
                        item.product_id
                    ))
                })?;
            lines.push(CartLine {
                product,
                quantity: item.quantity,
            });
        }
        Ok(lines)
    }

    async fn insert_order(&mut self, order: NewOrder) -> Result<Order> {
        if self
            .scratch
            .orders
            .iter()
            .any(|o| o.reference == order.reference)
        {
            return Err(StoreError::Constraint(format!(
                "duplicate order reference {}",
                order.reference
            )));
        }

        let now = Utc::now();
        let stored = Order {
            id: order.id,
            user_id: order.user_id,
            status: OrderStatus::Pending,
            total_amount: order.total_amount,
            reference: order.reference,
            created_at: now,
            updated_at: now,
        };
        for item in &order.items {
            self.scratch.order_items.push(OrderItem {
                order_id: order.id,
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.unit_price,
            });
        }
        self.scratch.orders.push(stored.clone());
        Ok(stored)
    }

    async fn order_by_id(&mut self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.scratch.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn order_by_reference(&mut self, reference: &str) -> Result<Option<Order>> {
        Ok(self
            .scratch
            .orders
            .iter()
            .find(|o| o.reference == reference)
            .cloned())
    }

    async fn order_for_user(
        &mut self,
        reference: &str,
        user_id: UserId,
    ) -> Result<Option<Order>> {
        Ok(self
            .scratch
            .orders
            .iter()
            .find(|o| o.reference == reference && o.user_id == user_id)
            .cloned())
    }

    async fn order_items(&mut self, order_id: OrderId) -> Result<Vec<OrderItem>> {
        Ok(self
            .scratch
            .order_items
            .iter()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn set_order_status(&mut self, id: OrderId, status: OrderStatus) -> Result<()> {
        if let Some(order) = self.scratch.orders.iter_mut().find(|o| o.id == id) {
            order.status = status;
            order.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn commit(mut self) -> Result<()> {
        *self.guard = self.scratch;
        Ok(())
    }
}
