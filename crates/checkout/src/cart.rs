//! Cart service.
//!
//! Carts belong to either an authenticated user or an anonymous session and
//! are created lazily on first access. Mutations hold at most one line per
//! product and validate quantities against current catalog stock; the real
//! reservation happens later, at checkout.

use common::{CartId, Identity, Money, ProductId};
use domain::{Cart, CartError, CartOwner};
use serde::Serialize;
use store::{Store, StoreTx};

use crate::error::CartServiceError;

/// One line of a cart as presented to the caller. Prices are the current
/// catalog prices, matching what checkout will charge.
#[derive(Debug, Clone, Serialize)]
pub struct CartViewLine {
    pub product_id: ProductId,
    pub slug: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub line_total: Money,
}

/// A cart with its lines and running total.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub cart_id: CartId,
    pub items: Vec<CartViewLine>,
    pub total: Money,
}

/// Cart operations for one store backend.
#[derive(Clone)]
pub struct CartService<S> {
    store: S,
}

impl<S: Store> CartService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn owner(identity: &Identity) -> CartOwner {
        match identity {
            Identity::User { id, .. } => CartOwner::User(*id),
            Identity::Anonymous(token) => CartOwner::Session(token.clone()),
        }
    }

    async fn get_or_create(
        tx: &mut S::Tx,
        identity: &Identity,
    ) -> Result<Cart, CartServiceError> {
        let owner = Self::owner(identity);
        if let Some(cart) = tx.find_cart(&owner).await? {
            return Ok(cart);
        }
        let cart = Cart::new(owner);
        tx.insert_cart(&cart).await?;
        Ok(cart)
    }

    async fn view_of(tx: &mut S::Tx, cart: &Cart) -> Result<CartView, CartServiceError> {
        let items = tx.cart_items(cart.id).await?;
        let mut lines = Vec::with_capacity(items.len());
        let mut total = Money::zero();
        for item in items {
            let product = tx
                .product(item.product_id)
                .await?
                .ok_or(CartError::ProductNotFound(item.product_id))?;
            let line_total = product.price.multiply(item.quantity);
            total += line_total;
            lines.push(CartViewLine {
                product_id: product.id,
                slug: product.slug,
                name: product.name,
                quantity: item.quantity,
                unit_price: product.price,
                line_total,
            });
        }
        Ok(CartView {
            cart_id: cart.id,
            items: lines,
            total,
        })
    }

    /// Returns the caller's cart, creating it on first access.
    pub async fn view(&self, identity: &Identity) -> Result<CartView, CartServiceError> {
        let mut tx = self.store.begin().await?;
        let cart = Self::get_or_create(&mut tx, identity).await?;
        let view = Self::view_of(&mut tx, &cart).await?;
        tx.commit().await?;
        Ok(view)
    }

    /// Adds `quantity` of a product, merging into an existing line.
    pub async fn add_item(
        &self,
        identity: &Identity,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartView, CartServiceError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity.into());
        }

        let mut tx = self.store.begin().await?;
        let product = tx
            .product(product_id)
            .await?
            .ok_or(CartError::ProductNotFound(product_id))?;
        let cart = Self::get_or_create(&mut tx, identity).await?;

        let in_cart = tx
            .find_cart_item(cart.id, product_id)
            .await?
            .map_or(0, |item| item.quantity);
        if in_cart + quantity > product.stock {
            return Err(CartError::InsufficientStock {
                product: product.name,
                available: product.stock.saturating_sub(in_cart),
            }
            .into());
        }

        tx.upsert_cart_item(cart.id, product_id, quantity, product.price)
            .await?;
        let view = Self::view_of(&mut tx, &cart).await?;
        tx.commit().await?;
        Ok(view)
    }

    /// Sets a line's quantity; zero removes the line.
    pub async fn update_quantity(
        &self,
        identity: &Identity,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartView, CartServiceError> {
        let mut tx = self.store.begin().await?;
        let cart = match tx.find_cart(&Self::owner(identity)).await? {
            Some(cart) => cart,
            None => return Err(CartError::ItemNotFound(product_id).into()),
        };
        if tx.find_cart_item(cart.id, product_id).await?.is_none() {
            return Err(CartError::ItemNotFound(product_id).into());
        }

        if quantity == 0 {
            tx.remove_cart_item(cart.id, product_id).await?;
        } else {
            let product = tx
                .product(product_id)
                .await?
                .ok_or(CartError::ProductNotFound(product_id))?;
            if quantity > product.stock {
                return Err(CartError::InsufficientStock {
                    product: product.name,
                    available: product.stock,
                }
                .into());
            }
            tx.set_cart_item_quantity(cart.id, product_id, quantity)
                .await?;
        }

        let view = Self::view_of(&mut tx, &cart).await?;
        tx.commit().await?;
        Ok(view)
    }

    /// Removes a line.
    pub async fn remove_item(
        &self,
        identity: &Identity,
        product_id: ProductId,
    ) -> Result<CartView, CartServiceError> {
        self.update_quantity(identity, product_id, 0).await
    }

    /// Empties the cart.
    pub async fn clear(&self, identity: &Identity) -> Result<CartView, CartServiceError> {
        let mut tx = self.store.begin().await?;
        let cart = Self::get_or_create(&mut tx, identity).await?;
        tx.clear_cart(cart.id).await?;
        let view = Self::view_of(&mut tx, &cart).await?;
        tx.commit().await?;
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::UserId;
    use domain::Product;
    use store::MemoryStore;

    async fn store_with(products: Vec<Product>) -> MemoryStore {
        let store = MemoryStore::new();
        for product in products {
            store.insert_product(product).await;
        }
        store
    }

    #[tokio::test]
    async fn add_merges_lines_and_totals_current_prices() {
        let product = Product::new("mug", "Mug", Money::from_cents(1250), 10);
        let pid = product.id;
        let service = CartService::new(store_with(vec![product]).await);
        let identity = Identity::user(UserId::new());

        service.add_item(&identity, pid, 1).await.unwrap();
        let view = service.add_item(&identity, pid, 2).await.unwrap();

        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].quantity, 3);
        assert_eq!(view.total.cents(), 3750);
    }

    #[tokio::test]
    async fn add_rejects_zero_quantity() {
        let product = Product::new("mug", "Mug", Money::from_cents(1250), 10);
        let pid = product.id;
        let service = CartService::new(store_with(vec![product]).await);
        let identity = Identity::user(UserId::new());

        let result = service.add_item(&identity, pid, 0).await;
        assert!(matches!(
            result,
            Err(CartServiceError::Cart(CartError::InvalidQuantity))
        ));
    }

    #[tokio::test]
    async fn add_caps_at_available_stock() {
        let product = Product::new("mug", "Mug", Money::from_cents(1250), 3);
        let pid = product.id;
        let service = CartService::new(store_with(vec![product]).await);
        let identity = Identity::user(UserId::new());

        service.add_item(&identity, pid, 2).await.unwrap();
        let result = service.add_item(&identity, pid, 2).await;
        assert!(matches!(
            result,
            Err(CartServiceError::Cart(CartError::InsufficientStock {
                available: 1,
                ..
            }))
        ));
    }

    #[tokio::test]
    async fn update_to_zero_removes_line() {
        let product = Product::new("mug", "Mug", Money::from_cents(1250), 10);
        let pid = product.id;
        let service = CartService::new(store_with(vec![product]).await);
        let identity = Identity::user(UserId::new());

        service.add_item(&identity, pid, 2).await.unwrap();
        let view = service.update_quantity(&identity, pid, 0).await.unwrap();
        assert!(view.items.is_empty());
        assert!(view.total.is_zero());
    }

    #[tokio::test]
    async fn update_missing_line_not_found() {
        let product = Product::new("mug", "Mug", Money::from_cents(1250), 10);
        let pid = product.id;
        let service = CartService::new(store_with(vec![product]).await);
        let identity = Identity::user(UserId::new());

        let result = service.update_quantity(&identity, pid, 1).await;
        assert!(matches!(
            result,
            Err(CartServiceError::Cart(CartError::ItemNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn anonymous_session_gets_its_own_cart() {
        let product = Product::new("mug", "Mug", Money::from_cents(1250), 10);
        let pid = product.id;
        let service = CartService::new(store_with(vec![product]).await);
        let anon = Identity::Anonymous("sess-1".into());
        let user = Identity::user(UserId::new());

        service.add_item(&anon, pid, 1).await.unwrap();
        let user_view = service.view(&user).await.unwrap();
        let anon_view = service.view(&anon).await.unwrap();

        assert!(user_view.items.is_empty());
        assert_eq!(anon_view.items.len(), 1);
    }
}
