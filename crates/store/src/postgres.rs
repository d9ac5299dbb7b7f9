//! PostgreSQL-backed store implementation.

use async_trait::async_trait;
use common::{CartId, Money, OrderId, ProductId, SessionToken, UserId};
use domain::{
    Cart, CartItem, CartLine, CartOwner, NewOrder, Order, OrderItem, OrderStatus, Product,
};
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use uuid::Uuid;

use crate::{Result, StockReservation, Store, StoreError, StoreTx};

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }
}

/// An open database transaction.
pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl Store for PgStore {
    type Tx = PgTx;

    async fn begin(&self) -> Result<PgTx> {
        let tx = self.pool.begin().await?;
        Ok(PgTx { tx })
    }
}

fn row_to_product(row: PgRow) -> Result<Product> {
    Ok(Product {
        id: ProductId::from_uuid(row.try_get::<Uuid, _>("id")?),
        slug: row.try_get("slug")?,
        name: row.try_get("name")?,
        price: Money::from_cents(row.try_get("price_cents")?),
        stock: row.try_get::<i32, _>("stock")? as u32,
    })
}

fn row_to_cart(row: PgRow) -> Result<Cart> {
    let user_id: Option<Uuid> = row.try_get("user_id")?;
    let session_token: Option<String> = row.try_get("session_token")?;
    let owner = match (user_id, session_token) {
        (Some(id), None) => CartOwner::User(UserId::from_uuid(id)),
        (None, Some(token)) => CartOwner::Session(SessionToken::new(token)),
        _ => {
            return Err(StoreError::Constraint(
                "cart must have exactly one owner".into(),
            ));
        }
    };
    Ok(Cart {
        id: CartId::from_uuid(row.try_get::<Uuid, _>("id")?),
        owner,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_cart_item(row: PgRow) -> Result<CartItem> {
    Ok(CartItem {
        cart_id: CartId::from_uuid(row.try_get::<Uuid, _>("cart_id")?),
        product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
        quantity: row.try_get::<i32, _>("quantity")? as u32,
        price_at_add: Money::from_cents(row.try_get("price_at_add_cents")?),
        added_at: row.try_get("added_at")?,
    })
}

fn row_to_order(row: PgRow) -> Result<Order> {
    let status: String = row.try_get("status")?;
    let status = OrderStatus::parse(&status)
        .ok_or_else(|| StoreError::Constraint(format!("unknown order status {status}")))?;
    Ok(Order {
        id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
        user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
        status,
        total_amount: Money::from_cents(row.try_get("total_cents")?),
        reference: row.try_get("reference")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_order_item(row: PgRow) -> Result<OrderItem> {
    Ok(OrderItem {
        order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
        product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
        quantity: row.try_get::<i32, _>("quantity")? as u32,
        unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
    })
}

#[async_trait]
impl StoreTx for PgTx {
    async fn product(&mut self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT id, slug, name, price_cents, stock FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(row_to_product).transpose()
    }

    async fn product_by_slug(&mut self, slug: &str) -> Result<Option<Product>> {
        let row =
            sqlx::query("SELECT id, slug, name, price_cents, stock FROM products WHERE slug = $1")
                .bind(slug)
                .fetch_optional(&mut *self.tx)
                .await?;
        row.map(row_to_product).transpose()
    }

    async fn reserve_stock(&mut self, id: ProductId, quantity: u32) -> Result<StockReservation> {
        // The conditional decrement is the whole reservation protocol: the
        // row lock taken by UPDATE serializes racing checkouts, and the
        // stock >= quantity guard makes oversell impossible.
        let result = sqlx::query(
            "UPDATE products SET stock = stock - $2 WHERE id = $1 AND stock >= $2",
        )
        .bind(id.as_uuid())
        .bind(quantity as i32)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(StockReservation::Reserved);
        }

        let available: Option<i32> = sqlx::query_scalar("SELECT stock FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(StockReservation::Insufficient {
            available: available.unwrap_or(0) as u32,
        })
    }

    async fn release_stock(&mut self, id: ProductId, quantity: u32) -> Result<()> {
        sqlx::query("UPDATE products SET stock = stock + $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(quantity as i32)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn find_cart(&mut self, owner: &CartOwner) -> Result<Option<Cart>> {
        let row = match owner {
            CartOwner::User(user_id) => {
                sqlx::query(
                    "SELECT id, user_id, session_token, created_at FROM carts WHERE user_id = $1",
                )
                .bind(user_id.as_uuid())
                .fetch_optional(&mut *self.tx)
                .await?
            }
            CartOwner::Session(token) => {
                sqlx::query(
                    "SELECT id, user_id, session_token, created_at FROM carts WHERE session_token = $1",
                )
                .bind(token.as_str())
                .fetch_optional(&mut *self.tx)
                .await?
            }
        };
        row.map(row_to_cart).transpose()
    }

    async fn insert_cart(&mut self, cart: &Cart) -> Result<()> {
        let (user_id, session_token) = match &cart.owner {
            CartOwner::User(id) => (Some(id.as_uuid()), None),
            CartOwner::Session(token) => (None, Some(token.as_str())),
        };
        sqlx::query(
            "INSERT INTO carts (id, user_id, session_token, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(cart.id.as_uuid())
        .bind(user_id)
        .bind(session_token)
        .bind(cart.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint().is_some()
            {
                return StoreError::Constraint(format!(
                    "cart already exists for owner of cart {}",
                    cart.id
                ));
            }
            StoreError::Database(e)
        })?;
        Ok(())
    }

    async fn cart_items(&mut self, cart_id: CartId) -> Result<Vec<CartItem>> {
        let rows = sqlx::query(
            r#"
            SELECT cart_id, product_id, quantity, price_at_add_cents, added_at
            FROM cart_items
            WHERE cart_id = $1
            ORDER BY added_at ASC
            "#,
        )
        .bind(cart_id.as_uuid())
        .fetch_all(&mut *self.tx)
        .await?;
        rows.into_iter().map(row_to_cart_item).collect()
    }

    async fn find_cart_item(
        &mut self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<Option<CartItem>> {
        let row = sqlx::query(
            r#"
            SELECT cart_id, product_id, quantity, price_at_add_cents, added_at
            FROM cart_items
            WHERE cart_id = $1 AND product_id = $2
            "#,
        )
        .bind(cart_id.as_uuid())
        .bind(product_id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await?;
        row.map(row_to_cart_item).transpose()
    }

    async fn upsert_cart_item(
        &mut self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: u32,
        price_at_add: Money,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO cart_items (cart_id, product_id, quantity, price_at_add_cents, added_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (cart_id, product_id) DO UPDATE SET
                quantity = cart_items.quantity + EXCLUDED.quantity
            "#,
        )
        .bind(cart_id.as_uuid())
        .bind(product_id.as_uuid())
        .bind(quantity as i32)
        .bind(price_at_add.cents())
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn set_cart_item_quantity(
        &mut self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE cart_items SET quantity = $3 WHERE cart_id = $1 AND product_id = $2",
        )
        .bind(cart_id.as_uuid())
        .bind(product_id.as_uuid())
        .bind(quantity as i32)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn remove_cart_item(&mut self, cart_id: CartId, product_id: ProductId) -> Result<()> {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND product_id = $2")
            .bind(cart_id.as_uuid())
            .bind(product_id.as_uuid())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn clear_cart(&mut self, cart_id: CartId) -> Result<()> {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id.as_uuid())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn cart_snapshot(&mut self, cart_id: CartId) -> Result<Vec<CartLine>> {
        let rows = sqlx::query(
            r#"
            SELECT p.id, p.slug, p.name, p.price_cents, p.stock, ci.quantity AS line_quantity
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            WHERE ci.cart_id = $1
            ORDER BY ci.added_at ASC
            "#,
        )
        .bind(cart_id.as_uuid())
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter()
            .map(|row| {
                let quantity = row.try_get::<i32, _>("line_quantity")? as u32;
                let product = row_to_product(row)?;
                Ok(CartLine { product, quantity })
            })
            .collect()
    }

    async fn insert_order(&mut self, order: NewOrder) -> Result<Order> {
        let row = sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, status, total_cents, reference, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            RETURNING id, user_id, status, total_cents, reference, created_at, updated_at
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.user_id.as_uuid())
        .bind(OrderStatus::Pending.as_str())
        .bind(order.total_amount.cents())
        .bind(&order.reference)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("orders_reference_key")
            {
                return StoreError::Constraint(format!(
                    "duplicate order reference {}",
                    order.reference
                ));
            }
            StoreError::Database(e)
        })?;

        for item in &order.items {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, product_id, quantity, unit_price_cents)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(order.id.as_uuid())
            .bind(item.product_id.as_uuid())
            .bind(item.quantity as i32)
            .bind(item.unit_price.cents())
            .execute(&mut *self.tx)
            .await?;
        }

        row_to_order(row)
    }

    async fn order_by_id(&mut self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, status, total_cents, reference, created_at, updated_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await?;
        row.map(row_to_order).transpose()
    }

    async fn order_by_reference(&mut self, reference: &str) -> Result<Option<Order>> {
        // FOR UPDATE holds the row across the status transition so two
        // concurrent webhook deliveries serialize on the same order.
        let row = sqlx::query(
            r#"
            SELECT id, user_id, status, total_cents, reference, created_at, updated_at
            FROM orders
            WHERE reference = $1
            FOR UPDATE
            "#,
        )
        .bind(reference)
        .fetch_optional(&mut *self.tx)
        .await?;
        row.map(row_to_order).transpose()
    }

    async fn order_for_user(
        &mut self,
        reference: &str,
        user_id: UserId,
    ) -> Result<Option<Order>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, status, total_cents, reference, created_at, updated_at
            FROM orders
            WHERE reference = $1 AND user_id = $2
            "#,
        )
        .bind(reference)
        .bind(user_id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await?;
        row.map(row_to_order).transpose()
    }

    async fn order_items(&mut self, order_id: OrderId) -> Result<Vec<OrderItem>> {
        let rows = sqlx::query(
            r#"
            SELECT order_id, product_id, quantity, unit_price_cents
            FROM order_items
            WHERE order_id = $1
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_all(&mut *self.tx)
        .await?;
        rows.into_iter().map(row_to_order_item).collect()
    }

    async fn set_order_status(&mut self, id: OrderId, status: OrderStatus) -> Result<()> {
        sqlx::query("UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id.as_uuid())
            .bind(status.as_str())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
