//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use common::{Money, UserId};
use domain::{Cart, CartOwner, NewOrder, NewOrderItem, OrderStatus, Product};
use sqlx::PgPool;
use store::{PgStore, StockReservation, Store, StoreError, StoreTx};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for migrations
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            PgStore::new(temp_pool.clone())
                .run_migrations()
                .await
                .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PgStore {
    let info = get_container_info().await;

    // Create a fresh pool for each test to avoid connection issues
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    // Clear tables for test isolation
    sqlx::query("TRUNCATE TABLE order_items, orders, cart_items, carts, products CASCADE")
        .execute(&pool)
        .await
        .unwrap();

    PgStore::new(pool)
}

async fn seed_product(store: &PgStore, slug: &str, price_cents: i64, stock: u32) -> Product {
    let product = Product::new(slug, slug.to_uppercase(), Money::from_cents(price_cents), stock);
    sqlx::query("INSERT INTO products (id, slug, name, price_cents, stock) VALUES ($1, $2, $3, $4, $5)")
        .bind(product.id.as_uuid())
        .bind(&product.slug)
        .bind(&product.name)
        .bind(product.price.cents())
        .bind(product.stock as i32)
        .execute(store.pool())
        .await
        .unwrap();
    product
}

#[tokio::test]
async fn reserve_decrements_when_available() {
    let store = get_test_store().await;
    let product = seed_product(&store, "widget", 1000, 5).await;

    let mut tx = store.begin().await.unwrap();
    let outcome = tx.reserve_stock(product.id, 3).await.unwrap();
    assert_eq!(outcome, StockReservation::Reserved);
    tx.commit().await.unwrap();

    let mut tx = store.begin().await.unwrap();
    let stored = tx.product(product.id).await.unwrap().unwrap();
    assert_eq!(stored.stock, 2);
}

#[tokio::test]
async fn reserve_reports_available_on_shortfall() {
    let store = get_test_store().await;
    let product = seed_product(&store, "widget", 1000, 2).await;

    let mut tx = store.begin().await.unwrap();
    let outcome = tx.reserve_stock(product.id, 3).await.unwrap();
    assert_eq!(outcome, StockReservation::Insufficient { available: 2 });
}

#[tokio::test]
async fn drop_without_commit_rolls_back() {
    let store = get_test_store().await;
    let product = seed_product(&store, "widget", 1000, 5).await;

    {
        let mut tx = store.begin().await.unwrap();
        tx.reserve_stock(product.id, 5).await.unwrap();
        // dropped here
    }

    let mut tx = store.begin().await.unwrap();
    let stored = tx.product(product.id).await.unwrap().unwrap();
    assert_eq!(stored.stock, 5);
}

#[tokio::test]
async fn release_restores_reserved_stock() {
    let store = get_test_store().await;
    let product = seed_product(&store, "widget", 1000, 5).await;

    let mut tx = store.begin().await.unwrap();
    tx.reserve_stock(product.id, 4).await.unwrap();
    tx.release_stock(product.id, 4).await.unwrap();
    tx.commit().await.unwrap();

    let mut tx = store.begin().await.unwrap();
    let stored = tx.product(product.id).await.unwrap().unwrap();
    assert_eq!(stored.stock, 5);
}

#[tokio::test]
async fn upsert_increments_existing_line() {
    let store = get_test_store().await;
    let product = seed_product(&store, "widget", 1000, 10).await;
    let cart = Cart::new(CartOwner::User(UserId::new()));

    let mut tx = store.begin().await.unwrap();
    tx.insert_cart(&cart).await.unwrap();
    tx.upsert_cart_item(cart.id, product.id, 2, product.price)
        .await
        .unwrap();
    tx.upsert_cart_item(cart.id, product.id, 3, product.price)
        .await
        .unwrap();

    let items = tx.cart_items(cart.id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 5);
}

#[tokio::test]
async fn duplicate_cart_owner_is_rejected() {
    let store = get_test_store().await;
    let owner = CartOwner::User(UserId::new());

    let mut tx = store.begin().await.unwrap();
    tx.insert_cart(&Cart::new(owner.clone())).await.unwrap();
    tx.commit().await.unwrap();

    let mut tx = store.begin().await.unwrap();
    let result = tx.insert_cart(&Cart::new(owner)).await;
    assert!(matches!(result, Err(StoreError::Constraint(_))));
}

#[tokio::test]
async fn cart_snapshot_joins_current_prices() {
    let store = get_test_store().await;
    let product = seed_product(&store, "widget", 1000, 10).await;
    let cart = Cart::new(CartOwner::Session("sess-pg".into()));

    let mut tx = store.begin().await.unwrap();
    tx.insert_cart(&cart).await.unwrap();
    // Snapshot at the old price, then the catalog price changes.
    tx.upsert_cart_item(cart.id, product.id, 2, Money::from_cents(500))
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let mut tx = store.begin().await.unwrap();
    let lines = tx.cart_snapshot(cart.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 2);
    assert_eq!(lines[0].product.price, Money::from_cents(1000));
}

#[tokio::test]
async fn insert_order_writes_all_lines() {
    let store = get_test_store().await;
    let p1 = seed_product(&store, "shirt", 1000, 5).await;
    let p2 = seed_product(&store, "hat", 2500, 1).await;
    let user = UserId::new();

    let order = NewOrder::pending(
        user,
        "txn_pg_full",
        vec![
            NewOrderItem {
                product_id: p1.id,
                quantity: 2,
                unit_price: p1.price,
            },
            NewOrderItem {
                product_id: p2.id,
                quantity: 1,
                unit_price: p2.price,
            },
        ],
    );

    let mut tx = store.begin().await.unwrap();
    let stored = tx.insert_order(order).await.unwrap();
    tx.commit().await.unwrap();

    assert_eq!(stored.status, OrderStatus::Pending);
    assert_eq!(stored.total_amount.cents(), 4500);

    let mut tx = store.begin().await.unwrap();
    let items = tx.order_items(stored.id).await.unwrap();
    assert_eq!(items.len(), 2);
    let by_ref = tx.order_by_reference("txn_pg_full").await.unwrap().unwrap();
    assert_eq!(by_ref.id, stored.id);
}

#[tokio::test]
async fn duplicate_reference_maps_to_constraint_error() {
    let store = get_test_store().await;
    let user = UserId::new();

    let mut tx = store.begin().await.unwrap();
    tx.insert_order(NewOrder::pending(user, "txn_pg_dup", vec![]))
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let mut tx = store.begin().await.unwrap();
    let result = tx
        .insert_order(NewOrder::pending(user, "txn_pg_dup", vec![]))
        .await;
    assert!(matches!(result, Err(StoreError::Constraint(_))));
}

#[tokio::test]
async fn order_for_user_scopes_by_owner() {
    let store = get_test_store().await;
    let owner = UserId::new();
    let stranger = UserId::new();

    let mut tx = store.begin().await.unwrap();
    tx.insert_order(NewOrder::pending(owner, "txn_pg_mine", vec![]))
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let mut tx = store.begin().await.unwrap();
    assert!(
        tx.order_for_user("txn_pg_mine", owner)
            .await
            .unwrap()
            .is_some()
    );
    assert!(
        tx.order_for_user("txn_pg_mine", stranger)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn status_write_survives_roundtrip() {
    let store = get_test_store().await;
    let user = UserId::new();

    let mut tx = store.begin().await.unwrap();
    let order = tx
        .insert_order(NewOrder::pending(user, "txn_pg_status", vec![]))
        .await
        .unwrap();
    tx.set_order_status(order.id, OrderStatus::Paid).await.unwrap();
    tx.commit().await.unwrap();

    let mut tx = store.begin().await.unwrap();
    let stored = tx.order_by_id(order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Paid);
    assert!(stored.updated_at >= stored.created_at);
}
