//! HTTP route handlers.

pub mod admin;
pub mod cart;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod webhook;

use checkout::{
    AdminOrderService, CartService, CheckoutService, ReconciliationService, WebhookSecret,
};
use store::Store;

/// Shared application state accessible from all handlers.
pub struct AppState<S: Store, G, N> {
    pub carts: CartService<S>,
    pub checkout: CheckoutService<S, G>,
    pub reconcile: ReconciliationService<S, G, N>,
    pub admin: AdminOrderService<S>,
    pub store: S,
    pub webhook_secret: WebhookSecret,
}
