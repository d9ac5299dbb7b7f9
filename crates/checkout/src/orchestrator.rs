//! Checkout orchestrator.
//!
//! Turns a cart into a PENDING order inside one store transaction, then
//! opens the hosted payment session. The transaction boundary matters:
//! every line is reserved or none is, and the provider is only contacted
//! after the order is durably committed, so a provider failure can never
//! strand a half-written order.

use std::sync::Arc;
use std::time::Instant;

use common::{Identity, Money, OrderId};
use domain::{CartOwner, NewOrder, NewOrderItem};
use serde::Serialize;
use store::{StockReservation, Store, StoreTx};

use crate::error::CheckoutError;
use crate::gateway::{InitiateRequest, PaymentGateway};
use crate::reference::new_reference;

/// Result of a successful checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutOutcome {
    pub order_id: OrderId,
    pub reference: String,
    pub total: Money,
    /// Hosted payment page the customer is redirected to.
    pub checkout_url: String,
}

/// URLs and currency the provider needs for every session.
#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    pub currency: String,
    pub return_url: String,
    pub callback_url: String,
}

/// Orchestrates the cart-to-order conversion.
#[derive(Clone)]
pub struct CheckoutService<S, G> {
    store: S,
    gateway: Arc<G>,
    urls: CheckoutUrls,
}

impl<S: Store, G: PaymentGateway> CheckoutService<S, G> {
    pub fn new(store: S, gateway: Arc<G>, urls: CheckoutUrls) -> Self {
        Self {
            store,
            gateway,
            urls,
        }
    }

    /// Converts the caller's cart into a PENDING order and opens a payment
    /// session.
    ///
    /// Reservation is all-or-nothing: the first line that cannot be
    /// reserved aborts the transaction, rolling back every earlier
    /// decrement. If the provider rejects the session after commit, the
    /// order stays PENDING with stock reserved; reconciliation of the
    /// eventually-failed payment releases it.
    #[tracing::instrument(skip(self, identity))]
    pub async fn checkout(&self, identity: &Identity) -> Result<CheckoutOutcome, CheckoutError> {
        let start = Instant::now();
        metrics::counter!("checkout_attempts_total").increment(1);

        let user_id = identity.user_id().ok_or(CheckoutError::Unauthenticated)?;

        let mut tx = self.store.begin().await?;
        let cart = tx
            .find_cart(&CartOwner::User(user_id))
            .await?
            .ok_or(CheckoutError::EmptyCart)?;
        let lines = tx.cart_snapshot(cart.id).await?;
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        for line in &lines {
            match tx.reserve_stock(line.product.id, line.quantity).await? {
                StockReservation::Reserved => {}
                StockReservation::Insufficient { available } => {
                    // Dropping the transaction rolls back lines already
                    // reserved in this loop.
                    metrics::counter!("checkout_insufficient_stock_total").increment(1);
                    return Err(CheckoutError::InsufficientStock {
                        product: line.product.name.clone(),
                        available,
                    });
                }
            }
        }

        let reference = new_reference();
        let items = lines
            .iter()
            .map(|line| NewOrderItem {
                product_id: line.product.id,
                quantity: line.quantity,
                unit_price: line.product.price,
            })
            .collect();
        let order = tx
            .insert_order(NewOrder::pending(user_id, &reference, items))
            .await
            .map_err(CheckoutError::OrderPersistenceFailed)?;
        tx.commit().await?;

        tracing::info!(
            order_id = %order.id,
            reference = %reference,
            total = %order.total_amount,
            "order created, opening payment session"
        );

        let session = self
            .gateway
            .initiate(InitiateRequest {
                amount: order.total_amount,
                currency: self.urls.currency.clone(),
                reference: reference.clone(),
                return_url: self.urls.return_url.clone(),
                callback_url: self.urls.callback_url.clone(),
            })
            .await
            .map_err(|e| {
                metrics::counter!("checkout_initiation_failures_total").increment(1);
                tracing::warn!(order_id = %order.id, error = %e, "payment initiation failed");
                CheckoutError::PaymentInitiationFailed(e)
            })?;

        metrics::counter!("checkout_orders_created_total").increment(1);
        metrics::histogram!("checkout_duration_seconds").record(start.elapsed().as_secs_f64());

        Ok(CheckoutOutcome {
            order_id: order.id,
            reference,
            total: order.total_amount,
            checkout_url: session.checkout_url,
        })
    }
}
