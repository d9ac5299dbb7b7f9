//! Payment reconciliation.
//!
//! Applies a provider-reported outcome to a PENDING order. Exactly-once
//! settlement comes from the guard on the current status inside the
//! transaction: whichever delivery of a duplicated webhook wins the row
//! settles the order, and every later one observes a non-PENDING status
//! and reports [`ReconcileStatus::AlreadySettled`].

use std::sync::Arc;

use domain::{CartOwner, OrderStatus, StockEffect, Transition};
use store::{Store, StoreTx};

use crate::error::ReconcileError;
use crate::gateway::{PaymentGateway, PaymentOutcome};
use crate::notify::NotificationSender;

/// What reconciliation did with a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileStatus {
    /// The order moved to this status.
    Applied(OrderStatus),
    /// The order had already left PENDING; nothing changed.
    AlreadySettled(OrderStatus),
    /// No order carries this reference.
    UnknownReference,
}

/// Settles orders against provider outcomes.
#[derive(Clone)]
pub struct ReconciliationService<S, G, N> {
    store: S,
    gateway: Arc<G>,
    notifier: Arc<N>,
}

impl<S, G, N> ReconciliationService<S, G, N>
where
    S: Store,
    G: PaymentGateway,
    N: NotificationSender,
{
    pub fn new(store: S, gateway: Arc<G>, notifier: Arc<N>) -> Self {
        Self {
            store,
            gateway,
            notifier,
        }
    }

    /// Applies an already-authenticated outcome (the webhook path).
    #[tracing::instrument(skip(self))]
    pub async fn reconcile(
        &self,
        reference: &str,
        outcome: PaymentOutcome,
    ) -> Result<ReconcileStatus, ReconcileError> {
        let mut tx = self.store.begin().await?;
        let Some(order) = tx.order_by_reference(reference).await? else {
            metrics::counter!("reconciliations_total", "outcome" => "unknown").increment(1);
            tracing::warn!(reference, "webhook for unknown reference");
            return Ok(ReconcileStatus::UnknownReference);
        };

        if order.status != OrderStatus::Pending {
            metrics::counter!("reconciliations_total", "outcome" => "duplicate").increment(1);
            return Ok(ReconcileStatus::AlreadySettled(order.status));
        }

        let target = match outcome {
            PaymentOutcome::Success => OrderStatus::Paid,
            PaymentOutcome::Failed => OrderStatus::Failed,
        };
        // PENDING to PAID or FAILED is always legal; the table tells us
        // whether the transition hands inventory back.
        let Ok(Transition::Apply(effect)) = order.status.transition(target) else {
            unreachable!("PENDING permits both payment outcomes");
        };

        if effect == StockEffect::Release {
            for item in tx.order_items(order.id).await? {
                tx.release_stock(item.product_id, item.quantity).await?;
            }
        }
        tx.set_order_status(order.id, target).await?;
        if target == OrderStatus::Paid {
            // The cart converted into an order; empty it in the same
            // transaction so a crash cannot leave both.
            if let Some(cart) = tx.find_cart(&CartOwner::User(order.user_id)).await? {
                tx.clear_cart(cart.id).await?;
            }
        }
        tx.commit().await?;

        metrics::counter!("reconciliations_total", "outcome" => target.as_str()).increment(1);
        tracing::info!(reference, status = %target, "order settled");

        if target == OrderStatus::Paid {
            // Notification is infallible by contract and runs after commit,
            // so it can never undo a settled payment.
            let mut settled = order;
            settled.status = target;
            self.notifier.order_confirmed(&settled).await;
        }

        Ok(ReconcileStatus::Applied(target))
    }

    /// Asks the provider for the outcome, then reconciles (the customer
    /// return-redirect path, where no signed payload exists).
    pub async fn verify_and_reconcile(
        &self,
        reference: &str,
    ) -> Result<ReconcileStatus, ReconcileError> {
        let outcome = self.gateway.verify(reference).await?;
        self.reconcile(reference, outcome).await
    }
}
