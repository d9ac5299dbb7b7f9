//! Admin order status control.
//!
//! Admins may move an order along any edge of the status state machine,
//! and the compensating inventory work rides in the same transaction as
//! the status write: canceling a PENDING order releases its lines,
//! reinstating a CANCELED order re-reserves them or aborts.

use common::{Identity, OrderId};
use domain::{Order, OrderStatus, StockEffect, Transition};
use store::{StockReservation, Store, StoreTx};

use crate::error::AdminError;

/// Admin-only order status transitions.
#[derive(Clone)]
pub struct AdminOrderService<S> {
    store: S,
}

impl<S: Store> AdminOrderService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Moves an order to `target`, applying the transition's stock effect.
    ///
    /// Requesting the current status is a no-op that succeeds, so repeated
    /// admin clicks are harmless.
    #[tracing::instrument(skip(self, actor))]
    pub async fn set_status(
        &self,
        actor: &Identity,
        order_id: OrderId,
        target: OrderStatus,
    ) -> Result<Order, AdminError> {
        if !actor.is_admin() {
            return Err(AdminError::Unauthorized);
        }

        let mut tx = self.store.begin().await?;
        let order = tx.order_by_id(order_id).await?.ok_or(AdminError::NotFound)?;

        let effect = match order.status.transition(target)? {
            Transition::NoOp => return Ok(order),
            Transition::Apply(effect) => effect,
        };

        match effect {
            StockEffect::None => {}
            StockEffect::Release => {
                for item in tx.order_items(order_id).await? {
                    tx.release_stock(item.product_id, item.quantity).await?;
                }
            }
            StockEffect::Reserve => {
                for item in tx.order_items(order_id).await? {
                    match tx.reserve_stock(item.product_id, item.quantity).await? {
                        StockReservation::Reserved => {}
                        StockReservation::Insufficient { available } => {
                            // Abort: the order keeps its current status and
                            // earlier re-reservations roll back.
                            let product = tx
                                .product(item.product_id)
                                .await?
                                .map(|p| p.name)
                                .unwrap_or_else(|| item.product_id.to_string());
                            return Err(AdminError::InsufficientStock {
                                product,
                                available,
                            });
                        }
                    }
                }
            }
        }

        tx.set_order_status(order_id, target).await?;
        let updated = tx.order_by_id(order_id).await?.ok_or(AdminError::NotFound)?;
        tx.commit().await?;

        metrics::counter!("admin_status_changes_total", "to" => target.as_str()).increment(1);
        tracing::info!(%order_id, from = %order.status, to = %target, "admin status change");

        Ok(updated)
    }
}
