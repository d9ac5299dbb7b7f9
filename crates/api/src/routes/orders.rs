//! Checkout and order status endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use checkout::{NotificationSender, PaymentGateway, ReconcileStatus};
use chrono::{DateTime, Utc};
use common::OrderId;
use domain::{Order, OrderStatus};
use serde::{Deserialize, Serialize};
use store::{Store, StoreTx};

use crate::error::ApiError;
use crate::identity::Caller;
use crate::routes::AppState;

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub order_id: OrderId,
    pub reference: String,
    pub checkout_url: String,
    pub total_cents: i64,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub order_id: OrderId,
    pub reference: String,
    pub status: OrderStatus,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            order_id: order.id,
            reference: order.reference,
            status: order.status,
            total_cents: order.total_amount.cents(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Deserialize)]
pub struct ReferenceQuery {
    pub reference: String,
}

/// POST /checkout — convert the caller's cart into a PENDING order and
/// open a payment session.
pub async fn create_checkout<S, G, N>(
    State(state): State<Arc<AppState<S, G, N>>>,
    Caller(identity): Caller,
) -> Result<Json<CheckoutResponse>, ApiError>
where
    S: Store + 'static,
    G: PaymentGateway + 'static,
    N: NotificationSender + 'static,
{
    let outcome = state.checkout.checkout(&identity).await?;
    Ok(Json(CheckoutResponse {
        order_id: outcome.order_id,
        reference: outcome.reference,
        checkout_url: outcome.checkout_url,
        total_cents: outcome.total.cents(),
    }))
}

/// GET /orders/status?reference= — status poll, scoped to the caller.
pub async fn status<S, G, N>(
    State(state): State<Arc<AppState<S, G, N>>>,
    Caller(identity): Caller,
    Query(query): Query<ReferenceQuery>,
) -> Result<Json<OrderResponse>, ApiError>
where
    S: Store + 'static,
    G: PaymentGateway + 'static,
    N: NotificationSender + 'static,
{
    let user_id = identity.user_id().ok_or(ApiError::Unauthenticated)?;
    let mut tx = state.store.begin().await?;
    let order = tx
        .order_for_user(&query.reference, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("order not found".to_string()))?;
    Ok(Json(order.into()))
}

#[derive(Serialize)]
pub struct ConfirmResponse {
    pub reference: String,
    pub status: OrderStatus,
}

/// GET /orders/confirm?reference= — return-redirect landing: ask the
/// provider for the authoritative outcome and reconcile.
pub async fn confirm<S, G, N>(
    State(state): State<Arc<AppState<S, G, N>>>,
    Query(query): Query<ReferenceQuery>,
) -> Result<Json<ConfirmResponse>, ApiError>
where
    S: Store + 'static,
    G: PaymentGateway + 'static,
    N: NotificationSender + 'static,
{
    match state.reconcile.verify_and_reconcile(&query.reference).await? {
        ReconcileStatus::Applied(status) | ReconcileStatus::AlreadySettled(status) => {
            Ok(Json(ConfirmResponse {
                reference: query.reference,
                status,
            }))
        }
        ReconcileStatus::UnknownReference => {
            Err(ApiError::NotFound("unknown payment reference".to_string()))
        }
    }
}
