//! Admin order status endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use checkout::{NotificationSender, PaymentGateway};
use common::OrderId;
use domain::OrderStatus;
use serde::Deserialize;
use store::Store;
use uuid::Uuid;

use crate::error::ApiError;
use crate::identity::Caller;
use crate::routes::AppState;
use crate::routes::orders::OrderResponse;

#[derive(Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

/// PUT /admin/orders/{id}/status — move an order through the state machine.
pub async fn set_status<S, G, N>(
    State(state): State<Arc<AppState<S, G, N>>>,
    Caller(identity): Caller,
    Path(order_id): Path<Uuid>,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError>
where
    S: Store + 'static,
    G: PaymentGateway + 'static,
    N: NotificationSender + 'static,
{
    let target = OrderStatus::parse(&req.status)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown status: {}", req.status)))?;
    let order = state
        .admin
        .set_status(&identity, OrderId::from_uuid(order_id), target)
        .await?;
    Ok(Json(order.into()))
}
