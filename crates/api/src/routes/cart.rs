//! Cart endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use checkout::{CartView, NotificationSender, PaymentGateway};
use common::ProductId;
use serde::Deserialize;
use store::Store;
use uuid::Uuid;

use crate::error::ApiError;
use crate::identity::Caller;
use crate::routes::AppState;

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: u32,
}

/// GET /cart — the caller's cart, created lazily.
pub async fn view<S, G, N>(
    State(state): State<Arc<AppState<S, G, N>>>,
    Caller(identity): Caller,
) -> Result<Json<CartView>, ApiError>
where
    S: Store + 'static,
    G: PaymentGateway + 'static,
    N: NotificationSender + 'static,
{
    Ok(Json(state.carts.view(&identity).await?))
}

/// POST /cart/items — add a product or increment its line.
pub async fn add_item<S, G, N>(
    State(state): State<Arc<AppState<S, G, N>>>,
    Caller(identity): Caller,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<CartView>, ApiError>
where
    S: Store + 'static,
    G: PaymentGateway + 'static,
    N: NotificationSender + 'static,
{
    Ok(Json(
        state
            .carts
            .add_item(&identity, req.product_id, req.quantity)
            .await?,
    ))
}

/// PUT /cart/items/{product_id} — overwrite a line's quantity (0 removes).
pub async fn update_item<S, G, N>(
    State(state): State<Arc<AppState<S, G, N>>>,
    Caller(identity): Caller,
    Path(product_id): Path<Uuid>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<CartView>, ApiError>
where
    S: Store + 'static,
    G: PaymentGateway + 'static,
    N: NotificationSender + 'static,
{
    Ok(Json(
        state
            .carts
            .update_quantity(&identity, ProductId::from_uuid(product_id), req.quantity)
            .await?,
    ))
}

/// DELETE /cart/items/{product_id} — remove a line.
pub async fn remove_item<S, G, N>(
    State(state): State<Arc<AppState<S, G, N>>>,
    Caller(identity): Caller,
    Path(product_id): Path<Uuid>,
) -> Result<Json<CartView>, ApiError>
where
    S: Store + 'static,
    G: PaymentGateway + 'static,
    N: NotificationSender + 'static,
{
    Ok(Json(
        state
            .carts
            .remove_item(&identity, ProductId::from_uuid(product_id))
            .await?,
    ))
}

/// DELETE /cart — empty the cart.
pub async fn clear<S, G, N>(
    State(state): State<Arc<AppState<S, G, N>>>,
    Caller(identity): Caller,
) -> Result<Json<CartView>, ApiError>
where
    S: Store + 'static,
    G: PaymentGateway + 'static,
    N: NotificationSender + 'static,
{
    Ok(Json(state.carts.clear(&identity).await?))
}
