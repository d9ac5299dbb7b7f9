//! Payment webhook endpoint.
//!
//! The provider signs the raw body with HMAC-SHA256; verification runs on
//! the exact bytes received, before JSON parsing. A verified delivery is
//! always acknowledged with 200, whatever reconciliation decided, so the
//! provider stops retrying.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use checkout::{NotificationSender, PaymentGateway, PaymentOutcome, ReconcileStatus, WebhookError};
use serde::Deserialize;
use serde_json::{Value, json};
use store::Store;

use crate::error::ApiError;
use crate::routes::AppState;

#[derive(Deserialize)]
struct WebhookPayload {
    #[serde(alias = "tx_ref")]
    reference: String,
    status: String,
}

/// POST /webhooks/payment — authenticated provider callback.
pub async fn payment<S, G, N>(
    State(state): State<Arc<AppState<S, G, N>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError>
where
    S: Store + 'static,
    G: PaymentGateway + 'static,
    N: NotificationSender + 'static,
{
    let signature = headers
        .get("x-webhook-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or(WebhookError::MissingSignature)?;
    if !state.webhook_secret.verify(&body, signature) {
        metrics::counter!("webhook_rejected_total").increment(1);
        return Err(WebhookError::InvalidSignature.into());
    }

    let payload: WebhookPayload =
        serde_json::from_slice(&body).map_err(|_| WebhookError::MalformedPayload)?;
    let outcome = if payload.status.eq_ignore_ascii_case("success") {
        PaymentOutcome::Success
    } else {
        PaymentOutcome::Failed
    };

    let message = match state.reconcile.reconcile(&payload.reference, outcome).await? {
        ReconcileStatus::Applied(status) => format!("order {status}"),
        ReconcileStatus::AlreadySettled(status) => format!("already settled as {status}"),
        ReconcileStatus::UnknownReference => "unknown reference".to_string(),
    };

    Ok(Json(json!({ "message": message })))
}
