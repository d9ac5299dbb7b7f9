//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::{AdminError, CartServiceError, CheckoutError, ReconcileError, WebhookError};
use domain::CartError;
use serde_json::{Value, json};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// No resolvable caller identity.
    Unauthenticated,
    /// Resource not found.
    NotFound(String),
    /// Cart operation error.
    Cart(CartServiceError),
    /// Checkout orchestration error.
    Checkout(CheckoutError),
    /// Reconciliation error.
    Reconcile(ReconcileError),
    /// Webhook authentication error.
    Webhook(WebhookError),
    /// Admin order control error.
    Admin(AdminError),
    /// Raw storage error from a read-only handler.
    Store(store::StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "authentication required" }),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::Cart(err) => cart_error_to_response(err),
            ApiError::Checkout(err) => checkout_error_to_response(err),
            ApiError::Reconcile(err) => reconcile_error_to_response(err),
            ApiError::Webhook(err) => (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() })),
            ApiError::Admin(err) => admin_error_to_response(err),
            ApiError::Store(err) => internal("storage error", &err),
        };

        (status, axum::Json(body)).into_response()
    }
}

fn insufficient_stock_body(message: String, product: String, available: u32) -> Value {
    json!({ "error": message, "product": product, "available": available })
}

fn internal(context: &str, err: &dyn std::error::Error) -> (StatusCode, Value) {
    tracing::error!(error = %err, "{context}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "internal error" }),
    )
}

fn cart_error_to_response(err: CartServiceError) -> (StatusCode, Value) {
    let message = err.to_string();
    match err {
        CartServiceError::Cart(CartError::InvalidQuantity) => {
            (StatusCode::BAD_REQUEST, json!({ "error": message }))
        }
        CartServiceError::Cart(CartError::ProductNotFound(_) | CartError::ItemNotFound(_)) => {
            (StatusCode::NOT_FOUND, json!({ "error": message }))
        }
        CartServiceError::Cart(CartError::InsufficientStock { product, available }) => (
            StatusCode::CONFLICT,
            insufficient_stock_body(message, product, available),
        ),
        CartServiceError::Store(err) => internal("cart operation failed", &err),
    }
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, Value) {
    let message = err.to_string();
    match err {
        CheckoutError::Unauthenticated => (StatusCode::UNAUTHORIZED, json!({ "error": message })),
        CheckoutError::EmptyCart => (StatusCode::BAD_REQUEST, json!({ "error": message })),
        CheckoutError::InsufficientStock { product, available } => (
            StatusCode::CONFLICT,
            insufficient_stock_body(message, product, available),
        ),
        CheckoutError::OrderPersistenceFailed(err) => internal("order persistence failed", &err),
        CheckoutError::PaymentInitiationFailed(err) => {
            tracing::error!(error = %err, "payment initiation failed");
            (
                StatusCode::BAD_GATEWAY,
                json!({ "error": "payment provider unavailable" }),
            )
        }
        CheckoutError::Store(err) => internal("checkout failed", &err),
    }
}

fn reconcile_error_to_response(err: ReconcileError) -> (StatusCode, Value) {
    match err {
        ReconcileError::Gateway(err) => {
            tracing::error!(error = %err, "payment verification failed");
            (
                StatusCode::BAD_GATEWAY,
                json!({ "error": "payment provider unavailable" }),
            )
        }
        ReconcileError::Store(err) => internal("reconciliation failed", &err),
    }
}

fn admin_error_to_response(err: AdminError) -> (StatusCode, Value) {
    let message = err.to_string();
    match err {
        AdminError::Unauthorized => (StatusCode::FORBIDDEN, json!({ "error": message })),
        AdminError::NotFound => (StatusCode::NOT_FOUND, json!({ "error": message })),
        AdminError::InsufficientStock { product, available } => (
            StatusCode::CONFLICT,
            insufficient_stock_body(message, product, available),
        ),
        AdminError::InvalidTransition(_) => (StatusCode::CONFLICT, json!({ "error": message })),
        AdminError::Store(err) => internal("admin status change failed", &err),
    }
}

impl From<CartServiceError> for ApiError {
    fn from(err: CartServiceError) -> Self {
        ApiError::Cart(err)
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

impl From<ReconcileError> for ApiError {
    fn from(err: ReconcileError) -> Self {
        ApiError::Reconcile(err)
    }
}

impl From<WebhookError> for ApiError {
    fn from(err: WebhookError) -> Self {
        ApiError::Webhook(err)
    }
}

impl From<AdminError> for ApiError {
    fn from(err: AdminError) -> Self {
        ApiError::Admin(err)
    }
}

impl From<store::StoreError> for ApiError {
    fn from(err: store::StoreError) -> Self {
        ApiError::Store(err)
    }
}
