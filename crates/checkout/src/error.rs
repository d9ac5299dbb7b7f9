//! Error types for the checkout services.

use domain::{CartError, OrderError};
use store::StoreError;
use thiserror::Error;

use crate::gateway::GatewayError;

/// Errors raised by cart operations.
#[derive(Debug, Error)]
pub enum CartServiceError {
    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors raised by the checkout orchestrator.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("authentication required to check out")]
    Unauthenticated,

    #[error("cart is empty")]
    EmptyCart,

    #[error("insufficient stock for {product}: only {available} left")]
    InsufficientStock { product: String, available: u32 },

    #[error("failed to persist order")]
    OrderPersistenceFailed(#[source] StoreError),

    #[error("payment initiation failed: {0}")]
    PaymentInitiationFailed(#[source] GatewayError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors raised by payment reconciliation.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors raised while authenticating a webhook delivery, before any
/// reconciliation work happens.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("missing webhook signature header")]
    MissingSignature,

    #[error("webhook signature verification failed")]
    InvalidSignature,

    #[error("malformed webhook payload")]
    MalformedPayload,
}

/// Errors raised by the admin order status controller.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("admin role required")]
    Unauthorized,

    #[error("order not found")]
    NotFound,

    #[error("insufficient stock for {product}: only {available} left")]
    InsufficientStock { product: String, available: u32 },

    #[error(transparent)]
    InvalidTransition(#[from] OrderError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
