//! Domain error types.

use common::ProductId;
use thiserror::Error;

use crate::status::OrderStatus;

/// Errors raised by the order state machine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
}

/// Errors raised by cart operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("quantity must be positive")]
    InvalidQuantity,

    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("insufficient stock for {product}: only {available} left")]
    InsufficientStock { product: String, available: u32 },

    #[error("item not in cart: {0}")]
    ItemNotFound(ProductId),
}
