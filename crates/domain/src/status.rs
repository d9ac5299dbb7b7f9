//! Order status state machine.
//!
//! Every status mutation in the system, whether driven by payment
//! reconciliation or by an admin, goes through [`OrderStatus::transition`]
//! so there is exactly one transition table and one place that knows which
//! transitions carry compensating inventory work.

use serde::{Deserialize, Serialize};

use crate::error::OrderError;

/// Lifecycle status of an order.
///
/// ```text
/// PENDING ──┬──► PAID ──► SHIPPED ──► DELIVERED
///           ├──► FAILED
///           └──► CANCELED ──► PENDING   (admin reinstatement only)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Awaiting the payment outcome; inventory is reserved.
    #[default]
    Pending,
    /// Payment confirmed.
    Paid,
    /// Payment failed or was abandoned; inventory has been released.
    Failed,
    /// Canceled by an admin; inventory has been released.
    Canceled,
    /// Handed to the carrier.
    Shipped,
    /// Received by the customer.
    Delivered,
}

/// Inventory side effect a transition carries.
///
/// `Release` and `Reserve` apply to every order line, in the same
/// transaction as the status write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockEffect {
    None,
    /// Return each line's quantity to the ledger (into FAILED/CANCELED).
    Release,
    /// Re-reserve each line's quantity (CANCELED back to PENDING); aborts
    /// the whole transition if any line cannot be reserved.
    Reserve,
}

/// Result of checking a requested transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The transition is allowed and carries this stock effect.
    Apply(StockEffect),
    /// Target equals current status; callers treat this as success so
    /// duplicate webhook deliveries and repeated admin clicks are harmless.
    NoOp,
}

impl OrderStatus {
    /// Checks a transition against the state machine.
    pub fn transition(self, to: OrderStatus) -> Result<Transition, OrderError> {
        use OrderStatus::*;

        if self == to {
            return Ok(Transition::NoOp);
        }

        let effect = match (self, to) {
            (Pending, Paid) => StockEffect::None,
            // Leaving PENDING without payment hands the reservation back.
            (Pending, Failed) | (Pending, Canceled) => StockEffect::Release,
            (Canceled, Pending) => StockEffect::Reserve,
            (Paid, Shipped) => StockEffect::None,
            (Shipped, Delivered) => StockEffect::None,
            (from, to) => return Err(OrderError::InvalidTransition { from, to }),
        };

        Ok(Transition::Apply(effect))
    }

    /// Returns true when no automatic transition can leave this status.
    /// CANCELED still allows the explicit admin reinstatement path.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }

    /// Returns the wire/storage name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Paid => "PAID",
            OrderStatus::Failed => "FAILED",
            OrderStatus::Canceled => "CANCELED",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
        }
    }

    /// Parses the wire/storage name.
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "PENDING" => OrderStatus::Pending,
            "PAID" => OrderStatus::Paid,
            "FAILED" => OrderStatus::Failed,
            "CANCELED" => OrderStatus::Canceled,
            "SHIPPED" => OrderStatus::Shipped,
            "DELIVERED" => OrderStatus::Delivered,
            _ => return None,
        })
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
