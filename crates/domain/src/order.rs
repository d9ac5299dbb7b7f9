//! Order and order line rows.

use chrono::{DateTime, Utc};
use common::{Money, OrderId, ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::status::OrderStatus;

/// The durable record of a purchase attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    /// Computed from catalog prices at checkout time; never recomputed.
    pub total_amount: Money,
    /// Unique correlation reference shared with the payment provider.
    pub reference: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An order line. Immutable once written: the unit price is the catalog
/// price at the moment of sale, so later price changes never alter a
/// historical order's value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Money,
}

/// Input shape for the single atomic write of an order plus all its lines.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub id: OrderId,
    pub user_id: UserId,
    pub total_amount: Money,
    pub reference: String,
    pub items: Vec<NewOrderItem>,
}

/// One line of a [`NewOrder`].
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Money,
}

impl NewOrder {
    /// Builds a pending order for a user.
    pub fn pending(user_id: UserId, reference: impl Into<String>, items: Vec<NewOrderItem>) -> Self {
        let total_amount = items
            .iter()
            .fold(Money::zero(), |acc, item| {
                acc + item.unit_price.multiply(item.quantity)
            });
        Self {
            id: OrderId::new(),
            user_id,
            total_amount,
            reference: reference.into(),
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_computes_total_from_lines() {
        let order = NewOrder::pending(
            UserId::new(),
            "txn_test",
            vec![
                NewOrderItem {
                    product_id: ProductId::new(),
                    quantity: 2,
                    unit_price: Money::from_cents(1000),
                },
                NewOrderItem {
                    product_id: ProductId::new(),
                    quantity: 1,
                    unit_price: Money::from_cents(2500),
                },
            ],
        );
        assert_eq!(order.total_amount.cents(), 4500);
    }

    #[test]
    fn pending_with_no_lines_totals_zero() {
        let order = NewOrder::pending(UserId::new(), "txn_test", vec![]);
        assert!(order.total_amount.is_zero());
    }
}
