//! Order confirmation notifications.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::OrderId;
use domain::Order;

/// Sends customer-facing notifications. Infallible by contract: a lost
/// notification must never undo a settled payment.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Notifies the customer their order was paid.
    async fn order_confirmed(&self, order: &Order);
}

/// Notifier that only writes a log line. Stands in until a mail or push
/// channel is wired up.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl NotificationSender for LogNotifier {
    async fn order_confirmed(&self, order: &Order) {
        tracing::info!(
            order_id = %order.id,
            user_id = %order.user_id,
            total = %order.total_amount,
            "order confirmed"
        );
    }
}

/// Notifier that records deliveries, for assertions in tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<RwLock<Vec<OrderId>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of notifications delivered.
    pub fn sent_count(&self) -> usize {
        self.sent.read().unwrap().len()
    }

    /// Returns true if a confirmation went out for the order.
    pub fn was_notified(&self, order_id: OrderId) -> bool {
        self.sent.read().unwrap().contains(&order_id)
    }
}

#[async_trait]
impl NotificationSender for RecordingNotifier {
    async fn order_confirmed(&self, order: &Order) {
        self.sent.write().unwrap().push(order.id);
    }
}
