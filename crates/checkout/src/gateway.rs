//! Payment gateway trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::Money;
use thiserror::Error;

/// Request to open a hosted payment session.
#[derive(Debug, Clone)]
pub struct InitiateRequest {
    pub amount: Money,
    pub currency: String,
    /// Correlation reference the provider echoes back in webhooks.
    pub reference: String,
    /// Where the provider redirects the customer after payment.
    pub return_url: String,
    /// Where the provider delivers the signed webhook.
    pub callback_url: String,
}

/// A hosted payment session opened by the provider.
#[derive(Debug, Clone)]
pub struct PaymentSession {
    /// URL the customer is redirected to for payment.
    pub checkout_url: String,
}

/// Provider-reported outcome of a payment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    Success,
    Failed,
}

/// Errors from the payment provider boundary.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("payment provider rejected the request: {0}")]
    Rejected(String),

    #[error("payment provider request failed")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected payment provider response: {0}")]
    Malformed(String),
}

/// Trait for payment provider operations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Opens a hosted payment session for an order.
    async fn initiate(&self, request: InitiateRequest) -> Result<PaymentSession, GatewayError>;

    /// Asks the provider for the authoritative outcome of a payment.
    async fn verify(&self, reference: &str) -> Result<PaymentOutcome, GatewayError>;
}

#[derive(Debug, Default)]
struct InMemoryGatewayState {
    sessions: HashMap<String, InitiateRequest>,
    outcomes: HashMap<String, PaymentOutcome>,
    fail_on_initiate: bool,
}

/// In-memory payment gateway for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentGateway {
    state: Arc<RwLock<InMemoryGatewayState>>,
}

impl InMemoryPaymentGateway {
    /// Creates a new in-memory gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the gateway to reject the next initiate call.
    pub fn set_fail_on_initiate(&self, fail: bool) {
        self.state.write().unwrap().fail_on_initiate = fail;
    }

    /// Records the outcome the provider will report for a reference.
    pub fn set_outcome(&self, reference: &str, outcome: PaymentOutcome) {
        self.state
            .write()
            .unwrap()
            .outcomes
            .insert(reference.to_string(), outcome);
    }

    /// Returns the number of opened sessions.
    pub fn session_count(&self) -> usize {
        self.state.read().unwrap().sessions.len()
    }

    /// Returns the amount a session was opened with.
    pub fn session_amount(&self, reference: &str) -> Option<Money> {
        self.state
            .read()
            .unwrap()
            .sessions
            .get(reference)
            .map(|r| r.amount)
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    async fn initiate(&self, request: InitiateRequest) -> Result<PaymentSession, GatewayError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_initiate {
            return Err(GatewayError::Rejected("provider unavailable".to_string()));
        }

        let checkout_url = format!("https://pay.test/session/{}", request.reference);
        state.sessions.insert(request.reference.clone(), request);

        Ok(PaymentSession { checkout_url })
    }

    async fn verify(&self, reference: &str) -> Result<PaymentOutcome, GatewayError> {
        let state = self.state.read().unwrap();
        Ok(state
            .outcomes
            .get(reference)
            .copied()
            .unwrap_or(PaymentOutcome::Failed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(reference: &str) -> InitiateRequest {
        InitiateRequest {
            amount: Money::from_cents(4500),
            currency: "USD".to_string(),
            reference: reference.to_string(),
            return_url: "https://shop.test/confirm".to_string(),
            callback_url: "https://shop.test/webhooks/payment".to_string(),
        }
    }

    #[tokio::test]
    async fn test_initiate_records_session() {
        let gateway = InMemoryPaymentGateway::new();
        let session = gateway.initiate(request("txn_a")).await.unwrap();
        assert!(session.checkout_url.contains("txn_a"));
        assert_eq!(gateway.session_count(), 1);
        assert_eq!(gateway.session_amount("txn_a"), Some(Money::from_cents(4500)));
    }

    #[tokio::test]
    async fn test_fail_on_initiate() {
        let gateway = InMemoryPaymentGateway::new();
        gateway.set_fail_on_initiate(true);
        let result = gateway.initiate(request("txn_a")).await;
        assert!(result.is_err());
        assert_eq!(gateway.session_count(), 0);
    }

    #[tokio::test]
    async fn test_verify_reports_recorded_outcome() {
        let gateway = InMemoryPaymentGateway::new();
        gateway.set_outcome("txn_a", PaymentOutcome::Success);
        assert_eq!(
            gateway.verify("txn_a").await.unwrap(),
            PaymentOutcome::Success
        );
        assert_eq!(
            gateway.verify("txn_unknown").await.unwrap(),
            PaymentOutcome::Failed
        );
    }
}
