//! HTTP payment gateway client.
//!
//! Talks to a hosted-checkout provider: `POST /transaction/initialize`
//! opens a session and returns a checkout URL, `GET /transaction/verify/{ref}`
//! reports the authoritative outcome. Amounts cross the wire in major units
//! as decimal strings.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::gateway::{
    GatewayError, InitiateRequest, PaymentGateway, PaymentOutcome, PaymentSession,
};

/// Payment gateway backed by the provider's HTTP API.
#[derive(Clone)]
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl HttpPaymentGateway {
    /// Creates a client with a bounded per-request timeout.
    pub fn new(
        base_url: impl Into<String>,
        secret_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            secret_key: secret_key.into(),
        })
    }
}

#[derive(Serialize)]
struct InitializeBody<'a> {
    amount: String,
    currency: &'a str,
    tx_ref: &'a str,
    return_url: &'a str,
    callback_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct ProviderResponse<T> {
    status: String,
    message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct InitializeData {
    checkout_url: String,
}

#[derive(Debug, Deserialize)]
struct VerifyData {
    status: String,
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn initiate(&self, request: InitiateRequest) -> Result<PaymentSession, GatewayError> {
        let body = InitializeBody {
            amount: request.amount.to_major_string(),
            currency: &request.currency,
            tx_ref: &request.reference,
            return_url: &request.return_url,
            callback_url: &request.callback_url,
        };

        let response: ProviderResponse<InitializeData> = self
            .client
            .post(format!("{}/transaction/initialize", self.base_url))
            .bearer_auth(&self.secret_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.status != "success" {
            return Err(GatewayError::Rejected(
                response.message.unwrap_or(response.status),
            ));
        }

        let data = response
            .data
            .ok_or_else(|| GatewayError::Malformed("missing data in initialize response".into()))?;

        Ok(PaymentSession {
            checkout_url: data.checkout_url,
        })
    }

    async fn verify(&self, reference: &str) -> Result<PaymentOutcome, GatewayError> {
        let response: ProviderResponse<VerifyData> = self
            .client
            .get(format!("{}/transaction/verify/{reference}", self.base_url))
            .bearer_auth(&self.secret_key)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let settled = response.status == "success"
            && response.data.is_some_and(|d| d.status == "success");

        Ok(if settled {
            PaymentOutcome::Success
        } else {
            PaymentOutcome::Failed
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Money;

    #[test]
    fn initialize_body_uses_major_units() {
        let body = InitializeBody {
            amount: Money::from_cents(4500).to_major_string(),
            currency: "USD",
            tx_ref: "txn_abc",
            return_url: "https://shop.test/confirm",
            callback_url: "https://shop.test/webhooks/payment",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["amount"], "45.00");
        assert_eq!(json["tx_ref"], "txn_abc");
    }

    #[test]
    fn parses_initialize_response() {
        let json = r#"{
            "status": "success",
            "message": "Hosted Link",
            "data": { "checkout_url": "https://pay.test/session/abc" }
        }"#;
        let response: ProviderResponse<InitializeData> = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, "success");
        assert_eq!(
            response.data.unwrap().checkout_url,
            "https://pay.test/session/abc"
        );
    }

    #[test]
    fn parses_verify_response_without_data() {
        let json = r#"{ "status": "failed", "message": "invalid reference" }"#;
        let response: ProviderResponse<VerifyData> = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, "failed");
        assert!(response.data.is_none());
    }
}
