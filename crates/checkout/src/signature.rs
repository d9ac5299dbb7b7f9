//! Webhook signature verification.
//!
//! The provider signs the raw request body with HMAC-SHA256 over a shared
//! secret and sends the hex digest in a header. Verification must run
//! against the exact bytes received, before any JSON parsing.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Shared secret for authenticating webhook deliveries.
#[derive(Clone)]
pub struct WebhookSecret(String);

impl WebhookSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Computes the hex HMAC-SHA256 digest of `body`.
    pub fn sign(&self, body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(self.0.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    /// Verifies a hex digest against `body` in constant time.
    pub fn verify(&self, body: &[u8], signature_hex: &str) -> bool {
        let Ok(signature) = hex::decode(signature_hex) else {
            return false;
        };
        let mut mac = HmacSha256::new_from_slice(self.0.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(body);
        mac.verify_slice(&signature).is_ok()
    }
}

impl std::fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WebhookSecret(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify() {
        let secret = WebhookSecret::new("s3cret");
        let body = br#"{"tx_ref":"txn_abc","status":"success"}"#;
        let signature = secret.sign(body);
        assert!(secret.verify(body, &signature));
    }

    #[test]
    fn tampered_body_fails() {
        let secret = WebhookSecret::new("s3cret");
        let signature = secret.sign(b"original");
        assert!(!secret.verify(b"tampered", &signature));
    }

    #[test]
    fn wrong_secret_fails() {
        let signature = WebhookSecret::new("alpha").sign(b"body");
        assert!(!WebhookSecret::new("beta").verify(b"body", &signature));
    }

    #[test]
    fn non_hex_signature_fails() {
        let secret = WebhookSecret::new("s3cret");
        assert!(!secret.verify(b"body", "not hex at all"));
    }

    #[test]
    fn debug_redacts_secret() {
        let secret = WebhookSecret::new("very-secret");
        assert!(!format!("{secret:?}").contains("very-secret"));
    }
}
