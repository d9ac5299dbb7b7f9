//! Application configuration loaded from environment variables.

use std::time::Duration;

/// Server and payment provider configuration with local-dev defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `DATABASE_URL` — PostgreSQL connection string; unset runs the
///   in-memory store with a demo catalog
/// - `WEBHOOK_SECRET` — HMAC key for webhook signatures
/// - `PAYMENT_API_BASE` — provider API base URL
/// - `PAYMENT_SECRET_KEY` — provider bearer key
/// - `PAYMENT_TIMEOUT_SECS` — provider request timeout (default: `10`)
/// - `CHECKOUT_RETURN_URL` — where the provider redirects the customer
/// - `CHECKOUT_CALLBACK_URL` — where the provider posts webhooks
/// - `CURRENCY` — ISO currency code for sessions (default: `"USD"`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub webhook_secret: String,
    pub payment_api_base: String,
    pub payment_secret_key: String,
    pub payment_timeout: Duration,
    pub return_url: String,
    pub callback_url: String,
    pub currency: String,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: env_or("RUST_LOG", "info"),
            database_url: std::env::var("DATABASE_URL").ok(),
            webhook_secret: env_or("WEBHOOK_SECRET", "dev-webhook-secret"),
            payment_api_base: env_or("PAYMENT_API_BASE", "https://api.chapa.co/v1"),
            payment_secret_key: env_or("PAYMENT_SECRET_KEY", "dev-secret-key"),
            payment_timeout: Duration::from_secs(
                std::env::var("PAYMENT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(10),
            ),
            return_url: env_or("CHECKOUT_RETURN_URL", "http://localhost:3000/orders/confirm"),
            callback_url: env_or(
                "CHECKOUT_CALLBACK_URL",
                "http://localhost:3000/webhooks/payment",
            ),
            currency: env_or("CURRENCY", "USD"),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            webhook_secret: "dev-webhook-secret".to_string(),
            payment_api_base: "https://api.chapa.co/v1".to_string(),
            payment_secret_key: "dev-secret-key".to_string(),
            payment_timeout: Duration::from_secs(10),
            return_url: "http://localhost:3000/orders/confirm".to_string(),
            callback_url: "http://localhost:3000/webhooks/payment".to_string(),
            currency: "USD".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.currency, "USD");
        assert_eq!(config.payment_timeout, Duration::from_secs(10));
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }
}
