//! Checkout core: cart management, checkout orchestration, payment
//! reconciliation, and admin order status control.
//!
//! Services in this crate are generic over the [`store::Store`] port and the
//! [`PaymentGateway`] trait, so the same flows run against the in-memory
//! backend in tests and PostgreSQL plus a real provider in production.

pub mod admin;
pub mod cart;
pub mod error;
pub mod gateway;
pub mod http;
pub mod notify;
pub mod orchestrator;
pub mod reconcile;
pub mod reference;
pub mod signature;

pub use admin::AdminOrderService;
pub use cart::{CartService, CartView, CartViewLine};
pub use error::{AdminError, CartServiceError, CheckoutError, ReconcileError, WebhookError};
pub use gateway::{
    GatewayError, InMemoryPaymentGateway, InitiateRequest, PaymentGateway, PaymentOutcome,
    PaymentSession,
};
pub use http::HttpPaymentGateway;
pub use notify::{LogNotifier, NotificationSender, RecordingNotifier};
pub use orchestrator::{CheckoutOutcome, CheckoutService, CheckoutUrls};
pub use reconcile::{ReconcileStatus, ReconciliationService};
pub use reference::new_reference;
pub use signature::WebhookSecret;
