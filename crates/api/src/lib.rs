//! HTTP API server for the storefront checkout core.
//!
//! Exposes cart, checkout, payment webhook, status poll, and admin status
//! endpoints over the checkout services, with structured logging (tracing)
//! and Prometheus metrics.

pub mod config;
pub mod error;
pub mod identity;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use checkout::{
    AdminOrderService, CartService, CheckoutService, CheckoutUrls, GatewayError,
    HttpPaymentGateway, LogNotifier, NotificationSender, PaymentGateway, ReconciliationService,
    WebhookSecret,
};
use metrics_exporter_prometheus::PrometheusHandle;
use store::Store;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S, G, N>(
    state: Arc<AppState<S, G, N>>,
    metrics_handle: PrometheusHandle,
) -> Router
where
    S: Store + 'static,
    G: PaymentGateway + 'static,
    N: NotificationSender + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/cart",
            get(routes::cart::view::<S, G, N>).delete(routes::cart::clear::<S, G, N>),
        )
        .route("/cart/items", post(routes::cart::add_item::<S, G, N>))
        .route(
            "/cart/items/{product_id}",
            put(routes::cart::update_item::<S, G, N>)
                .delete(routes::cart::remove_item::<S, G, N>),
        )
        .route("/checkout", post(routes::orders::create_checkout::<S, G, N>))
        .route("/orders/status", get(routes::orders::status::<S, G, N>))
        .route("/orders/confirm", get(routes::orders::confirm::<S, G, N>))
        .route("/webhooks/payment", post(routes::webhook::payment::<S, G, N>))
        .route(
            "/admin/orders/{id}/status",
            put(routes::admin::set_status::<S, G, N>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Builds application state around a store, wiring the services to the
/// HTTP payment gateway and the log notifier.
pub fn create_default_state<S>(
    store: S,
    config: &Config,
) -> Result<Arc<AppState<S, HttpPaymentGateway, LogNotifier>>, GatewayError>
where
    S: Store + Clone + 'static,
{
    let gateway = Arc::new(HttpPaymentGateway::new(
        config.payment_api_base.clone(),
        config.payment_secret_key.clone(),
        config.payment_timeout,
    )?);
    let notifier = Arc::new(LogNotifier);
    let urls = CheckoutUrls {
        currency: config.currency.clone(),
        return_url: config.return_url.clone(),
        callback_url: config.callback_url.clone(),
    };

    Ok(Arc::new(AppState {
        carts: CartService::new(store.clone()),
        checkout: CheckoutService::new(store.clone(), gateway.clone(), urls),
        reconcile: ReconciliationService::new(store.clone(), gateway, notifier),
        admin: AdminOrderService::new(store.clone()),
        store,
        webhook_secret: WebhookSecret::new(config.webhook_secret.clone()),
    }))
}
