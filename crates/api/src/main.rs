//! API server entry point.

use common::Money;
use domain::Product;
use metrics_exporter_prometheus::PrometheusHandle;
use store::{MemoryStore, PgStore, Store};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use api::config::Config;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

/// Demo catalog for local runs against the in-memory store.
async fn seed_catalog(store: &MemoryStore) {
    let products = [
        Product::new("classic-tee", "Classic Tee", Money::from_cents(1999), 25),
        Product::new("enamel-mug", "Enamel Mug", Money::from_cents(1250), 40),
        Product::new("canvas-tote", "Canvas Tote", Money::from_cents(1500), 12),
    ];
    for product in products {
        tracing::info!(id = %product.id, slug = %product.slug, "seeded product");
        store.insert_product(product).await;
    }
}

/// Builds the router for a store backend and serves it until shutdown.
async fn serve<S>(store: S, config: &Config, metrics_handle: PrometheusHandle)
where
    S: Store + Clone + 'static,
{
    let state = api::create_default_state(store, config)
        .expect("failed to build payment gateway client");
    let app = api::create_app(state, metrics_handle);

    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Pick the store backend and serve
    match &config.database_url {
        Some(url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .expect("failed to connect to database");
            let store = PgStore::new(pool);
            store
                .run_migrations()
                .await
                .expect("failed to run migrations");
            tracing::info!("using PostgreSQL store");
            serve(store, &config, metrics_handle).await;
        }
        None => {
            let store = MemoryStore::new();
            seed_catalog(&store).await;
            tracing::info!("DATABASE_URL not set, using in-memory store");
            serve(store, &config, metrics_handle).await;
        }
    }

    tracing::info!("server shut down gracefully");
}
