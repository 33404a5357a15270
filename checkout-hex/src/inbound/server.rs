//! HTTP Server configuration and startup.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use checkout_types::PaymentRepository;

use super::handlers::{self, AppState};
use crate::CheckoutAggregator;

/// HTTP Server for the Checkout API.
pub struct HttpServer<R: PaymentRepository> {
    state: Arc<AppState<R>>,
}

impl<R: PaymentRepository> HttpServer<R> {
    /// Creates a new HTTP server around the aggregator and the ledger it writes to.
    pub fn new(checkout: CheckoutAggregator<R>) -> Self {
        let ledger = checkout.ledger().clone();
        Self {
            state: Arc::new(AppState { ledger, checkout }),
        }
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        // Uses the globally set MeterProvider
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        Router::new()
            .route("/health", get(handlers::health))
            .route("/api-docs/openapi.json", get(handlers::openapi_json))
            .route(
                "/api/payments/checkout/{customer_id}",
                post(handlers::checkout::<R>),
            )
            .route(
                "/api/payments",
                post(handlers::create_payment::<R>).get(handlers::list_payments::<R>),
            )
            .route(
                "/api/payments/{id}",
                get(handlers::get_payment::<R>).delete(handlers::delete_payment::<R>),
            )
            .route(
                "/api/payments/{id}/approve",
                put(handlers::approve_payment::<R>),
            )
            .route(
                "/api/payments/{id}/reject",
                put(handlers::reject_payment::<R>),
            )
            .route(
                "/api/payments/{id}/cancel",
                put(handlers::cancel_payment::<R>),
            )
            .layer(metrics)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
