//! # Checkout Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize telemetry
//! - Build the payment store and the remote service adapters
//! - Start the HTTP server

mod config;

use std::sync::Arc;

use opentelemetry::global;
use opentelemetry_sdk::{
    metrics::{PeriodicReader, SdkMeterProvider},
    propagation::TraceContextPropagator,
    trace as sdktrace,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use checkout_hex::{CheckoutAggregator, PaymentLedger, inbound::HttpServer};
use checkout_remote::{HttpCartLedger, HttpCustomerDirectory, HttpSchedulingLedger, http_client};
use checkout_repo::build_repo;

fn init_tracer() -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("checkout-service"), provider))
}

/// Meter provider backing the HTTP metrics layer.
fn init_meter() -> anyhow::Result<SdkMeterProvider> {
    let exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .build()?;

    let provider = SdkMeterProvider::builder()
        .with_reader(PeriodicReader::builder(exporter).build())
        .build();

    global::set_meter_provider(provider.clone());
    Ok(provider)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let (otel_tracer, otel_provider) = init_tracer()?;
    let meter_provider = init_meter()?;
    let telemetry = tracing_opentelemetry::layer().with_tracer(otel_tracer);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,checkout_app=debug,checkout_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    let config = config::Config::from_env()?;

    tracing::info!("Starting checkout server on port {}", config.port);
    tracing::info!("Using database: {}", config.database_url);
    tracing::info!(
        directory = %config.customer_directory_url,
        cart = %config.cart_service_url,
        scheduling = %config.scheduling_service_url,
        timeout = ?config.remote_timeout,
        "Remote services configured"
    );

    // Build repository (handles connection and migration)
    let repo = build_repo(&config.database_url).await?;
    let ledger = Arc::new(PaymentLedger::new(repo));

    // One connection pool shared by the three outbound adapters
    let http = http_client(config.remote_timeout)?;
    let directory = Arc::new(HttpCustomerDirectory::new(
        &config.customer_directory_url,
        http.clone(),
        config.remote_timeout,
    ));
    let cart = Arc::new(HttpCartLedger::new(
        &config.cart_service_url,
        http.clone(),
        config.remote_timeout,
    ));
    let scheduling = Arc::new(HttpSchedulingLedger::new(
        &config.scheduling_service_url,
        http,
        config.remote_timeout,
    ));

    let checkout = CheckoutAggregator::new(
        ledger,
        directory,
        cart,
        scheduling,
        config.remote_timeout,
    );

    let server = HttpServer::new(checkout);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    // Flush telemetry before exit
    let _ = otel_provider.shutdown();
    let _ = meter_provider.shutdown();
    Ok(())
}
