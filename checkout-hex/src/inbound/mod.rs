//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that drives the ledger and the checkout aggregator.

pub mod handlers;
mod server;

pub use server::HttpServer;
