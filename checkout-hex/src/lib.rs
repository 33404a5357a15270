//! # Checkout Hex
//!
//! Application layer and HTTP adapter for the checkout service.
//!
//! ## Architecture
//!
//! - `ledger/` - Payment ledger (owns records, enforces the status lifecycle)
//! - `checkout/` - Checkout aggregator (customer + cart + scheduling -> payment)
//! - `inbound/` - HTTP adapter (Axum server)
//!
//! Both services are generic over `R: PaymentRepository`; the remote
//! services are injected as trait objects.

pub mod checkout;
pub mod inbound;
pub mod ledger;
pub mod openapi;

#[cfg(test)]
mod ledger_tests;

pub use checkout::CheckoutAggregator;
pub use ledger::PaymentLedger;
