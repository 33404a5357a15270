//! Outbound ports for the remote services a checkout depends on.
//!
//! Each trait is one query against one independent failure domain.
//! Implementations make exactly one network call per invocation and never retry.

use std::time::Duration;

use rust_decimal::Decimal;

use crate::domain::{CustomerId, CustomerSnapshot, PendingCharge};

/// Error type for remote service calls.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unexpected status: {0}")]
    Status(u16),

    #[error("Malformed payload: {0}")]
    Malformed(String),

    #[error("Service reported failure: {0}")]
    Unsuccessful(String),
}

/// Resolves customers to their verified name/tax-id pair.
#[async_trait::async_trait]
pub trait CustomerDirectory: Send + Sync {
    /// Returns `Ok(None)` when the directory has no such customer.
    async fn find_customer(&self, id: CustomerId)
    -> Result<Option<CustomerSnapshot>, RemoteError>;
}

/// Shopping-cart service.
#[async_trait::async_trait]
pub trait CartLedger: Send + Sync {
    /// Pending cart total for the customer.
    async fn cart_subtotal(&self, id: CustomerId) -> Result<Decimal, RemoteError>;
}

/// Scheduling/appointments service.
#[async_trait::async_trait]
pub trait SchedulingLedger: Send + Sync {
    /// Pending appointment charges, not aggregated.
    async fn pending_charges(&self, id: CustomerId) -> Result<Vec<PendingCharge>, RemoteError>;
}
