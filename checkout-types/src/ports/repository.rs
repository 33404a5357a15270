//! Payment store port trait.
//!
//! Adapters (Postgres, SQLite, InMemory) implement this trait.

use crate::domain::{Payment, PaymentFilter, PaymentId, PaymentStatus};
use crate::error::RepoError;

/// Durable keyed storage for payment records.
///
/// The store knows nothing about the lifecycle rules; it only offers a
/// per-record compare-and-set on `status` so the ledger can make every
/// transition a single atomic step.
#[async_trait::async_trait]
pub trait PaymentRepository: Send + Sync + 'static {
    /// Persists a new payment.
    ///
    /// Fails with `RepoError::Conflict` if the idempotency key is already taken.
    async fn insert(&self, payment: Payment) -> Result<Payment, RepoError>;

    /// Gets a payment by ID.
    async fn get(&self, id: PaymentId) -> Result<Option<Payment>, RepoError>;

    /// Finds a payment by its idempotency key.
    async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<Payment>, RepoError>;

    /// Lists payments matching the filter, in store-native order.
    async fn list(&self, filter: PaymentFilter) -> Result<Vec<Payment>, RepoError>;

    /// Sets `status` to `next` only if it currently equals `expected`.
    ///
    /// Returns `Ok(false)` when the record is missing or its status has moved on.
    async fn compare_and_set_status(
        &self,
        id: PaymentId,
        expected: PaymentStatus,
        next: PaymentStatus,
    ) -> Result<bool, RepoError>;

    /// Removes a payment unconditionally. Returns false if it did not exist.
    async fn delete(&self, id: PaymentId) -> Result<bool, RepoError>;
}
