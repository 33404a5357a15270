//! In-memory repository adapter.
//!
//! Used for local runs (`DATABASE_URL=memory://`) and tests. Each record
//! lives behind a dashmap shard lock, which makes the status
//! compare-and-set atomic per record.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use checkout_types::{
    Payment, PaymentFilter, PaymentId, PaymentRepository, PaymentStatus, RepoError,
};

/// Payment store held in process memory.
#[derive(Default)]
pub struct InMemoryRepo {
    payments: DashMap<PaymentId, Payment>,
    idempotency_keys: DashMap<String, PaymentId>,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored payments.
    pub fn len(&self) -> usize {
        self.payments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryRepo {
    #[tracing::instrument(skip(self, payment), fields(payment_id = %payment.id))]
    async fn insert(&self, payment: Payment) -> Result<Payment, RepoError> {
        let Some(key) = payment.idempotency_key.clone() else {
            self.payments.insert(payment.id, payment.clone());
            return Ok(payment);
        };

        // The key's shard lock is held until the record is in place.
        match self.idempotency_keys.entry(key) {
            Entry::Occupied(entry) => {
                tracing::debug!(key = %entry.key(), "Idempotency key already claimed");
                Err(RepoError::Conflict(format!(
                    "Idempotency key already used: {}",
                    entry.key()
                )))
            }
            Entry::Vacant(entry) => {
                self.payments.insert(payment.id, payment.clone());
                entry.insert(payment.id);
                Ok(payment)
            }
        }
    }

    async fn get(&self, id: PaymentId) -> Result<Option<Payment>, RepoError> {
        Ok(self.payments.get(&id).map(|p| p.value().clone()))
    }

    async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<Payment>, RepoError> {
        let Some(id) = self.idempotency_keys.get(key).map(|id| *id.value()) else {
            return Ok(None);
        };
        self.get(id).await
    }

    async fn list(&self, filter: PaymentFilter) -> Result<Vec<Payment>, RepoError> {
        let mut payments: Vec<Payment> = self
            .payments
            .iter()
            .filter(|p| filter.matches(p.value()))
            .map(|p| p.value().clone())
            .collect();
        payments.sort_by_key(|p| p.created_at);
        Ok(payments)
    }

    async fn compare_and_set_status(
        &self,
        id: PaymentId,
        expected: PaymentStatus,
        next: PaymentStatus,
    ) -> Result<bool, RepoError> {
        match self.payments.get_mut(&id) {
            Some(mut payment) if payment.status == expected => {
                payment.status = next;
                Ok(true)
            }
            _ => {
                tracing::debug!(payment_id = %id, %expected, %next, "Status compare-and-set missed");
                Ok(false)
            }
        }
    }

    async fn delete(&self, id: PaymentId) -> Result<bool, RepoError> {
        match self.payments.remove(&id) {
            Some((_, payment)) => {
                if let Some(key) = payment.idempotency_key {
                    self.idempotency_keys.remove(&key);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
