//! Payment Ledger
//!
//! Owns persisted payment records and drives every status change through
//! [`attempt`], so the lifecycle table has one implementation.
#![allow(clippy::collapsible_if)]

use checkout_types::{
    AppError, NewPayment, OrderReference, Payment, PaymentFilter, PaymentId, PaymentRepository,
    PaymentStatus, RepoError, Transition, UserId, attempt,
};

/// Application service for payment records.
///
/// Generic over `R: PaymentRepository` - the store adapter is injected at compile time.
pub struct PaymentLedger<R: PaymentRepository> {
    repo: R,
}

impl<R: PaymentRepository> PaymentLedger<R> {
    /// Creates a new ledger over the given store.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns a reference to the underlying store.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Creation
    // ─────────────────────────────────────────────────────────────────────────────

    /// Validates and persists a new PENDING payment.
    ///
    /// With an idempotency key, a payment already recorded under that key for
    /// the same customer and requesting user is returned unchanged and nothing
    /// new is written. A key held by anyone else is an `IdempotencyConflict`.
    #[tracing::instrument(skip(self, new), fields(order_ref = %new.order_ref, amount = %new.amount))]
    pub async fn create(&self, new: NewPayment) -> Result<Payment, AppError> {
        let payment = Payment::pending(new)?;
        let key = payment.idempotency_key.clone();
        let tax_id = payment.customer_tax_id.clone();
        let user = payment.requesting_user_id;

        if let Some(key) = key.as_deref() {
            if let Some(existing) = self.replay(key, &tax_id, user).await? {
                return Ok(existing);
            }
        }

        match self.repo.insert(payment).await {
            Ok(created) => {
                tracing::info!(payment_id = %created.id, "Payment created");
                Ok(created)
            }
            Err(RepoError::Conflict(msg)) => {
                // A concurrent create claimed the same key first.
                if let Some(key) = key.as_deref() {
                    if let Some(existing) = self.replay(key, &tax_id, user).await? {
                        return Ok(existing);
                    }
                }
                Err(AppError::BadRequest(msg))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Returns the payment recorded under `key` if it was made for `tax_id`
    /// by `user`.
    ///
    /// # Errors
    /// `IdempotencyConflict` when the key is bound to another customer or user.
    pub async fn replay(
        &self,
        key: &str,
        tax_id: &str,
        user: UserId,
    ) -> Result<Option<Payment>, AppError> {
        let Some(existing) = self.repo.find_by_idempotency_key(key).await? else {
            return Ok(None);
        };

        if existing.customer_tax_id != tax_id || existing.requesting_user_id != user {
            tracing::warn!(payment_id = %existing.id, "Idempotency key reused for a different customer or user");
            return Err(AppError::IdempotencyConflict(key.to_string()));
        }

        tracing::info!(payment_id = %existing.id, "Idempotency key reused, returning existing payment");
        Ok(Some(existing))
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────────────

    /// PENDING -> APPROVED.
    pub async fn approve(&self, id: PaymentId) -> Result<Payment, AppError> {
        self.transition(id, Transition::Approve).await
    }

    /// PENDING -> REJECTED.
    pub async fn reject(&self, id: PaymentId) -> Result<Payment, AppError> {
        self.transition(id, Transition::Reject).await
    }

    /// PENDING or APPROVED -> CANCELLED.
    pub async fn cancel(&self, id: PaymentId) -> Result<Payment, AppError> {
        self.transition(id, Transition::Cancel).await
    }

    /// Read, check against the lifecycle table, then compare-and-set.
    ///
    /// When the store reports the status moved underneath us, the record is
    /// re-read and the request re-evaluated against the new status.
    #[tracing::instrument(skip(self), fields(payment_id = %id, transition = %requested))]
    async fn transition(&self, id: PaymentId, requested: Transition) -> Result<Payment, AppError> {
        loop {
            let current = self.get(id).await?;
            let next = attempt(current.status, requested)?;

            if self
                .repo
                .compare_and_set_status(id, current.status, next)
                .await?
            {
                tracing::info!(from = %current.status, to = %next, "Payment status changed");
                return Ok(Payment {
                    status: next,
                    ..current
                });
            }

            tracing::debug!(from = %current.status, "Status changed concurrently, re-evaluating");
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────────

    /// Gets a payment by ID.
    pub async fn get(&self, id: PaymentId) -> Result<Payment, AppError> {
        self.repo
            .get(id)
            .await
            .map_err(Into::into)
            .and_then(|opt| opt.ok_or_else(|| AppError::NotFound(format!("Payment {}", id))))
    }

    /// Lists payments matching a filter.
    pub async fn list(&self, filter: PaymentFilter) -> Result<Vec<Payment>, AppError> {
        self.repo.list(filter).await.map_err(Into::into)
    }

    pub async fn list_all(&self) -> Result<Vec<Payment>, AppError> {
        self.list(PaymentFilter::All).await
    }

    pub async fn list_by_status(&self, status: PaymentStatus) -> Result<Vec<Payment>, AppError> {
        self.list(PaymentFilter::Status(status)).await
    }

    pub async fn list_by_tax_id(&self, tax_id: &str) -> Result<Vec<Payment>, AppError> {
        self.list(PaymentFilter::TaxId(tax_id.to_string())).await
    }

    pub async fn list_by_order_ref(
        &self,
        order_ref: OrderReference,
    ) -> Result<Vec<Payment>, AppError> {
        self.list(PaymentFilter::OrderRef(order_ref)).await
    }

    pub async fn list_by_user(&self, user: UserId) -> Result<Vec<Payment>, AppError> {
        self.list(PaymentFilter::User(user)).await
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Administration
    // ─────────────────────────────────────────────────────────────────────────────

    /// Removes a payment regardless of its status.
    #[tracing::instrument(skip(self), fields(payment_id = %id))]
    pub async fn delete(&self, id: PaymentId) -> Result<(), AppError> {
        if self.repo.delete(id).await? {
            tracing::warn!("Payment deleted administratively");
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Payment {}", id)))
        }
    }
}
