//! Checkout Aggregator
//!
//! Resolves the customer, gathers what they owe from the cart and scheduling
//! services, and records the sum as one PENDING PIX payment.
//!
//! The customer directory is a mandatory dependency: any failure aborts the
//! checkout. The two subtotal sources are best-effort: any failure degrades
//! that source to zero and is logged as a warning.
#![allow(clippy::collapsible_if)]

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;

use checkout_types::{
    AppError, CartLedger, CheckoutRequest, CustomerDirectory, CustomerId, CustomerSnapshot,
    NewPayment, OrderReference, Payment, PaymentMethod, PaymentRepository, RemoteError,
    SchedulingLedger,
};

use crate::PaymentLedger;

/// Orchestrates a checkout over injected remote services.
pub struct CheckoutAggregator<R: PaymentRepository> {
    ledger: Arc<PaymentLedger<R>>,
    directory: Arc<dyn CustomerDirectory>,
    cart: Arc<dyn CartLedger>,
    scheduling: Arc<dyn SchedulingLedger>,
    call_timeout: Duration,
}

impl<R: PaymentRepository> CheckoutAggregator<R> {
    /// `call_timeout` bounds every remote call made during a checkout.
    pub fn new(
        ledger: Arc<PaymentLedger<R>>,
        directory: Arc<dyn CustomerDirectory>,
        cart: Arc<dyn CartLedger>,
        scheduling: Arc<dyn SchedulingLedger>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            ledger,
            directory,
            cart,
            scheduling,
            call_timeout,
        }
    }

    /// Returns the ledger payments are recorded in.
    pub fn ledger(&self) -> &Arc<PaymentLedger<R>> {
        &self.ledger
    }

    /// Aggregates everything `customer_id` owes into one PENDING payment.
    ///
    /// # Errors
    /// - `CustomerUnresolved` when the directory fails, times out or has no such customer
    /// - `NothingPending` when the combined total is zero or less
    /// - `IdempotencyConflict` when the key was used for another customer or user
    ///
    /// No payment is written on either path.
    #[tracing::instrument(skip(self, request), fields(customer_id = %customer_id, requesting_user_id = %request.requesting_user_id))]
    pub async fn checkout(
        &self,
        customer_id: CustomerId,
        request: CheckoutRequest,
    ) -> Result<Payment, AppError> {
        let customer = self.resolve_customer(customer_id).await?;
        tracing::info!(customer_name = %customer.name, "Customer resolved");

        if let Some(key) = request.idempotency_key.as_deref() {
            if let Some(existing) = self
                .ledger
                .replay(key, &customer.tax_id, request.requesting_user_id)
                .await?
            {
                return Ok(existing);
            }
        }

        let (cart_subtotal, scheduling_subtotal) = tokio::join!(
            self.best_effort("cart", self.cart.cart_subtotal(customer_id)),
            self.best_effort("scheduling", self.scheduling_subtotal(customer_id)),
        );

        let total = cart_subtotal + scheduling_subtotal;
        tracing::info!(%cart_subtotal, %scheduling_subtotal, %total, "Checkout total computed");

        if total <= Decimal::ZERO {
            return Err(AppError::NothingPending(customer_id));
        }

        self.ledger
            .create(NewPayment {
                amount: total,
                payment_method: PaymentMethod::Pix,
                order_ref: OrderReference::from_timestamp(Utc::now()),
                customer_name: customer.name,
                customer_tax_id: customer.tax_id,
                requesting_user_id: request.requesting_user_id,
                idempotency_key: request.idempotency_key,
            })
            .await
    }

    async fn resolve_customer(&self, customer_id: CustomerId) -> Result<CustomerSnapshot, AppError> {
        match self
            .required("customer-directory", self.directory.find_customer(customer_id))
            .await
        {
            Ok(Some(customer)) => Ok(customer),
            Ok(None) => Err(AppError::CustomerUnresolved {
                customer_id,
                reason: "customer not found".into(),
            }),
            Err(err) => Err(AppError::CustomerUnresolved {
                customer_id,
                reason: err.to_string(),
            }),
        }
    }

    /// Sums pending appointment charges; charges without a price count as nothing.
    async fn scheduling_subtotal(&self, customer_id: CustomerId) -> Result<Decimal, RemoteError> {
        let charges = self.scheduling.pending_charges(customer_id).await?;
        Ok(charges.iter().filter_map(|c| c.charge).sum::<Decimal>())
    }

    /// Runs a call under the per-call timeout and propagates any failure.
    async fn required<T, F>(&self, source: &'static str, call: F) -> Result<T, RemoteError>
    where
        F: Future<Output = Result<T, RemoteError>>,
    {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!(source, timeout = ?self.call_timeout, "Remote call timed out");
                Err(RemoteError::Timeout(self.call_timeout))
            }
        }
    }

    /// Runs a subtotal call under the per-call timeout; any failure counts as zero.
    async fn best_effort<F>(&self, source: &'static str, call: F) -> Decimal
    where
        F: Future<Output = Result<Decimal, RemoteError>>,
    {
        match self.required(source, call).await {
            Ok(subtotal) => subtotal,
            Err(err) => {
                tracing::warn!(source, error = %err, "Subtotal source unavailable, counting it as zero");
                Decimal::ZERO
            }
        }
    }
}
