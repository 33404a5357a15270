//! Data Transfer Objects (DTOs) for requests and responses.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    NewPayment, OrderReference, PaymentFilter, PaymentMethod, PaymentStatus, UserId,
};
use crate::error::{AppError, DomainError};

// ─────────────────────────────────────────────────────────────────────────────
// Checkout DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to check out everything a customer owes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    /// Principal initiating the checkout
    #[schema(value_type = i64, example = 7)]
    pub requesting_user_id: UserId,
    /// Optional key; a repeated checkout with the same key returns the first payment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Payment DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create a payment directly.
///
/// Fields are optional on the wire so that missing or unrecognized values
/// surface as validation errors rather than decoding failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreatePaymentRequest {
    #[schema(value_type = Option<String>, example = "150.00")]
    pub amount: Option<Decimal>,
    /// One of DEBIT_CARD, CREDIT_CARD, PIX
    #[schema(example = "PIX")]
    pub payment_method: Option<String>,
    #[schema(example = 1700000000123_i64)]
    pub order_ref: Option<i64>,
    #[serde(default)]
    #[schema(example = "Ana Souza")]
    pub customer_name: String,
    #[serde(default)]
    #[schema(example = "123.456.789-00")]
    pub customer_tax_id: String,
    #[schema(example = 7)]
    pub requesting_user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
}

impl CreatePaymentRequest {
    /// Checks presence and enum membership of every field.
    pub fn into_new_payment(self) -> Result<NewPayment, DomainError> {
        let amount = self
            .amount
            .ok_or_else(|| DomainError::InvalidPayment("Amount is required".into()))?;
        let payment_method: PaymentMethod = self
            .payment_method
            .as_deref()
            .ok_or_else(|| DomainError::InvalidPayment("Payment method is required".into()))?
            .parse()?;
        let order_ref = self
            .order_ref
            .ok_or_else(|| DomainError::InvalidPayment("Order reference is required".into()))?;
        let requesting_user_id = self.requesting_user_id.ok_or_else(|| {
            DomainError::InvalidPayment("Requesting user id is required".into())
        })?;

        Ok(NewPayment {
            amount,
            payment_method,
            order_ref: OrderReference::new(order_ref),
            customer_name: self.customer_name,
            customer_tax_id: self.customer_tax_id,
            requesting_user_id: UserId::new(requesting_user_id),
            idempotency_key: self.idempotency_key,
        })
    }
}

/// Query parameters for listing payments. At most one may be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaymentQuery {
    /// PENDING, APPROVED, REJECTED or CANCELLED
    pub status: Option<String>,
    pub tax_id: Option<String>,
    pub order_ref: Option<i64>,
    pub user_id: Option<i64>,
}

impl PaymentQuery {
    /// Resolves the query into a single store projection.
    ///
    /// A malformed query is a `BadRequest`, never a payment validation error.
    pub fn into_filter(self) -> Result<PaymentFilter, AppError> {
        let set = [
            self.status.is_some(),
            self.tax_id.is_some(),
            self.order_ref.is_some(),
            self.user_id.is_some(),
        ]
        .iter()
        .filter(|s| **s)
        .count();
        if set > 1 {
            return Err(AppError::BadRequest(
                "Only one of status, tax_id, order_ref, user_id may be given".into(),
            ));
        }

        if let Some(status) = self.status {
            let status: PaymentStatus = status.parse().map_err(|_| {
                AppError::BadRequest(format!("Unrecognized payment status: {}", status))
            })?;
            return Ok(PaymentFilter::Status(status));
        }
        if let Some(tax_id) = self.tax_id {
            return Ok(PaymentFilter::TaxId(tax_id));
        }
        if let Some(order_ref) = self.order_ref {
            return Ok(PaymentFilter::OrderRef(OrderReference::new(order_ref)));
        }
        if let Some(user_id) = self.user_id {
            return Ok(PaymentFilter::User(UserId::new(user_id)));
        }
        Ok(PaymentFilter::All)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Structured error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error kind, e.g. CUSTOMER_UNRESOLVED
    #[schema(example = "NOTHING_PENDING")]
    pub error: String,
    /// Human-readable description
    pub message: String,
    /// HTTP status code
    #[schema(example = 422)]
    pub code: u16,
}
