//! Payment domain model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::customer::UserId;
use super::status::PaymentStatus;
use crate::error::DomainError;

/// Unique identifier for a Payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PaymentId(Uuid);

impl PaymentId {
    /// Creates a new random PaymentId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a PaymentId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Returns the UUID value.
    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for PaymentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PaymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PaymentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    DebitCard,
    CreditCard,
    Pix,
}

impl AsRef<str> for PaymentMethod {
    fn as_ref(&self) -> &str {
        match self {
            Self::DebitCard => "DEBIT_CARD",
            Self::CreditCard => "CREDIT_CARD",
            Self::Pix => "PIX",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBIT_CARD" => Ok(Self::DebitCard),
            "CREDIT_CARD" => Ok(Self::CreditCard),
            "PIX" => Ok(Self::Pix),
            other => Err(DomainError::InvalidPayment(format!(
                "Unrecognized payment method: {}",
                other
            ))),
        }
    }
}

/// Opaque token identifying the order or checkout batch a payment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct OrderReference(i64);

impl OrderReference {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Derives a reference from a wall-clock instant (milliseconds since epoch).
    ///
    /// Coarse: two checkouts within the same millisecond share a reference.
    pub fn from_timestamp(at: DateTime<Utc>) -> Self {
        Self(at.timestamp_millis())
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for OrderReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated input for creating a payment.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub order_ref: OrderReference,
    pub customer_name: String,
    pub customer_tax_id: String,
    pub requesting_user_id: UserId,
    /// Caller-supplied deduplication key; `None` means no deduplication
    pub idempotency_key: Option<String>,
}

/// A recorded payment.
///
/// Everything except `status` is immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,
    /// Payable amount, always positive
    #[schema(value_type = String, example = "230.00")]
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub order_ref: OrderReference,
    /// Customer name at creation time
    pub customer_name: String,
    /// Customer tax id at creation time
    pub customer_tax_id: String,
    pub requesting_user_id: UserId,
    pub status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a new PENDING payment.
    ///
    /// # Validation
    /// - Amount must be greater than zero
    /// - Customer name and tax id cannot be empty
    pub fn pending(new: NewPayment) -> Result<Self, DomainError> {
        if new.amount <= Decimal::ZERO {
            return Err(DomainError::InvalidPayment(
                "Amount must be greater than zero".into(),
            ));
        }
        if new.customer_name.trim().is_empty() {
            return Err(DomainError::InvalidPayment(
                "Customer name cannot be empty".into(),
            ));
        }
        if new.customer_tax_id.trim().is_empty() {
            return Err(DomainError::InvalidPayment(
                "Customer tax id cannot be empty".into(),
            ));
        }

        Ok(Self {
            id: PaymentId::new(),
            amount: new.amount,
            payment_method: new.payment_method,
            order_ref: new.order_ref,
            customer_name: new.customer_name,
            customer_tax_id: new.customer_tax_id,
            requesting_user_id: new.requesting_user_id,
            status: PaymentStatus::Pending,
            idempotency_key: new.idempotency_key,
            created_at: Utc::now(),
        })
    }
}

/// Secondary lookups over the payment store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentFilter {
    All,
    Status(PaymentStatus),
    TaxId(String),
    OrderRef(OrderReference),
    User(UserId),
}

impl PaymentFilter {
    /// Returns true if the payment belongs to this projection.
    pub fn matches(&self, payment: &Payment) -> bool {
        match self {
            PaymentFilter::All => true,
            PaymentFilter::Status(status) => payment.status == *status,
            PaymentFilter::TaxId(tax_id) => payment.customer_tax_id == *tax_id,
            PaymentFilter::OrderRef(order_ref) => payment.order_ref == *order_ref,
            PaymentFilter::User(user) => payment.requesting_user_id == *user,
        }
    }
}
