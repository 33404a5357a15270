//! Error types for the checkout service.

use crate::domain::{CustomerId, PaymentStatus, Transition};

/// Domain-level errors (business logic violations).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid payment: {0}")]
    InvalidPayment(String),

    #[error("Cannot {requested} a payment that is {from}")]
    InvalidTransition {
        from: PaymentStatus,
        requested: Transition,
    },
}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Application-level errors (for HTTP responses).
///
/// Every variant carries a stable kind (see [`AppError::kind`]) and a
/// human-readable message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Customer {customer_id} could not be resolved: {reason}")]
    CustomerUnresolved {
        customer_id: CustomerId,
        reason: String,
    },

    #[error("No pending amount found for customer {0}")]
    NothingPending(CustomerId),

    #[error("Invalid payment: {0}")]
    InvalidPayment(String),

    #[error("Cannot {requested} a payment that is {from}")]
    InvalidTransition {
        from: PaymentStatus,
        requested: Transition,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    /// The idempotency key is already bound to another customer or user.
    #[error("Idempotency key {0} belongs to a different payment")]
    IdempotencyConflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Machine-readable error kind used in response bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::CustomerUnresolved { .. } => "CUSTOMER_UNRESOLVED",
            AppError::NothingPending(_) => "NOTHING_PENDING",
            AppError::InvalidPayment(_) => "INVALID_PAYMENT",
            AppError::InvalidTransition { .. } => "INVALID_TRANSITION",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::IdempotencyConflict(_) => "IDEMPOTENCY_CONFLICT",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Internal(_) => "INTERNAL",
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidPayment(msg) => AppError::InvalidPayment(msg),
            DomainError::InvalidTransition { from, requested } => {
                AppError::InvalidTransition { from, requested }
            }
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Domain(e) => e.into(),
            RepoError::NotFound => AppError::NotFound("Resource not found".into()),
            RepoError::Database(e) => AppError::Internal(e),
            RepoError::Conflict(e) => AppError::BadRequest(e),
        }
    }
}
