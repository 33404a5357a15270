//! Database row types for SQLite and PostgreSQL.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use checkout_types::{
    OrderReference, Payment, PaymentId, PaymentMethod, PaymentStatus, RepoError, UserId,
};

/// Column list shared by every SELECT.
pub const PAYMENT_COLUMNS: &str = "id, amount, payment_method, order_ref, customer_name, \
     customer_tax_id, requesting_user_id, status, idempotency_key, created_at";

/// Payment row as stored by SQLite (ids, amounts and timestamps as TEXT).
#[cfg(feature = "sqlite")]
#[derive(FromRow)]
pub struct SqlitePaymentRow {
    pub id: String,
    pub amount: String,
    pub payment_method: String,
    pub order_ref: i64,
    pub customer_name: String,
    pub customer_tax_id: String,
    pub requesting_user_id: i64,
    pub status: String,
    pub idempotency_key: Option<String>,
    pub created_at: String,
}

#[cfg(feature = "sqlite")]
impl SqlitePaymentRow {
    pub fn into_domain(self) -> Result<Payment, RepoError> {
        let id = Uuid::parse_str(&self.id).map_err(|e| RepoError::Database(e.to_string()))?;
        let amount: Decimal = self
            .amount
            .parse()
            .map_err(|e: rust_decimal::Error| RepoError::Database(e.to_string()))?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| RepoError::Database(e.to_string()))?
            .with_timezone(&Utc);

        assemble(RowParts {
            id,
            amount,
            payment_method: &self.payment_method,
            order_ref: self.order_ref,
            customer_name: self.customer_name,
            customer_tax_id: self.customer_tax_id,
            requesting_user_id: self.requesting_user_id,
            status: &self.status,
            idempotency_key: self.idempotency_key,
            created_at,
        })
    }
}

/// Payment row as stored by PostgreSQL.
#[cfg(feature = "postgres")]
#[derive(FromRow)]
pub struct PgPaymentRow {
    pub id: Uuid,
    pub amount: Decimal,
    pub payment_method: String,
    pub order_ref: i64,
    pub customer_name: String,
    pub customer_tax_id: String,
    pub requesting_user_id: i64,
    pub status: String,
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(feature = "postgres")]
impl PgPaymentRow {
    pub fn into_domain(self) -> Result<Payment, RepoError> {
        assemble(RowParts {
            id: self.id,
            amount: self.amount,
            payment_method: &self.payment_method,
            order_ref: self.order_ref,
            customer_name: self.customer_name,
            customer_tax_id: self.customer_tax_id,
            requesting_user_id: self.requesting_user_id,
            status: &self.status,
            idempotency_key: self.idempotency_key,
            created_at: self.created_at,
        })
    }
}

struct RowParts<'a> {
    id: Uuid,
    amount: Decimal,
    payment_method: &'a str,
    order_ref: i64,
    customer_name: String,
    customer_tax_id: String,
    requesting_user_id: i64,
    status: &'a str,
    idempotency_key: Option<String>,
    created_at: DateTime<Utc>,
}

fn assemble(parts: RowParts<'_>) -> Result<Payment, RepoError> {
    let payment_method: PaymentMethod = parts
        .payment_method
        .parse()
        .map_err(|e: checkout_types::DomainError| RepoError::Database(e.to_string()))?;
    let status: PaymentStatus = parts
        .status
        .parse()
        .map_err(|e: checkout_types::DomainError| RepoError::Database(e.to_string()))?;

    Ok(Payment {
        id: PaymentId::from_uuid(parts.id),
        amount: parts.amount,
        payment_method,
        order_ref: OrderReference::new(parts.order_ref),
        customer_name: parts.customer_name,
        customer_tax_id: parts.customer_tax_id,
        requesting_user_id: UserId::new(parts.requesting_user_id),
        status,
        idempotency_key: parts.idempotency_key,
        created_at: parts.created_at,
    })
}

/// Maps a sqlx failure, surfacing unique-key violations as conflicts.
pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepoError::Conflict(db.message().to_string())
        }
        _ => RepoError::Database(err.to_string()),
    }
}
