//! SQLite repository adapter.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use sqlx::sqlite::SqliteConnectOptions;
use std::str::FromStr;

use checkout_types::{
    Payment, PaymentFilter, PaymentId, PaymentRepository, PaymentStatus, RepoError,
};

use crate::types::{PAYMENT_COLUMNS, SqlitePaymentRow, map_sqlx_error};

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // A single connection keeps `sqlite::memory:` databases shared across queries.
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let ddl = include_str!("../migrations/0001_create_payments.sql");
        sqlx::query(ddl).execute(&pool).await?;

        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl PaymentRepository for SqliteRepo {
    async fn insert(&self, payment: Payment) -> Result<Payment, RepoError> {
        sqlx::query(
            r#"INSERT INTO payments (id, amount, payment_method, order_ref, customer_name,
                   customer_tax_id, requesting_user_id, status, idempotency_key, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(payment.id.to_string())
        .bind(payment.amount.to_string())
        .bind(payment.payment_method.to_string())
        .bind(payment.order_ref.value())
        .bind(&payment.customer_name)
        .bind(&payment.customer_tax_id)
        .bind(payment.requesting_user_id.value())
        .bind(payment.status.to_string())
        .bind(&payment.idempotency_key)
        .bind(payment.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(payment)
    }

    async fn get(&self, id: PaymentId) -> Result<Option<Payment>, RepoError> {
        let row: Option<SqlitePaymentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payments WHERE id = ?",
            PAYMENT_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(SqlitePaymentRow::into_domain).transpose()
    }

    async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<Payment>, RepoError> {
        let row: Option<SqlitePaymentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payments WHERE idempotency_key = ?",
            PAYMENT_COLUMNS
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(SqlitePaymentRow::into_domain).transpose()
    }

    async fn list(&self, filter: PaymentFilter) -> Result<Vec<Payment>, RepoError> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM payments", PAYMENT_COLUMNS));
        match filter {
            PaymentFilter::All => {}
            PaymentFilter::Status(status) => {
                qb.push(" WHERE status = ").push_bind(status.to_string());
            }
            PaymentFilter::TaxId(tax_id) => {
                qb.push(" WHERE customer_tax_id = ").push_bind(tax_id);
            }
            PaymentFilter::OrderRef(order_ref) => {
                qb.push(" WHERE order_ref = ").push_bind(order_ref.value());
            }
            PaymentFilter::User(user) => {
                qb.push(" WHERE requesting_user_id = ").push_bind(user.value());
            }
        }
        qb.push(" ORDER BY created_at");

        let rows: Vec<SqlitePaymentRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter().map(SqlitePaymentRow::into_domain).collect()
    }

    async fn compare_and_set_status(
        &self,
        id: PaymentId,
        expected: PaymentStatus,
        next: PaymentStatus,
    ) -> Result<bool, RepoError> {
        let result = sqlx::query(r#"UPDATE payments SET status = ? WHERE id = ? AND status = ?"#)
            .bind(next.to_string())
            .bind(id.to_string())
            .bind(expected.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let swapped = result.rows_affected() == 1;
        if !swapped {
            tracing::debug!(payment_id = %id, %expected, %next, "Status compare-and-set missed");
        }
        Ok(swapped)
    }

    async fn delete(&self, id: PaymentId) -> Result<bool, RepoError> {
        let result = sqlx::query(r#"DELETE FROM payments WHERE id = ?"#)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
