//! PostgreSQL repository adapter.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use checkout_types::{
    Payment, PaymentFilter, PaymentId, PaymentRepository, PaymentStatus, RepoError,
};

use crate::types::{PAYMENT_COLUMNS, PgPaymentRow, map_sqlx_error};

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL repository. Status transitions are single conditional UPDATEs.
pub struct PostgresRepo {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

impl PostgresRepo {
    /// Creates a new PostgreSQL repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        tracing::info!("Running PostgreSQL migrations");
        execute_migration(
            &pool,
            include_str!("../migrations/0001_create_payments_pg.sql"),
            "0001",
        )
        .await?;
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl PaymentRepository for PostgresRepo {
    async fn insert(&self, payment: Payment) -> Result<Payment, RepoError> {
        sqlx::query(
            r#"INSERT INTO payments (id, amount, payment_method, order_ref, customer_name,
                   customer_tax_id, requesting_user_id, status, idempotency_key, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"#,
        )
        .bind(payment.id.into_uuid())
        .bind(payment.amount)
        .bind(payment.payment_method.to_string())
        .bind(payment.order_ref.value())
        .bind(&payment.customer_name)
        .bind(&payment.customer_tax_id)
        .bind(payment.requesting_user_id.value())
        .bind(payment.status.to_string())
        .bind(&payment.idempotency_key)
        .bind(payment.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(payment)
    }

    async fn get(&self, id: PaymentId) -> Result<Option<Payment>, RepoError> {
        let row: Option<PgPaymentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payments WHERE id = $1",
            PAYMENT_COLUMNS
        ))
        .bind(id.into_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(PgPaymentRow::into_domain).transpose()
    }

    async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<Payment>, RepoError> {
        let row: Option<PgPaymentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payments WHERE idempotency_key = $1",
            PAYMENT_COLUMNS
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(PgPaymentRow::into_domain).transpose()
    }

    async fn list(&self, filter: PaymentFilter) -> Result<Vec<Payment>, RepoError> {
        let mut qb =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM payments", PAYMENT_COLUMNS));
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

        let rows: Vec<PgPaymentRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter().map(PgPaymentRow::into_domain).collect()
    }

    async fn compare_and_set_status(
        &self,
        id: PaymentId,
        expected: PaymentStatus,
        next: PaymentStatus,
    ) -> Result<bool, RepoError> {
        let result = sqlx::query(r#"UPDATE payments SET status = $1 WHERE id = $2 AND status = $3"#)
            .bind(next.to_string())
            .bind(id.into_uuid())
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
        let result = sqlx::query(r#"DELETE FROM payments WHERE id = $1"#)
            .bind(id.into_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
