//! Pending-sales adapter
//!
//! Internal adapter for the [`PendingSales`] port over the `sales` table.
//! The ledger uses it in two places: the missing-charge sync reads the
//! pending on-account backlog, and a debt-clearing payment marks that
//! backlog settled.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{CustomerId, DomainPort, PortError};
use domain_ledger::{PendingSale, PendingSales};

/// PostgreSQL-backed pending-sales source
#[derive(Debug, Clone)]
pub struct PgPendingSales {
    pool: PgPool,
}

impl PgPendingSales {
    /// Creates a new adapter over the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PgPendingSales {}

#[async_trait]
impl PendingSales for PgPendingSales {
    async fn pending_on_account(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<PendingSale>, PortError> {
        let rows = sqlx::query_as::<_, PendingSaleRow>(
            "SELECT id, sale_number, total, sale_date FROM sales \
             WHERE customer_id = $1 AND status = 'pending' AND is_on_account \
             ORDER BY sale_date ASC",
        )
        .bind(Uuid::from(customer_id))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Internal {
            message: "pending sales lookup failed".to_string(),
            source: Some(Box::new(e)),
        })?;

        Ok(rows.into_iter().map(PendingSaleRow::into_domain).collect())
    }

    async fn settle_for_customer(&self, customer_id: CustomerId) -> Result<u64, PortError> {
        let result = sqlx::query(
            "UPDATE sales \
             SET status = 'completed', is_on_account = FALSE, updated_at = now() \
             WHERE customer_id = $1 AND status = 'pending' AND is_on_account",
        )
        .bind(Uuid::from(customer_id))
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Internal {
            message: "settling pending sales failed".to_string(),
            source: Some(Box::new(e)),
        })?;

        Ok(result.rows_affected())
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct PendingSaleRow {
    id: Uuid,
    sale_number: String,
    total: Decimal,
    sale_date: DateTime<Utc>,
}

impl PendingSaleRow {
    fn into_domain(self) -> PendingSale {
        PendingSale {
            id: self.id.into(),
            number: self.sale_number,
            total: self.total,
            sale_date: self.sale_date,
        }
    }
}
