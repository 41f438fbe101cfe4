//! Customer directory adapter
//!
//! Internal adapter for the [`CustomerDirectory`] port reading the
//! `customers` table directly. A deployment that keeps customers in an
//! external CRM would swap in an API-backed adapter instead.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{CustomerId, DomainPort, PortError};
use domain_customers::{Customer, CustomerDirectory, CustomerStatus};

/// PostgreSQL-backed customer directory
#[derive(Debug, Clone)]
pub struct PgCustomerDirectory {
    pool: PgPool,
}

impl PgCustomerDirectory {
    /// Creates a new adapter over the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PgCustomerDirectory {}

#[async_trait]
impl CustomerDirectory for PgCustomerDirectory {
    async fn find_one(&self, customer_id: CustomerId) -> Result<Customer, PortError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            "SELECT id, first_name, last_name, document_number, email, phone, status, created_at \
             FROM customers WHERE id = $1",
        )
        .bind(Uuid::from(customer_id))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Internal {
            message: "customer lookup failed".to_string(),
            source: Some(Box::new(e)),
        })?
        .ok_or_else(|| PortError::not_found("Customer", customer_id))?;

        Ok(row.into_domain())
    }
}

/// Customer status as stored in Postgres
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "customer_status", rename_all = "snake_case")]
enum CustomerStatusRow {
    Active,
    Archived,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct CustomerRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    document_number: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    status: CustomerStatusRow,
    created_at: DateTime<Utc>,
}

impl CustomerRow {
    fn into_domain(self) -> Customer {
        Customer {
            id: self.id.into(),
            first_name: self.first_name,
            last_name: self.last_name,
            document_number: self.document_number,
            email: self.email,
            phone: self.phone,
            status: match self.status {
                CustomerStatusRow::Active => CustomerStatus::Active,
                CustomerStatusRow::Archived => CustomerStatus::Archived,
            },
            created_at: self.created_at,
        }
    }
}
