//! Database test utilities
//!
//! Spins up a disposable PostgreSQL container and applies the ledger schema,
//! for the repository and engine tests that need a real store. These tests
//! are `#[ignore]`d by default; run them with Docker available:
//!
//! ```bash
//! cargo test -- --ignored
//! ```

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::postgres::Postgres;

/// A PostgreSQL test container with the ledger schema applied
pub struct TestDatabase {
    _container: ContainerAsync<Postgres>,
    pub pool: PgPool,
}

impl TestDatabase {
    /// Starts a fresh container and runs the migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the container fails to start or the schema fails
    /// to apply.
    pub async fn new() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let container = Postgres::default().start().await?;

        let port = container.get_host_port_ipv4(5432).await?;
        let host = container.get_host().await?.to_string();
        let url = format!("postgres://postgres:postgres@{host}:{port}/postgres");

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&url)
            .await?;

        infra_db::MIGRATOR.run(&pool).await?;

        Ok(Self {
            _container: container,
            pool,
        })
    }

    /// Returns a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Inserts a customer row and returns its id
    pub async fn seed_customer(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> Result<uuid::Uuid, sqlx::Error> {
        let (id,): (uuid::Uuid,) = sqlx::query_as(
            "INSERT INTO customers (first_name, last_name) VALUES ($1, $2) RETURNING id",
        )
        .bind(first_name)
        .bind(last_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Inserts a pending on-account sale for a customer
    pub async fn seed_pending_sale(
        &self,
        customer_id: uuid::Uuid,
        sale_number: &str,
        total: rust_decimal::Decimal,
    ) -> Result<uuid::Uuid, sqlx::Error> {
        let (id,): (uuid::Uuid,) = sqlx::query_as(
            "INSERT INTO sales (customer_id, sale_number, total, status, is_on_account) \
             VALUES ($1, $2, $3, 'pending', TRUE) RETURNING id",
        )
        .bind(customer_id)
        .bind(sale_number)
        .bind(total)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }
}
