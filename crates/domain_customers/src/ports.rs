//! Customer directory port
//!
//! The `CustomerDirectory` trait defines the single operation the ledger
//! needs from the customer-owning service: resolve a customer id. Adapters
//! implement it against PostgreSQL (infra_db) or in memory for tests.

use async_trait::async_trait;

use core_kernel::{CustomerId, DomainPort, PortError};

use crate::customer::Customer;

/// Lookup interface into the externally-owned customer records
#[async_trait]
pub trait CustomerDirectory: DomainPort {
    /// Resolves a customer by id
    ///
    /// # Errors
    ///
    /// Returns `PortError::NotFound` when no customer exists with the id.
    async fn find_one(&self, customer_id: CustomerId) -> Result<Customer, PortError>;
}
