//! Application-level error type
//!
//! Joins the three failure sources a ledger operation can hit: a domain
//! validation (client error), a missing customer (not found), or the store
//! itself. Collaborator ports get their own variant so callers can tell an
//! unavailable directory apart from a missing customer.

use thiserror::Error;

use core_kernel::{CustomerId, PortError};
use domain_ledger::LedgerError;
use infra_db::DatabaseError;

/// Errors surfaced by the ledger application services
#[derive(Debug, Error)]
pub enum AccountsError {
    /// A ledger invariant rejected the operation before any write
    #[error(transparent)]
    InvalidOperation(#[from] LedgerError),

    /// The referenced customer does not exist in the directory
    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    /// A consumed collaborator failed
    #[error("Collaborator failure: {0}")]
    Collaborator(#[source] PortError),

    /// The store failed
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl AccountsError {
    /// Maps a directory lookup failure for the given customer
    pub(crate) fn from_directory(customer_id: CustomerId, error: PortError) -> Self {
        if error.is_not_found() {
            AccountsError::CustomerNotFound(customer_id)
        } else {
            AccountsError::Collaborator(error)
        }
    }

    /// Returns true if this error belongs to the client "bad request" class
    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, AccountsError::InvalidOperation(_))
    }

    /// Returns true if this error means a referenced entity was missing
    pub fn is_not_found(&self) -> bool {
        match self {
            AccountsError::CustomerNotFound(_) => true,
            AccountsError::Database(db) => db.is_not_found(),
            _ => false,
        }
    }
}
