//! Customer domain errors

use thiserror::Error;

/// Errors that can occur in the customer domain
#[derive(Debug, Error)]
pub enum CustomerError {
    /// Customer with the given ID was not found
    #[error("Customer not found: {0}")]
    NotFound(String),

    /// A unique field (document, email) collides with an existing record
    #[error("Duplicate customer: {0}")]
    Duplicate(String),

    /// Invalid customer data provided
    #[error("Invalid customer data: {0}")]
    InvalidData(String),
}
