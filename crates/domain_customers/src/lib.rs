//! Customer directory domain
//!
//! The ledger does not own customer records; it consumes them through the
//! [`ports::CustomerDirectory`] port. This crate defines the customer shape
//! the rest of the system sees, the lookup port, and input validation for
//! the customer fields the ledger surfaces (names on statements, debtor
//! lists, and overdue alerts).

pub mod customer;
pub mod error;
pub mod ports;

pub use customer::{Customer, CustomerStatus};
pub use error::CustomerError;
pub use ports::CustomerDirectory;
