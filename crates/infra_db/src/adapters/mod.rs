//! Port adapters backed by PostgreSQL
//!
//! These implement the port traits the ledger consumes against the tables
//! owned by the collaborating services, for deployments where everything
//! shares one database.

pub mod customers;
pub mod sales;

pub use customers::PgCustomerDirectory;
pub use sales::PgPendingSales;
