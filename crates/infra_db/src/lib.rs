//! Database infrastructure for the POS ledger
//!
//! This crate owns every SQL statement in the system. It provides:
//!
//! - Connection pool configuration ([`pool`])
//! - Error mapping from Postgres error codes to typed variants ([`error`])
//! - The account store and movement log repositories ([`repositories`]),
//!   including the `SELECT ... FOR UPDATE` row locking the ledger engine
//!   serializes on
//! - Postgres adapters for the customer-directory and pending-sales ports
//!   ([`adapters`])
//!
//! The schema lives in `migrations/` and is applied with `sqlx::migrate!`.

pub mod adapters;
pub mod error;
pub mod pool;
pub mod repositories;

pub use error::DatabaseError;
pub use pool::{create_pool, create_pool_from_url, DatabaseConfig, DatabasePool};
pub use repositories::accounts::AccountRepository;
pub use repositories::movements::MovementRepository;

/// Embedded schema migrations
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
