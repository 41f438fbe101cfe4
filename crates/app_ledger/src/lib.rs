//! Application services for the customer account ledger
//!
//! Three stateless services over a shared connection pool:
//!
//! - [`LedgerService`]: the engine. Executes charge, payment, surcharge,
//!   and adjustment commands as single row-locked transactions, plus the
//!   get-or-create account path and the missing-charge sync.
//! - [`AccountQueries`]: the read side. Statements, filtered listings,
//!   debtor and overdue lists, aggregate stats, and the administrative
//!   account mutations.
//! - [`OverdueScheduler`]: the daily overdue recompute and the monthly
//!   alert broadcast, timer-driven with an injectable clock.

pub mod error;
pub mod queries;
pub mod scheduler;
pub mod service;

pub use error::AccountsError;
pub use queries::{
    AccountFilters, AccountListing, AccountStatement, AccountStats, AccountQueries,
    PaginatedAccounts, UpdateAccount,
};
pub use scheduler::{OverdueRunReport, OverdueScheduler, TracingOverdueNotifier};
pub use service::{LedgerService, SyncReport, SyncedCharge};
