//! Ledger domain errors
//!
//! Every variant here is a validation failure raised before any write; the
//! surrounding transaction aborts and no movement or balance change is
//! persisted. All of them map to the client "bad request" class upstream.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by the ledger operation planning
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Charges are rejected while the account is suspended
    #[error("customer account is suspended, new charges are not allowed")]
    AccountSuspended,

    /// The charge would push the balance past the enforced credit limit
    #[error("credit limit exceeded (limit ${limit}, current balance ${balance})")]
    CreditLimitExceeded { limit: Decimal, balance: Decimal },

    /// Payments require an outstanding positive balance
    #[error("customer has no pending debt")]
    NoPendingDebt,

    /// A payment may never exceed the outstanding debt
    #[error("payment (${amount}) exceeds the pending debt (${balance})")]
    PaymentExceedsDebt { amount: Decimal, balance: Decimal },

    /// Surcharges require an outstanding positive balance
    #[error("customer has no pending debt to surcharge")]
    NoDebtToSurcharge,
}
