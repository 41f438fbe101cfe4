//! Customer current-account ledger domain
//!
//! This crate holds the pure core of the ledger: the account and movement
//! entities, the typed commands for the four mutation operations, and the
//! planning functions that enforce every invariant before a single row is
//! written. The planning functions are synchronous and side-effect free;
//! the application layer executes their output inside a row-locked database
//! transaction.
//!
//! # Invariants
//!
//! - An account's `balance` always equals the `balance_after` of its most
//!   recent movement.
//! - Every movement satisfies `balance_after = balance_before + amount`.
//! - Movements are append-only; the balance is derivable by replay.

pub mod account;
pub mod error;
pub mod movement;
pub mod operations;
pub mod overdue;
pub mod ports;
pub mod statement;

pub use account::{AccountPatch, AccountStatus, CustomerAccount};
pub use error::LedgerError;
pub use movement::{chain_is_continuous, AccountMovement, MovementDraft, MovementType};
pub use operations::{
    plan_adjustment, plan_charge, plan_payment, plan_surcharge, AdjustmentCommand, ChargeCommand,
    LedgerUpdate, PaymentCommand, SurchargeCommand, SurchargeKind,
};
pub use overdue::{overdue_transition, whole_days_overdue, OverdueAlert, SUSPENSION_THRESHOLD_DAYS};
pub use ports::{AccountPaymentNotice, CashRegister, OverdueNotifier, PendingSale, PendingSales};
pub use statement::{summarize, CustomerPosition, StatementSummary};
