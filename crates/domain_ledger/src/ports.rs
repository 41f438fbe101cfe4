//! Ledger-facing collaborator ports
//!
//! The engine consumes three external collaborators: the cash register that
//! records incoming money, the sales backlog a charge sync reads from, and
//! the notifier that receives the monthly overdue report. All are ports so
//! tests swap in mocks and production wires Postgres or API adapters.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use core_kernel::{CustomerId, DomainPort, MovementId, PaymentMethodId, PortError, SaleId, UserId};

use crate::overdue::OverdueAlert;

/// Payment details forwarded to the cash register after a ledger payment
///
/// This notification is best-effort by design: the payment has already
/// committed when it is sent, and a failure here must never surface to the
/// caller.
#[derive(Debug, Clone)]
pub struct AccountPaymentNotice {
    /// The committed payment movement
    pub movement_id: MovementId,
    pub customer_id: CustomerId,
    /// Positive amount received
    pub amount: Decimal,
    pub payment_method_id: PaymentMethodId,
    /// Human description for the cash movement
    pub description: String,
    /// Who recorded the payment
    pub recorded_by: Option<UserId>,
}

/// Cash register collaborator
#[async_trait]
pub trait CashRegister: DomainPort {
    /// Records a current-account payment as a cash income
    async fn register_account_payment(&self, notice: AccountPaymentNotice)
        -> Result<(), PortError>;
}

/// A sale parked on the customer's account awaiting payment
#[derive(Debug, Clone)]
pub struct PendingSale {
    pub id: SaleId,
    /// Human sale number, e.g. "0001-00000042"
    pub number: String,
    /// Sale total, the amount a missing charge would carry
    pub total: Decimal,
    pub sale_date: DateTime<Utc>,
}

/// Source of a customer's pending on-account sales
#[async_trait]
pub trait PendingSales: DomainPort {
    /// Lists pending on-account sales, oldest first
    async fn pending_on_account(&self, customer_id: CustomerId)
        -> Result<Vec<PendingSale>, PortError>;

    /// Marks every pending on-account sale of the customer as settled
    ///
    /// Called after a payment clears the full debt. Returns the number of
    /// sales settled.
    async fn settle_for_customer(&self, customer_id: CustomerId) -> Result<u64, PortError>;
}

/// Receiver of the periodic overdue report
#[async_trait]
pub trait OverdueNotifier: DomainPort {
    /// Delivers the current overdue list; purely observational
    async fn notify_overdue(&self, alerts: &[OverdueAlert]) -> Result<(), PortError>;
}
