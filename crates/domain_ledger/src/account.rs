//! Customer account entity
//!
//! One account per customer, created lazily on first reference. The balance
//! is a signed decimal: positive means the customer owes the business,
//! negative means the business owes the customer, zero is settled.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, CustomerId};

/// Default grace period before a charge is considered overdue
pub const DEFAULT_PAYMENT_TERM_DAYS: i32 = 30;

/// Lifecycle state of a customer account
///
/// Accounts are never hard-deleted; `Closed` is the terminal soft state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    /// Account accepts charges and payments
    Active,
    /// Charges are blocked, usually after crossing the overdue threshold
    Suspended,
    /// Account retired by an administrator
    Closed,
}

/// A customer's current account (running balance plus credit policy)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerAccount {
    /// Unique identifier
    pub id: AccountId,
    /// Owning customer (1:1, unique at the store level)
    pub customer_id: CustomerId,
    /// Running balance; equals the `balance_after` of the latest movement
    pub balance: Decimal,
    /// Credit ceiling; zero means no limit is enforced
    pub credit_limit: Decimal,
    /// Lifecycle state
    pub status: AccountStatus,
    /// Days since the last charge, recomputed daily by the scheduler
    pub days_overdue: i32,
    /// Grace period before a charge counts as overdue
    pub payment_term_days: i32,
    /// When the customer last paid
    pub last_payment_date: Option<DateTime<Utc>>,
    /// When the customer last purchased on account
    pub last_purchase_date: Option<DateTime<Utc>>,
    /// When the account was created
    pub created_at: DateTime<Utc>,
    /// When the account was last modified
    pub updated_at: DateTime<Utc>,
}

impl CustomerAccount {
    /// A fresh account for a customer that has none yet
    pub fn open(customer_id: CustomerId, now: DateTime<Utc>) -> Self {
        Self {
            id: AccountId::new(),
            customer_id,
            balance: Decimal::ZERO,
            credit_limit: Decimal::ZERO,
            status: AccountStatus::Active,
            days_overdue: 0,
            payment_term_days: DEFAULT_PAYMENT_TERM_DAYS,
            last_payment_date: None,
            last_purchase_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if the customer currently owes the business
    pub fn has_debt(&self) -> bool {
        self.balance > Decimal::ZERO
    }

    /// Returns true if a credit ceiling is being enforced
    pub fn enforces_credit_limit(&self) -> bool {
        self.credit_limit > Decimal::ZERO
    }

    /// Returns true if the account is past the overdue threshold
    pub fn is_overdue(&self) -> bool {
        self.days_overdue > 0
    }
}

/// Field updates the engine applies to an account alongside a movement
///
/// Only the fields a particular operation touches are set; `None` leaves the
/// stored value alone. The scheduler uses the same shape for its
/// `days_overdue`/`status` writes, which never carry a balance.
#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
    pub balance: Option<Decimal>,
    pub status: Option<AccountStatus>,
    pub days_overdue: Option<i32>,
    pub last_payment_date: Option<DateTime<Utc>>,
    pub last_purchase_date: Option<DateTime<Utc>>,
}

impl AccountPatch {
    /// Applies the patch to an in-memory account, mirroring the SQL update
    pub fn apply(&self, account: &mut CustomerAccount, now: DateTime<Utc>) {
        if let Some(balance) = self.balance {
            account.balance = balance;
        }
        if let Some(status) = self.status {
            account.status = status;
        }
        if let Some(days) = self.days_overdue {
            account.days_overdue = days;
        }
        if let Some(date) = self.last_payment_date {
            account.last_payment_date = Some(date);
        }
        if let Some(date) = self.last_purchase_date {
            account.last_purchase_date = Some(date);
        }
        account.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_open_account_defaults() {
        let now = Utc::now();
        let account = CustomerAccount::open(CustomerId::new(), now);

        assert_eq!(account.balance, Decimal::ZERO);
        assert_eq!(account.credit_limit, Decimal::ZERO);
        assert_eq!(account.status, AccountStatus::Active);
        assert_eq!(account.days_overdue, 0);
        assert_eq!(account.payment_term_days, DEFAULT_PAYMENT_TERM_DAYS);
        assert!(account.last_payment_date.is_none());
    }

    #[test]
    fn test_patch_only_touches_set_fields() {
        let now = Utc::now();
        let mut account = CustomerAccount::open(CustomerId::new(), now);
        account.credit_limit = dec!(5000);

        let patch = AccountPatch {
            balance: Some(dec!(1200)),
            last_purchase_date: Some(now),
            ..Default::default()
        };
        patch.apply(&mut account, now);

        assert_eq!(account.balance, dec!(1200));
        assert_eq!(account.credit_limit, dec!(5000));
        assert_eq!(account.status, AccountStatus::Active);
        assert_eq!(account.last_purchase_date, Some(now));
        assert!(account.last_payment_date.is_none());
    }
}
