//! Test data builders
//!
//! Builder patterns for constructing ledger test data with sensible
//! defaults. Tests specify only the fields they care about.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use core_kernel::{AccountId, CustomerId, MovementId, PaymentMethodId};
use domain_ledger::{AccountMovement, AccountStatus, CustomerAccount, MovementType};

use crate::fixtures::TemporalFixtures;

/// Builder for customer accounts
pub struct TestAccountBuilder {
    customer_id: CustomerId,
    balance: Decimal,
    credit_limit: Decimal,
    status: AccountStatus,
    days_overdue: i32,
    created_at: DateTime<Utc>,
}

impl Default for TestAccountBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestAccountBuilder {
    /// Creates a builder for a settled, active account
    pub fn new() -> Self {
        Self {
            customer_id: CustomerId::new(),
            balance: Decimal::ZERO,
            credit_limit: Decimal::ZERO,
            status: AccountStatus::Active,
            days_overdue: 0,
            created_at: TemporalFixtures::account_opened(),
        }
    }

    /// Sets the owning customer
    pub fn with_customer_id(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = customer_id;
        self
    }

    /// Sets the balance
    pub fn with_balance(mut self, balance: Decimal) -> Self {
        self.balance = balance;
        self
    }

    /// Sets the credit limit
    pub fn with_credit_limit(mut self, credit_limit: Decimal) -> Self {
        self.credit_limit = credit_limit;
        self
    }

    /// Sets the status
    pub fn with_status(mut self, status: AccountStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the overdue day count
    pub fn with_days_overdue(mut self, days: i32) -> Self {
        self.days_overdue = days;
        self
    }

    /// Builds the account
    pub fn build(self) -> CustomerAccount {
        let mut account = CustomerAccount::open(self.customer_id, self.created_at);
        account.balance = self.balance;
        account.credit_limit = self.credit_limit;
        account.status = self.status;
        account.days_overdue = self.days_overdue;
        account
    }
}

/// Builder for account movements
pub struct TestMovementBuilder {
    account_id: AccountId,
    movement_type: MovementType,
    amount: Decimal,
    balance_before: Decimal,
    description: String,
    reference_type: Option<String>,
    reference_id: Option<Uuid>,
    payment_method_id: Option<PaymentMethodId>,
    created_at: DateTime<Utc>,
}

impl Default for TestMovementBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestMovementBuilder {
    /// Creates a builder for a $100 charge onto an empty account
    pub fn new() -> Self {
        Self {
            account_id: AccountId::new(),
            movement_type: MovementType::Charge,
            amount: dec!(100),
            balance_before: Decimal::ZERO,
            description: "Test charge".to_string(),
            reference_type: Some("manual".to_string()),
            reference_id: None,
            payment_method_id: None,
            created_at: TemporalFixtures::account_opened(),
        }
    }

    /// Sets the owning account
    pub fn with_account_id(mut self, account_id: AccountId) -> Self {
        self.account_id = account_id;
        self
    }

    /// Sets kind and signed amount in one step
    pub fn with_kind(mut self, movement_type: MovementType, amount: Decimal) -> Self {
        self.movement_type = movement_type;
        self.amount = amount;
        self
    }

    /// Sets the pre-movement balance snapshot
    pub fn with_balance_before(mut self, balance_before: Decimal) -> Self {
        self.balance_before = balance_before;
        self
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the payment method
    pub fn with_payment_method(mut self, payment_method_id: PaymentMethodId) -> Self {
        self.payment_method_id = Some(payment_method_id);
        self
    }

    /// Sets the creation timestamp
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Builds the movement; `balance_after` honours the snapshot invariant
    pub fn build(self) -> AccountMovement {
        AccountMovement {
            id: MovementId::new(),
            account_id: self.account_id,
            movement_type: self.movement_type,
            amount: self.amount,
            balance_before: self.balance_before,
            balance_after: self.balance_before + self.amount,
            description: self.description,
            reference_type: self.reference_type,
            reference_id: self.reference_id,
            payment_method_id: self.payment_method_id,
            notes: None,
            created_by: None,
            created_at: self.created_at,
        }
    }
}
