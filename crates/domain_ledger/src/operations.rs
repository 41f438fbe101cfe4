//! Ledger operation planning
//!
//! Each mutation operation is split in two: a pure *planning* function here
//! that validates a typed command against the row-locked account state and
//! produces the movement plus the account field updates, and the execution
//! in the application layer that persists both atomically. Keeping the rules
//! synchronous makes every invariant testable without a database.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{percentage_of, PaymentMethodId, SaleId};

use crate::account::{AccountPatch, AccountStatus, CustomerAccount};
use crate::error::LedgerError;
use crate::movement::{MovementDraft, MovementType};

/// Command to charge a sale (or manual debit) to the account
#[derive(Debug, Clone)]
pub struct ChargeCommand {
    /// Amount to add to the customer's debt; the sign is normalized away
    pub amount: Decimal,
    /// Short description, e.g. the sale number
    pub description: String,
    /// Originating sale, when the charge comes from one
    pub sale_id: Option<SaleId>,
    /// Free-form notes
    pub notes: Option<String>,
}

/// Command to record a customer payment
#[derive(Debug, Clone)]
pub struct PaymentCommand {
    /// Amount paid; must not exceed the outstanding debt
    pub amount: Decimal,
    /// How the customer paid
    pub payment_method_id: PaymentMethodId,
    /// Optional description; defaults to "Payment received"
    pub description: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
}

/// How a surcharge is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurchargeKind {
    /// Percentage of the outstanding balance, rounded to two decimals
    Percentage,
    /// Flat amount
    Fixed,
}

/// Command to apply a late-payment surcharge
#[derive(Debug, Clone)]
pub struct SurchargeCommand {
    pub kind: SurchargeKind,
    /// Percentage value (e.g. `10` for 10%) or the flat amount
    pub value: Decimal,
    /// Optional description override
    pub description: Option<String>,
}

/// Command for an administrative balance adjustment
///
/// Unlike charges, the amount is applied exactly as signed: positive
/// increases the debt, negative decreases it. Adjustments bypass the
/// credit-limit and suspension gates on purpose; they are the override path.
#[derive(Debug, Clone)]
pub struct AdjustmentCommand {
    pub amount: Decimal,
    pub description: String,
    pub reference_type: Option<String>,
    pub reference_id: Option<Uuid>,
    pub notes: Option<String>,
}

/// The atomic write an operation resolved to
#[derive(Debug, Clone)]
pub struct LedgerUpdate {
    /// Movement to append to the log
    pub movement: MovementDraft,
    /// Account fields to update in the same transaction
    pub account: AccountPatch,
}

impl LedgerUpdate {
    /// Returns true if this update settles the account in full
    pub fn clears_debt(&self) -> bool {
        self.movement.balance_after == Decimal::ZERO
    }
}

/// Plans a charge against the locked account state
///
/// Negative input amounts are silently corrected to their absolute value.
/// Reaching the credit limit exactly is allowed; exceeding it by any amount
/// is rejected.
///
/// # Errors
///
/// - [`LedgerError::AccountSuspended`] when the account is suspended
/// - [`LedgerError::CreditLimitExceeded`] when a nonzero limit would be passed
pub fn plan_charge(
    account: &CustomerAccount,
    cmd: &ChargeCommand,
    now: DateTime<Utc>,
) -> Result<LedgerUpdate, LedgerError> {
    if account.status == AccountStatus::Suspended {
        return Err(LedgerError::AccountSuspended);
    }

    let amount = cmd.amount.abs();

    if account.enforces_credit_limit() && account.balance + amount > account.credit_limit {
        return Err(LedgerError::CreditLimitExceeded {
            limit: account.credit_limit,
            balance: account.balance,
        });
    }

    let balance_after = account.balance + amount;
    let reference_type = if cmd.sale_id.is_some() { "sale" } else { "manual" };

    Ok(LedgerUpdate {
        movement: MovementDraft {
            movement_type: MovementType::Charge,
            amount,
            balance_before: account.balance,
            balance_after,
            description: cmd.description.clone(),
            reference_type: Some(reference_type.to_string()),
            reference_id: cmd.sale_id.map(Into::into),
            payment_method_id: None,
            notes: cmd.notes.clone(),
        },
        account: AccountPatch {
            balance: Some(balance_after),
            last_purchase_date: Some(now),
            ..Default::default()
        },
    })
}

/// Plans a customer payment against the locked account state
///
/// A payment that settles the debt in full resets `days_overdue` and
/// reactivates a suspended account.
///
/// # Errors
///
/// - [`LedgerError::NoPendingDebt`] when the balance is zero or negative
/// - [`LedgerError::PaymentExceedsDebt`] when the amount is above the balance
pub fn plan_payment(
    account: &CustomerAccount,
    cmd: &PaymentCommand,
    now: DateTime<Utc>,
) -> Result<LedgerUpdate, LedgerError> {
    if !account.has_debt() {
        return Err(LedgerError::NoPendingDebt);
    }

    let amount = cmd.amount.abs();

    if amount > account.balance {
        return Err(LedgerError::PaymentExceedsDebt {
            amount,
            balance: account.balance,
        });
    }

    let balance_after = account.balance - amount;
    let settles = balance_after == Decimal::ZERO;

    let mut patch = AccountPatch {
        balance: Some(balance_after),
        last_payment_date: Some(now),
        ..Default::default()
    };
    if settles {
        patch.days_overdue = Some(0);
        if account.status == AccountStatus::Suspended {
            patch.status = Some(AccountStatus::Active);
        }
    }

    Ok(LedgerUpdate {
        movement: MovementDraft {
            movement_type: MovementType::Payment,
            amount: -amount,
            balance_before: account.balance,
            balance_after,
            description: cmd
                .description
                .clone()
                .unwrap_or_else(|| "Payment received".to_string()),
            reference_type: Some("payment".to_string()),
            reference_id: None,
            payment_method_id: Some(cmd.payment_method_id),
            notes: cmd.notes.clone(),
        },
        account: patch,
    })
}

/// Plans a late-payment surcharge against the locked account state
///
/// Percentage surcharges are computed over the current balance and rounded
/// half-up to two decimals; fixed surcharges apply the value as given.
///
/// # Errors
///
/// - [`LedgerError::NoDebtToSurcharge`] when the balance is zero or negative
pub fn plan_surcharge(
    account: &CustomerAccount,
    cmd: &SurchargeCommand,
) -> Result<LedgerUpdate, LedgerError> {
    if !account.has_debt() {
        return Err(LedgerError::NoDebtToSurcharge);
    }

    let (amount, description, notes) = match cmd.kind {
        SurchargeKind::Percentage => (
            percentage_of(account.balance, cmd.value),
            cmd.description
                .clone()
                .unwrap_or_else(|| format!("Late payment surcharge ({}%)", cmd.value)),
            format!(
                "Percentage applied: {}% over a balance of ${}",
                cmd.value, account.balance
            ),
        ),
        SurchargeKind::Fixed => (
            cmd.value,
            cmd.description
                .clone()
                .unwrap_or_else(|| format!("Late payment surcharge (${})", cmd.value)),
            "Fixed amount applied".to_string(),
        ),
    };

    let balance_after = account.balance + amount;

    Ok(LedgerUpdate {
        movement: MovementDraft {
            movement_type: MovementType::Interest,
            amount,
            balance_before: account.balance,
            balance_after,
            description,
            reference_type: Some("surcharge".to_string()),
            reference_id: None,
            payment_method_id: None,
            notes: Some(notes),
        },
        account: AccountPatch {
            balance: Some(balance_after),
            ..Default::default()
        },
    })
}

/// Plans an administrative adjustment against the locked account state
///
/// The amount is applied exactly as signed and no business gate applies.
pub fn plan_adjustment(account: &CustomerAccount, cmd: &AdjustmentCommand) -> LedgerUpdate {
    let balance_after = account.balance + cmd.amount;

    LedgerUpdate {
        movement: MovementDraft {
            movement_type: MovementType::Adjustment,
            amount: cmd.amount,
            balance_before: account.balance,
            balance_after,
            description: cmd.description.clone(),
            reference_type: Some(
                cmd.reference_type
                    .clone()
                    .unwrap_or_else(|| "manual".to_string()),
            ),
            reference_id: cmd.reference_id,
            payment_method_id: None,
            notes: cmd.notes.clone(),
        },
        account: AccountPatch {
            balance: Some(balance_after),
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn account_with_balance(balance: Decimal) -> CustomerAccount {
        let mut account = CustomerAccount::open(core_kernel::CustomerId::new(), Utc::now());
        account.balance = balance;
        account
    }

    fn charge(amount: Decimal) -> ChargeCommand {
        ChargeCommand {
            amount,
            description: "Sale #1".to_string(),
            sale_id: None,
            notes: None,
        }
    }

    fn payment(amount: Decimal) -> PaymentCommand {
        PaymentCommand {
            amount,
            payment_method_id: PaymentMethodId::new(),
            description: None,
            notes: None,
        }
    }

    #[test]
    fn test_charge_on_fresh_account() {
        let account = account_with_balance(Decimal::ZERO);
        let update = plan_charge(&account, &charge(dec!(1500)), Utc::now()).unwrap();

        assert_eq!(update.movement.movement_type, MovementType::Charge);
        assert_eq!(update.movement.amount, dec!(1500));
        assert_eq!(update.movement.balance_before, Decimal::ZERO);
        assert_eq!(update.movement.balance_after, dec!(1500));
        assert_eq!(update.movement.reference_type.as_deref(), Some("manual"));
        assert_eq!(update.account.balance, Some(dec!(1500)));
        assert!(update.account.last_purchase_date.is_some());
    }

    #[test]
    fn test_charge_normalizes_negative_amounts() {
        let account = account_with_balance(dec!(100));
        let update = plan_charge(&account, &charge(dec!(-250)), Utc::now()).unwrap();
        assert_eq!(update.movement.amount, dec!(250));
        assert_eq!(update.movement.balance_after, dec!(350));
    }

    #[test]
    fn test_charge_rejected_over_credit_limit() {
        let mut account = account_with_balance(dec!(8000));
        account.credit_limit = dec!(10000);

        let err = plan_charge(&account, &charge(dec!(3000)), Utc::now()).unwrap_err();
        assert_eq!(
            err,
            LedgerError::CreditLimitExceeded {
                limit: dec!(10000),
                balance: dec!(8000),
            }
        );
    }

    #[test]
    fn test_charge_to_exactly_the_limit_is_allowed() {
        let mut account = account_with_balance(dec!(8000));
        account.credit_limit = dec!(10000);

        let update = plan_charge(&account, &charge(dec!(2000)), Utc::now()).unwrap();
        assert_eq!(update.movement.balance_after, dec!(10000));

        let err = plan_charge(&account, &charge(dec!(2000.01)), Utc::now()).unwrap_err();
        assert!(matches!(err, LedgerError::CreditLimitExceeded { .. }));
    }

    #[test]
    fn test_charge_rejected_when_suspended() {
        let mut account = account_with_balance(dec!(100));
        account.status = AccountStatus::Suspended;

        let err = plan_charge(&account, &charge(dec!(1)), Utc::now()).unwrap_err();
        assert_eq!(err, LedgerError::AccountSuspended);
    }

    #[test]
    fn test_zero_credit_limit_is_unenforced() {
        let account = account_with_balance(dec!(1_000_000));
        assert!(plan_charge(&account, &charge(dec!(1_000_000)), Utc::now()).is_ok());
    }

    #[test]
    fn test_full_payment_settles_and_reactivates() {
        let mut account = account_with_balance(dec!(5000));
        account.status = AccountStatus::Suspended;
        account.days_overdue = 42;

        let update = plan_payment(&account, &payment(dec!(5000)), Utc::now()).unwrap();

        assert_eq!(update.movement.amount, dec!(-5000));
        assert_eq!(update.movement.balance_after, Decimal::ZERO);
        assert!(update.clears_debt());
        assert_eq!(update.account.days_overdue, Some(0));
        assert_eq!(update.account.status, Some(AccountStatus::Active));
        assert!(update.account.last_payment_date.is_some());
    }

    #[test]
    fn test_partial_payment_keeps_status() {
        let mut account = account_with_balance(dec!(5000));
        account.status = AccountStatus::Suspended;

        let update = plan_payment(&account, &payment(dec!(2000)), Utc::now()).unwrap();

        assert_eq!(update.movement.balance_after, dec!(3000));
        assert!(!update.clears_debt());
        assert!(update.account.status.is_none());
        assert!(update.account.days_overdue.is_none());
    }

    #[test]
    fn test_payment_without_debt_rejected() {
        let account = account_with_balance(Decimal::ZERO);
        let err = plan_payment(&account, &payment(dec!(1)), Utc::now()).unwrap_err();
        assert_eq!(err, LedgerError::NoPendingDebt);
    }

    #[test]
    fn test_payment_exceeding_debt_rejected() {
        let account = account_with_balance(dec!(100));
        let err = plan_payment(&account, &payment(dec!(100.01)), Utc::now()).unwrap_err();
        assert!(matches!(err, LedgerError::PaymentExceedsDebt { .. }));
    }

    #[test]
    fn test_percentage_surcharge_rounds_half_up() {
        let account = account_with_balance(dec!(1000.33));
        let cmd = SurchargeCommand {
            kind: SurchargeKind::Percentage,
            value: dec!(10),
            description: None,
        };

        let update = plan_surcharge(&account, &cmd).unwrap();

        // 1000.33 * 10% = 100.033, rounded to 100.03
        assert_eq!(update.movement.amount, dec!(100.03));
        assert_eq!(update.movement.balance_after, dec!(1100.36));
        assert_eq!(update.movement.movement_type, MovementType::Interest);
        assert_eq!(update.movement.reference_type.as_deref(), Some("surcharge"));
    }

    #[test]
    fn test_fixed_surcharge_applies_value() {
        let account = account_with_balance(dec!(500));
        let cmd = SurchargeCommand {
            kind: SurchargeKind::Fixed,
            value: dec!(75.50),
            description: Some("Agreed penalty".to_string()),
        };

        let update = plan_surcharge(&account, &cmd).unwrap();
        assert_eq!(update.movement.amount, dec!(75.50));
        assert_eq!(update.movement.description, "Agreed penalty");
    }

    #[test]
    fn test_surcharge_without_debt_rejected() {
        let account = account_with_balance(Decimal::ZERO);
        let cmd = SurchargeCommand {
            kind: SurchargeKind::Fixed,
            value: dec!(10),
            description: None,
        };
        assert_eq!(plan_surcharge(&account, &cmd).unwrap_err(), LedgerError::NoDebtToSurcharge);
    }

    #[test]
    fn test_adjustment_preserves_sign() {
        let account = account_with_balance(dec!(300));
        let cmd = AdjustmentCommand {
            amount: dec!(-120),
            description: "Returned goods".to_string(),
            reference_type: None,
            reference_id: None,
            notes: None,
        };

        let update = plan_adjustment(&account, &cmd);
        assert_eq!(update.movement.amount, dec!(-120));
        assert_eq!(update.movement.balance_after, dec!(180));
        assert_eq!(update.movement.reference_type.as_deref(), Some("manual"));
    }

    #[test]
    fn test_adjustment_ignores_suspension_and_limit() {
        let mut account = account_with_balance(dec!(900));
        account.status = AccountStatus::Suspended;
        account.credit_limit = dec!(1000);

        let cmd = AdjustmentCommand {
            amount: dec!(500),
            description: "Migration correction".to_string(),
            reference_type: Some("migration".to_string()),
            reference_id: None,
            notes: None,
        };

        let update = plan_adjustment(&account, &cmd);
        assert_eq!(update.movement.balance_after, dec!(1400));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    proptest! {
        #[test]
        fn charge_plans_keep_the_snapshot_invariant(
            balance in 0i64..1_000_000_00,
            amount in 1i64..1_000_000_00
        ) {
            let account = {
                let mut a = CustomerAccount::open(core_kernel::CustomerId::new(), Utc::now());
                a.balance = Decimal::new(balance, 2);
                a
            };
            let cmd = ChargeCommand {
                amount: Decimal::new(amount, 2),
                description: "prop".to_string(),
                sale_id: None,
                notes: None,
            };

            let update = plan_charge(&account, &cmd, Utc::now()).unwrap();
            prop_assert_eq!(
                update.movement.balance_after,
                update.movement.balance_before + update.movement.amount
            );
            prop_assert_eq!(update.account.balance, Some(update.movement.balance_after));
        }

        #[test]
        fn payment_plans_never_overdraw(
            balance in 1i64..1_000_000_00,
            amount in 1i64..1_000_000_00
        ) {
            let account = {
                let mut a = CustomerAccount::open(core_kernel::CustomerId::new(), Utc::now());
                a.balance = Decimal::new(balance, 2);
                a
            };
            let cmd = PaymentCommand {
                amount: Decimal::new(amount, 2),
                payment_method_id: PaymentMethodId::new(),
                description: None,
                notes: None,
            };

            match plan_payment(&account, &cmd, Utc::now()) {
                Ok(update) => {
                    prop_assert!(update.movement.balance_after >= Decimal::ZERO);
                    prop_assert_eq!(
                        update.movement.balance_after,
                        update.movement.balance_before + update.movement.amount
                    );
                }
                Err(err) => {
                    let is_expected = matches!(err, LedgerError::PaymentExceedsDebt { .. });
                    prop_assert!(is_expected);
                }
            }
        }
    }
}
