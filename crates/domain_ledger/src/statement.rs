//! Account statement summary
//!
//! Read-side roll-up of an account's movement history. Pure; the query
//! facade feeds it the rows it loaded.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::movement::{AccountMovement, MovementType};

/// Who owes whom, derived from the balance sign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerPosition {
    /// Positive balance: the customer owes the business
    CustomerOwes,
    /// Negative balance: the business owes the customer
    BusinessOwes,
    /// Zero balance
    Settled,
}

impl CustomerPosition {
    /// Classifies a balance
    pub fn from_balance(balance: Decimal) -> Self {
        if balance > Decimal::ZERO {
            CustomerPosition::CustomerOwes
        } else if balance < Decimal::ZERO {
            CustomerPosition::BusinessOwes
        } else {
            CustomerPosition::Settled
        }
    }
}

/// Totals shown at the top of an account statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementSummary {
    /// Sum of all charge amounts
    pub total_charges: Decimal,
    /// Sum of all payment amounts, as a positive figure
    pub total_payments: Decimal,
    /// The account's running balance
    pub current_balance: Decimal,
    /// Who owes whom
    pub customer_position: CustomerPosition,
}

/// Builds the statement summary from the movement history
pub fn summarize(balance: Decimal, movements: &[AccountMovement]) -> StatementSummary {
    let total_charges = movements
        .iter()
        .filter(|m| m.movement_type == MovementType::Charge)
        .map(|m| m.amount)
        .sum();

    let total_payments = movements
        .iter()
        .filter(|m| m.movement_type == MovementType::Payment)
        .map(|m| m.amount.abs())
        .sum();

    StatementSummary {
        total_charges,
        total_payments,
        current_balance: balance,
        customer_position: CustomerPosition::from_balance(balance),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use core_kernel::{AccountId, MovementId};
    use rust_decimal_macros::dec;

    fn movement(movement_type: MovementType, before: Decimal, amount: Decimal) -> AccountMovement {
        AccountMovement {
            id: MovementId::new(),
            account_id: AccountId::new(),
            movement_type,
            amount,
            balance_before: before,
            balance_after: before + amount,
            description: "test".to_string(),
            reference_type: None,
            reference_id: None,
            payment_method_id: None,
            notes: None,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_totals() {
        let movements = vec![
            movement(MovementType::Charge, dec!(0), dec!(1500)),
            movement(MovementType::Charge, dec!(1500), dec!(800)),
            movement(MovementType::Payment, dec!(2300), dec!(-1000)),
            movement(MovementType::Interest, dec!(1300), dec!(130)),
        ];

        let summary = summarize(dec!(1430), &movements);

        assert_eq!(summary.total_charges, dec!(2300));
        assert_eq!(summary.total_payments, dec!(1000));
        assert_eq!(summary.current_balance, dec!(1430));
        assert_eq!(summary.customer_position, CustomerPosition::CustomerOwes);
    }

    #[test]
    fn test_summary_is_idempotent() {
        let movements = vec![movement(MovementType::Charge, dec!(0), dec!(100))];
        let first = summarize(dec!(100), &movements);
        let second = summarize(dec!(100), &movements);
        assert_eq!(first, second);
    }

    #[test]
    fn test_position_classification() {
        assert_eq!(CustomerPosition::from_balance(dec!(0.01)), CustomerPosition::CustomerOwes);
        assert_eq!(CustomerPosition::from_balance(dec!(-10)), CustomerPosition::BusinessOwes);
        assert_eq!(CustomerPosition::from_balance(Decimal::ZERO), CustomerPosition::Settled);
    }
}
