//! Account movement entity
//!
//! Movements are the append-only audit trail of an account. Each row carries
//! a pre/post balance snapshot so the running balance is derivable by replay
//! and every historical statement stays reproducible.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{AccountId, MovementId, PaymentMethodId, UserId};

/// Kind of ledger movement
///
/// Sign convention: positive amounts (charge, interest) increase customer
/// debt; negative amounts (payment, discount) decrease it. Adjustments may
/// carry either sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// Sale on credit
    Charge,
    /// Customer payment
    Payment,
    /// Manual administrative correction, either sign
    Adjustment,
    /// Goodwill discount
    Discount,
    /// Late-payment surcharge
    Interest,
}

/// One signed entry in an account's movement log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountMovement {
    /// Unique identifier
    pub id: MovementId,
    /// Owning account
    pub account_id: AccountId,
    /// Movement kind
    pub movement_type: MovementType,
    /// Signed amount
    pub amount: Decimal,
    /// Balance snapshot before applying the amount
    pub balance_before: Decimal,
    /// Balance snapshot after applying the amount
    pub balance_after: Decimal,
    /// Short human description
    pub description: String,
    /// Kind of the originating entity ("sale", "payment", "surcharge", "manual")
    pub reference_type: Option<String>,
    /// Identifier of the originating entity
    pub reference_id: Option<Uuid>,
    /// How the customer paid; set only on payment movements
    pub payment_method_id: Option<PaymentMethodId>,
    /// Free-form notes
    pub notes: Option<String>,
    /// Who recorded the movement
    pub created_by: Option<UserId>,
    /// Immutable creation timestamp
    pub created_at: DateTime<Utc>,
}

impl AccountMovement {
    /// Checks the per-row snapshot invariant
    pub fn is_consistent(&self) -> bool {
        self.balance_after == self.balance_before + self.amount
    }
}

/// A movement the engine is about to persist
///
/// Produced by the planning functions in [`crate::operations`]; the id and
/// creation timestamp are assigned at insert time.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementDraft {
    pub movement_type: MovementType,
    pub amount: Decimal,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub description: String,
    pub reference_type: Option<String>,
    pub reference_id: Option<Uuid>,
    pub payment_method_id: Option<PaymentMethodId>,
    pub notes: Option<String>,
}

/// Verifies chain continuity over movements ordered oldest-first
///
/// Row *n*'s `balance_before` must equal row *n-1*'s `balance_after`, and
/// every row must satisfy its own snapshot invariant.
pub fn chain_is_continuous(movements: &[AccountMovement]) -> bool {
    movements.windows(2).all(|pair| {
        pair[1].balance_before == pair[0].balance_after
    }) && movements.iter().all(AccountMovement::is_consistent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn movement(before: Decimal, amount: Decimal) -> AccountMovement {
        AccountMovement {
            id: MovementId::new(),
            account_id: AccountId::new(),
            movement_type: if amount >= Decimal::ZERO {
                MovementType::Charge
            } else {
                MovementType::Payment
            },
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
    fn test_snapshot_invariant() {
        let m = movement(dec!(100), dec!(-40));
        assert!(m.is_consistent());
        assert_eq!(m.balance_after, dec!(60));
    }

    #[test]
    fn test_chain_continuity() {
        let chain = vec![
            movement(dec!(0), dec!(1500)),
            movement(dec!(1500), dec!(-500)),
            movement(dec!(1000), dec!(250)),
        ];
        assert!(chain_is_continuous(&chain));
    }

    #[test]
    fn test_broken_chain_detected() {
        let chain = vec![movement(dec!(0), dec!(1500)), movement(dec!(1400), dec!(-500))];
        assert!(!chain_is_continuous(&chain));
    }
}
