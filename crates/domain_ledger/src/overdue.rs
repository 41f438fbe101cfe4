//! Overdue policy
//!
//! Days overdue count from the most recent charge, not from the invoice due
//! date: a customer that keeps buying keeps resetting the clock. Crossing
//! the threshold suspends an active account; only a full payment (or an
//! administrator) reactivates it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{clock::whole_days_between, CustomerId};

use crate::account::AccountStatus;

/// Days since the last charge after which an active account is suspended
pub const SUSPENSION_THRESHOLD_DAYS: i64 = 30;

/// Whole days elapsed since the last charge, clamped at zero
pub fn whole_days_overdue(last_charge_at: DateTime<Utc>, now: DateTime<Utc>) -> i32 {
    whole_days_between(last_charge_at, now).max(0) as i32
}

/// Decides the status transition for a recomputed overdue count
///
/// Returns `Some(Suspended)` only for active accounts past the threshold;
/// suspended and closed accounts are left alone.
pub fn overdue_transition(days_overdue: i32, status: AccountStatus) -> Option<AccountStatus> {
    if i64::from(days_overdue) > SUSPENSION_THRESHOLD_DAYS && status == AccountStatus::Active {
        Some(AccountStatus::Suspended)
    } else {
        None
    }
}

/// One row in the monthly overdue report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverdueAlert {
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub balance: Decimal,
    pub days_overdue: i32,
    pub last_payment_date: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_days_overdue_floor() {
        let charge = Utc.with_ymd_and_hms(2024, 5, 1, 15, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 8, 14, 59, 0).unwrap();
        assert_eq!(whole_days_overdue(charge, now), 6);

        let now = Utc.with_ymd_and_hms(2024, 5, 8, 15, 0, 0).unwrap();
        assert_eq!(whole_days_overdue(charge, now), 7);
    }

    #[test]
    fn test_days_overdue_never_negative() {
        let charge = Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 9, 0, 0, 0).unwrap();
        assert_eq!(whole_days_overdue(charge, now), 0);
    }

    #[test]
    fn test_transition_at_threshold() {
        // Exactly 30 days is still fine, 31 suspends
        assert_eq!(overdue_transition(30, AccountStatus::Active), None);
        assert_eq!(
            overdue_transition(31, AccountStatus::Active),
            Some(AccountStatus::Suspended)
        );
    }

    #[test]
    fn test_transition_only_for_active_accounts() {
        assert_eq!(overdue_transition(90, AccountStatus::Suspended), None);
        assert_eq!(overdue_transition(90, AccountStatus::Closed), None);
    }
}
