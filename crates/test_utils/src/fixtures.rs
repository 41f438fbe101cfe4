//! Pre-built test fixtures
//!
//! Deterministic amounts, instants, and customer records shared across the
//! suite. Randomized name generation goes through `fake` so log output in a
//! failing test still reads like real data.

use chrono::{DateTime, TimeZone, Utc};
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::CustomerId;
use domain_customers::{Customer, CustomerStatus};

/// Fixture amounts for ledger operations
pub struct AmountFixtures;

impl AmountFixtures {
    /// A typical sale charge
    pub fn charge() -> Decimal {
        dec!(1500.00)
    }

    /// A balance that exercises surcharge rounding (10% -> 100.03)
    pub fn rounding_balance() -> Decimal {
        dec!(1000.33)
    }

    /// A mid-sized credit limit
    pub fn credit_limit() -> Decimal {
        dec!(10000.00)
    }

    /// A partial payment against [`Self::charge`]
    pub fn partial_payment() -> Decimal {
        dec!(500.00)
    }
}

/// Fixture instants for overdue computations
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// The instant test accounts are opened
    pub fn account_opened() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    }

    /// A charge timestamp 10 days before [`Self::today`]
    pub fn recent_charge() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap()
    }

    /// A charge timestamp 45 days before [`Self::today`], past the threshold
    pub fn stale_charge() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 30, 14, 30, 0).unwrap()
    }

    /// "Now" for scheduler tests
    pub fn today() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 3, 0, 0).unwrap()
    }
}

/// Fixture customers
pub struct CustomerFixtures;

impl CustomerFixtures {
    /// A deterministic active customer
    pub fn ana_pereyra() -> Customer {
        Customer {
            id: CustomerId::new(),
            first_name: "Ana".to_string(),
            last_name: "Pereyra".to_string(),
            document_number: Some("30111222".to_string()),
            email: Some("ana.pereyra@example.com".to_string()),
            phone: Some("+54 11 4444-5555".to_string()),
            status: CustomerStatus::Active,
            created_at: TemporalFixtures::account_opened(),
        }
    }

    /// An active customer with a random plausible name
    pub fn random() -> Customer {
        Customer {
            id: CustomerId::new(),
            first_name: FirstName().fake(),
            last_name: LastName().fake(),
            document_number: None,
            email: None,
            phone: None,
            status: CustomerStatus::Active,
            created_at: TemporalFixtures::account_opened(),
        }
    }
}
