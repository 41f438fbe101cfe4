//! Customer record as seen by the ledger
//!
//! Customer CRUD lives in the directory service that owns the records; the
//! ledger only needs the identity and display fields it joins onto accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::CustomerId;

/// Whether the customer record is usable for new business
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerStatus {
    Active,
    Archived,
}

/// A customer as exposed by the directory
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Customer {
    /// Unique identifier
    pub id: CustomerId,
    /// Given name
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    /// Family name
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    /// Tax or national document number, unique within the directory
    #[validate(length(max = 20))]
    pub document_number: Option<String>,
    /// Contact email, unique within the directory
    #[validate(email)]
    pub email: Option<String>,
    /// Contact phone
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    /// Record status
    pub status: CustomerStatus,
    /// When the record was created
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Full display name used on statements and alerts
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Returns true if the record can back new account activity
    pub fn is_active(&self) -> bool {
        self.status == CustomerStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Customer {
        Customer {
            id: CustomerId::new(),
            first_name: "Ana".to_string(),
            last_name: "Pereyra".to_string(),
            document_number: Some("30111222".to_string()),
            email: Some("ana@example.com".to_string()),
            phone: None,
            status: CustomerStatus::Active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_full_name() {
        assert_eq!(sample().full_name(), "Ana Pereyra");
    }

    #[test]
    fn test_validate_rejects_bad_email() {
        let mut customer = sample();
        customer.email = Some("not-an-email".to_string());
        assert!(customer.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_sample() {
        assert!(sample().validate().is_ok());
    }
}
