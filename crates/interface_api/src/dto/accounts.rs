//! Account endpoint DTOs

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use app_ledger::UpdateAccount;
use domain_ledger::{
    AccountStatus, AdjustmentCommand, ChargeCommand, PaymentCommand, SurchargeCommand,
    SurchargeKind,
};

fn positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount > Decimal::ZERO {
        Ok(())
    } else {
        Err(ValidationError::new("amount_must_be_positive"))
    }
}

fn non_negative_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount >= Decimal::ZERO {
        Ok(())
    } else {
        Err(ValidationError::new("amount_must_not_be_negative"))
    }
}

fn nonzero_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_zero() {
        Err(ValidationError::new("amount_must_not_be_zero"))
    } else {
        Ok(())
    }
}

/// Body for `POST /accounts/:customer_id/charges`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateChargeRequest {
    #[validate(custom(function = "positive_amount"))]
    pub amount: Decimal,
    #[validate(length(min = 1, max = 200))]
    pub description: String,
    pub sale_id: Option<Uuid>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

impl CreateChargeRequest {
    pub fn into_command(self) -> ChargeCommand {
        ChargeCommand {
            amount: self.amount,
            description: self.description,
            sale_id: self.sale_id.map(Into::into),
            notes: self.notes,
        }
    }
}

/// Body for `POST /accounts/:customer_id/payments`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePaymentRequest {
    #[validate(custom(function = "positive_amount"))]
    pub amount: Decimal,
    pub payment_method_id: Uuid,
    #[validate(length(max = 200))]
    pub description: Option<String>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

impl CreatePaymentRequest {
    pub fn into_command(self) -> PaymentCommand {
        PaymentCommand {
            amount: self.amount,
            payment_method_id: self.payment_method_id.into(),
            description: self.description,
            notes: self.notes,
        }
    }
}

/// Body for `POST /accounts/:customer_id/surcharges`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ApplySurchargeRequest {
    pub surcharge_type: SurchargeKind,
    #[validate(custom(function = "positive_amount"))]
    pub value: Decimal,
    #[validate(length(max = 200))]
    pub description: Option<String>,
}

impl ApplySurchargeRequest {
    pub fn into_command(self) -> SurchargeCommand {
        SurchargeCommand {
            kind: self.surcharge_type,
            value: self.value,
            description: self.description,
        }
    }
}

/// Body for `POST /accounts/:customer_id/adjustments`
///
/// The amount keeps its sign: positive increases the customer's debt,
/// negative decreases it.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAdjustmentRequest {
    #[validate(custom(function = "nonzero_amount"))]
    pub amount: Decimal,
    #[validate(length(min = 1, max = 200))]
    pub description: String,
    #[validate(length(max = 50))]
    pub reference_type: Option<String>,
    pub reference_id: Option<Uuid>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

impl CreateAdjustmentRequest {
    pub fn into_command(self) -> AdjustmentCommand {
        AdjustmentCommand {
            amount: self.amount,
            description: self.description,
            reference_type: self.reference_type,
            reference_id: self.reference_id,
            notes: self.notes,
        }
    }
}

/// Body for `PATCH /accounts/:customer_id`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateAccountRequest {
    #[validate(custom(function = "non_negative_amount"))]
    pub credit_limit: Option<Decimal>,
    pub status: Option<AccountStatus>,
}

impl UpdateAccountRequest {
    pub fn into_update(self) -> UpdateAccount {
        UpdateAccount {
            credit_limit: self.credit_limit,
            status: self.status,
        }
    }
}
