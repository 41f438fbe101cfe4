//! Core kernel for the POS backend
//!
//! This crate provides the shared building blocks used by every domain:
//! strongly-typed identifiers, monetary rounding over rust_decimal, a clock
//! abstraction for injectable time, and the common error/port types.

pub mod clock;
pub mod error;
pub mod identifiers;
pub mod money;
pub mod ports;

pub use clock::{Clock, SystemClock};
pub use error::CoreError;
pub use identifiers::{
    AccountId, CustomerId, MovementId, PaymentMethodId, SaleId, UserId,
};
pub use money::{percentage_of, round2};
pub use ports::{DomainPort, PortError};
