//! Repository implementations
//!
//! Repositories are the only writers of the account store and the movement
//! log. Methods that must participate in the engine's row-locked transaction
//! take a `&mut PgConnection`; pool-level convenience methods cover the
//! read side.

pub mod accounts;
pub mod movements;
