//! Movement log repository
//!
//! The movement log is append-only: rows are inserted inside the engine's
//! transaction and never updated or deleted afterwards. Everything else in
//! this module is read-side.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use domain_ledger::movement::{AccountMovement, MovementDraft};

use crate::error::DatabaseError;

const MOVEMENT_COLUMNS: &str = "id, account_id, movement_type, amount, balance_before, \
     balance_after, description, reference_type, reference_id, payment_method_id, notes, \
     created_by, created_at";

/// Repository for the append-only movement log
#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: PgPool,
}

impl MovementRepository {
    /// Creates a new MovementRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Appends a planned movement on the engine's transaction connection
    pub async fn insert(
        conn: &mut PgConnection,
        account_id: Uuid,
        draft: &MovementDraft,
        created_by: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<MovementRow, DatabaseError> {
        let row = sqlx::query_as::<_, MovementRow>(&format!(
            "INSERT INTO account_movements (\
                account_id, movement_type, amount, balance_before, balance_after, \
                description, reference_type, reference_id, payment_method_id, notes, \
                created_by, created_at\
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {MOVEMENT_COLUMNS}"
        ))
        .bind(account_id)
        .bind(MovementType::from(draft.movement_type))
        .bind(draft.amount)
        .bind(draft.balance_before)
        .bind(draft.balance_after)
        .bind(&draft.description)
        .bind(&draft.reference_type)
        .bind(draft.reference_id)
        .bind(draft.payment_method_id.map(Uuid::from))
        .bind(&draft.notes)
        .bind(created_by)
        .bind(now)
        .fetch_one(conn)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(row)
    }

    /// Full movement history of an account, newest first
    pub async fn history(&self, account_id: Uuid) -> Result<Vec<MovementRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, MovementRow>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM account_movements \
             WHERE account_id = $1 \
             ORDER BY created_at DESC"
        ))
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(rows)
    }

    /// Timestamp of the most recent charge, if the account has any
    ///
    /// The overdue scheduler counts days from this instant.
    pub async fn last_charge_at(
        &self,
        account_id: Uuid,
    ) -> Result<Option<DateTime<Utc>>, DatabaseError> {
        let row: Option<(DateTime<Utc>,)> = sqlx::query_as(
            "SELECT created_at FROM account_movements \
             WHERE account_id = $1 AND movement_type = 'charge' \
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(row.map(|(created_at,)| created_at))
    }

    /// Sale ids that already have a charge movement on this account
    ///
    /// Used by the missing-charge sync to skip sales that were registered.
    pub async fn charged_sale_ids(&self, account_id: Uuid) -> Result<Vec<Uuid>, DatabaseError> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            "SELECT reference_id FROM account_movements \
             WHERE account_id = $1 \
               AND movement_type = 'charge' \
               AND reference_type = 'sale' \
               AND reference_id IS NOT NULL",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}

// ============================================================================
// Type definitions
// ============================================================================

/// Movement type as stored in Postgres
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "movement_type", rename_all = "snake_case")]
pub enum MovementType {
    Charge,
    Payment,
    Adjustment,
    Discount,
    Interest,
}

impl From<domain_ledger::MovementType> for MovementType {
    fn from(movement_type: domain_ledger::MovementType) -> Self {
        match movement_type {
            domain_ledger::MovementType::Charge => MovementType::Charge,
            domain_ledger::MovementType::Payment => MovementType::Payment,
            domain_ledger::MovementType::Adjustment => MovementType::Adjustment,
            domain_ledger::MovementType::Discount => MovementType::Discount,
            domain_ledger::MovementType::Interest => MovementType::Interest,
        }
    }
}

impl From<MovementType> for domain_ledger::MovementType {
    fn from(movement_type: MovementType) -> Self {
        match movement_type {
            MovementType::Charge => domain_ledger::MovementType::Charge,
            MovementType::Payment => domain_ledger::MovementType::Payment,
            MovementType::Adjustment => domain_ledger::MovementType::Adjustment,
            MovementType::Discount => domain_ledger::MovementType::Discount,
            MovementType::Interest => domain_ledger::MovementType::Interest,
        }
    }
}

/// Database row for an account movement
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MovementRow {
    pub id: Uuid,
    pub account_id: Uuid,
    pub movement_type: MovementType,
    pub amount: Decimal,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub description: String,
    pub reference_type: Option<String>,
    pub reference_id: Option<Uuid>,
    pub payment_method_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl MovementRow {
    /// Converts the row into the domain entity
    pub fn into_domain(self) -> AccountMovement {
        AccountMovement {
            id: self.id.into(),
            account_id: self.account_id.into(),
            movement_type: self.movement_type.into(),
            amount: self.amount,
            balance_before: self.balance_before,
            balance_after: self.balance_after,
            description: self.description,
            reference_type: self.reference_type,
            reference_id: self.reference_id,
            payment_method_id: self.payment_method_id.map(Into::into),
            notes: self.notes,
            created_by: self.created_by.map(Into::into),
            created_at: self.created_at,
        }
    }
}
