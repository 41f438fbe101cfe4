//! Account store repository
//!
//! One row per customer with a unique index on `customer_id`. The ledger
//! engine serializes per-account mutations through [`AccountRepository::lock_by_customer`],
//! which issues a `SELECT ... FOR UPDATE`: a second concurrent operation on
//! the same customer blocks until the first transaction commits, then
//! observes the updated balance.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use domain_ledger::account::{AccountPatch, CustomerAccount};

use crate::error::DatabaseError;

const ACCOUNT_COLUMNS: &str = "id, customer_id, balance, credit_limit, status, days_overdue, \
     payment_term_days, last_payment_date, last_purchase_date, created_at, updated_at";

/// Repository for the customer account store
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    /// Creates a new AccountRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Retrieves an account by its owning customer, if one exists
    pub async fn find_by_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Option<AccountRow>, DatabaseError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM customer_accounts WHERE customer_id = $1"
        ))
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(row)
    }

    /// Inserts a fresh account for a customer
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::DuplicateEntry` when the customer already has
    /// an account; the get-or-create path catches this and re-reads.
    pub async fn insert(&self, customer_id: Uuid) -> Result<AccountRow, DatabaseError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "INSERT INTO customer_accounts (customer_id) VALUES ($1) RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(row)
    }

    /// Loads the account row with an exclusive row lock inside a transaction
    ///
    /// The lock is held until the surrounding transaction commits or rolls
    /// back; no cross-account locking is involved.
    pub async fn lock_by_customer(
        conn: &mut PgConnection,
        customer_id: Uuid,
    ) -> Result<Option<AccountRow>, DatabaseError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM customer_accounts WHERE customer_id = $1 FOR UPDATE"
        ))
        .bind(customer_id)
        .fetch_optional(conn)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(row)
    }

    /// Applies an account patch on the given connection
    ///
    /// Only the fields set in the patch are written; `updated_at` always is.
    /// Used inside the engine's transaction and by the scheduler's
    /// `days_overdue`/`status` writes.
    pub async fn apply_patch(
        conn: &mut PgConnection,
        account_id: Uuid,
        patch: &AccountPatch,
        now: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE customer_accounts SET updated_at = ");
        query.push_bind(now);

        if let Some(balance) = patch.balance {
            query.push(", balance = ").push_bind(balance);
        }
        if let Some(status) = patch.status {
            query.push(", status = ").push_bind(AccountStatus::from(status));
        }
        if let Some(days) = patch.days_overdue {
            query.push(", days_overdue = ").push_bind(days);
        }
        if let Some(date) = patch.last_payment_date {
            query.push(", last_payment_date = ").push_bind(date);
        }
        if let Some(date) = patch.last_purchase_date {
            query.push(", last_purchase_date = ").push_bind(date);
        }

        query.push(" WHERE id = ").push_bind(account_id);

        query
            .build()
            .execute(conn)
            .await
            .map_err(DatabaseError::from_sqlx)?;

        Ok(())
    }

    /// Administrative update of credit limit and/or status
    pub async fn update_admin(
        &self,
        customer_id: Uuid,
        credit_limit: Option<Decimal>,
        status: Option<domain_ledger::AccountStatus>,
    ) -> Result<AccountRow, DatabaseError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "UPDATE customer_accounts \
             SET credit_limit = COALESCE($2, credit_limit), \
                 status = COALESCE($3, status), \
                 updated_at = $4 \
             WHERE customer_id = $1 \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(customer_id)
        .bind(credit_limit)
        .bind(status.map(AccountStatus::from))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?
        .ok_or_else(|| DatabaseError::not_found("CustomerAccount", customer_id))?;

        Ok(row)
    }

    /// Accounts joined with their customer, filtered and paginated
    ///
    /// Returns the page plus the total row count for the same filters.
    pub async fn find_page(
        &self,
        filters: &AccountPageFilters,
    ) -> Result<(Vec<AccountCustomerRow>, i64), DatabaseError> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT a.{}, c.first_name, c.last_name \
             FROM customer_accounts a \
             JOIN customers c ON c.id = a.customer_id",
            ACCOUNT_COLUMNS.replace(", ", ", a."),
        ));
        Self::push_filters(&mut query, filters);
        query.push(" ORDER BY a.balance DESC LIMIT ");
        query.push_bind(filters.limit);
        query.push(" OFFSET ");
        query.push_bind(filters.offset);

        let rows = query
            .build_query_as::<AccountCustomerRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)?;

        let mut count_query: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT COUNT(*) FROM customer_accounts a JOIN customers c ON c.id = a.customer_id",
        );
        Self::push_filters(&mut count_query, filters);

        let (total,): (i64,) = count_query
            .build_query_as()
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)?;

        Ok((rows, total))
    }

    fn push_filters(query: &mut QueryBuilder<Postgres>, filters: &AccountPageFilters) {
        query.push(" WHERE TRUE");
        if let Some(status) = filters.status {
            query.push(" AND a.status = ").push_bind(AccountStatus::from(status));
        }
        if filters.has_debt {
            query.push(" AND a.balance > 0");
        }
        if filters.is_overdue {
            query.push(" AND a.days_overdue > 0");
        }
        if let Some(search) = &filters.search {
            let pattern = format!("%{}%", search);
            query.push(" AND (c.first_name ILIKE ");
            query.push_bind(pattern.clone());
            query.push(" OR c.last_name ILIKE ");
            query.push_bind(pattern);
            query.push(")");
        }
    }

    /// All accounts with outstanding debt, largest first
    pub async fn debtors(&self) -> Result<Vec<AccountCustomerRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, AccountCustomerRow>(&format!(
            "SELECT a.{}, c.first_name, c.last_name \
             FROM customer_accounts a \
             JOIN customers c ON c.id = a.customer_id \
             WHERE a.balance > 0 \
             ORDER BY a.balance DESC",
            ACCOUNT_COLUMNS.replace(", ", ", a."),
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(rows)
    }

    /// Accounts with both debt and a positive overdue count, worst first
    pub async fn overdue(&self) -> Result<Vec<AccountCustomerRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, AccountCustomerRow>(&format!(
            "SELECT a.{}, c.first_name, c.last_name \
             FROM customer_accounts a \
             JOIN customers c ON c.id = a.customer_id \
             WHERE a.balance > 0 AND a.days_overdue > 0 \
             ORDER BY a.days_overdue DESC",
            ACCOUNT_COLUMNS.replace(", ", ", a."),
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(rows)
    }

    /// Plain account rows with outstanding debt, for the overdue scheduler
    pub async fn debtor_accounts(&self) -> Result<Vec<AccountRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM customer_accounts WHERE balance > 0"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(rows)
    }

    /// Aggregate counters over the whole account store, in one pass
    pub async fn stats(&self) -> Result<AccountStatsRow, DatabaseError> {
        let row = sqlx::query_as::<_, AccountStatsRow>(
            "SELECT \
                COUNT(*) AS total_accounts, \
                COUNT(*) FILTER (WHERE status = 'active') AS active_accounts, \
                COUNT(*) FILTER (WHERE status = 'suspended') AS suspended_accounts, \
                COUNT(*) FILTER (WHERE balance > 0) AS total_debtors, \
                COALESCE(SUM(balance) FILTER (WHERE balance > 0), 0) AS total_debt, \
                COUNT(*) FILTER (WHERE days_overdue > 0) AS overdue_accounts, \
                COALESCE(SUM(balance) FILTER (WHERE days_overdue > 0), 0) AS total_overdue \
             FROM customer_accounts",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(row)
    }
}

// ============================================================================
// Type definitions
// ============================================================================

/// Account status as stored in Postgres
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "account_status", rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    Suspended,
    Closed,
}

impl From<domain_ledger::AccountStatus> for AccountStatus {
    fn from(status: domain_ledger::AccountStatus) -> Self {
        match status {
            domain_ledger::AccountStatus::Active => AccountStatus::Active,
            domain_ledger::AccountStatus::Suspended => AccountStatus::Suspended,
            domain_ledger::AccountStatus::Closed => AccountStatus::Closed,
        }
    }
}

impl From<AccountStatus> for domain_ledger::AccountStatus {
    fn from(status: AccountStatus) -> Self {
        match status {
            AccountStatus::Active => domain_ledger::AccountStatus::Active,
            AccountStatus::Suspended => domain_ledger::AccountStatus::Suspended,
            AccountStatus::Closed => domain_ledger::AccountStatus::Closed,
        }
    }
}

/// Database row for a customer account
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub balance: Decimal,
    pub credit_limit: Decimal,
    pub status: AccountStatus,
    pub days_overdue: i32,
    pub payment_term_days: i32,
    pub last_payment_date: Option<DateTime<Utc>>,
    pub last_purchase_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccountRow {
    /// Converts the row into the domain entity
    pub fn into_domain(self) -> CustomerAccount {
        CustomerAccount {
            id: self.id.into(),
            customer_id: self.customer_id.into(),
            balance: self.balance,
            credit_limit: self.credit_limit,
            status: self.status.into(),
            days_overdue: self.days_overdue,
            payment_term_days: self.payment_term_days,
            last_payment_date: self.last_payment_date,
            last_purchase_date: self.last_purchase_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Account row joined with the owning customer's display fields
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountCustomerRow {
    #[sqlx(flatten)]
    pub account: AccountRow,
    pub first_name: String,
    pub last_name: String,
}

impl AccountCustomerRow {
    /// Customer display name for statements and alerts
    pub fn customer_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Aggregate counters over the account store
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountStatsRow {
    pub total_accounts: i64,
    pub active_accounts: i64,
    pub suspended_accounts: i64,
    pub total_debtors: i64,
    pub total_debt: Decimal,
    pub overdue_accounts: i64,
    pub total_overdue: Decimal,
}

/// Filters for the paginated account listing
#[derive(Debug, Clone, Default)]
pub struct AccountPageFilters {
    pub status: Option<domain_ledger::AccountStatus>,
    pub has_debt: bool,
    pub is_overdue: bool,
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}
