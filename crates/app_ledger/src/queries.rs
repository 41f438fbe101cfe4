//! Statement / query facade
//!
//! Read-side operations over the account store and movement log, plus the
//! administrative account mutations. Nothing here touches balances or
//! movements; the engine is the sole writer of those.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{round2, CustomerId};
use domain_customers::CustomerDirectory;
use domain_ledger::{
    summarize, AccountMovement, AccountStatus, CustomerAccount, OverdueAlert, StatementSummary,
};
use infra_db::repositories::accounts::{AccountPageFilters, AccountRepository};
use infra_db::repositories::movements::MovementRepository;

use crate::error::AccountsError;
use crate::service::get_or_create_account;

/// Read-side facade over the ledger
#[derive(Clone)]
pub struct AccountQueries {
    accounts: AccountRepository,
    movements: MovementRepository,
    directory: Arc<dyn CustomerDirectory>,
}

impl AccountQueries {
    /// Creates the facade over a pool and the customer directory
    pub fn new(pool: PgPool, directory: Arc<dyn CustomerDirectory>) -> Self {
        Self {
            accounts: AccountRepository::new(pool.clone()),
            movements: MovementRepository::new(pool),
            directory,
        }
    }

    /// Full statement for one customer: account, history, and summary
    ///
    /// Reads are idempotent: with no intervening mutation, two calls yield
    /// the same summary. The account is created lazily like everywhere else.
    pub async fn account_statement(
        &self,
        customer_id: CustomerId,
    ) -> Result<AccountStatement, AccountsError> {
        let account =
            get_or_create_account(&self.accounts, self.directory.as_ref(), customer_id).await?;

        let movements: Vec<AccountMovement> = self
            .movements
            .history(Uuid::from(account.id))
            .await?
            .into_iter()
            .map(|row| row.into_domain())
            .collect();

        let summary = summarize(account.balance, &movements);

        Ok(AccountStatement {
            account,
            movements,
            summary,
        })
    }

    /// Paginated account listing with optional filters
    pub async fn find_all(&self, filters: AccountFilters) -> Result<PaginatedAccounts, AccountsError> {
        let page = filters.page.max(1);
        let limit = filters.limit.clamp(1, 100);

        let (rows, total) = self
            .accounts
            .find_page(&AccountPageFilters {
                status: filters.status,
                has_debt: filters.has_debt.unwrap_or(false),
                is_overdue: filters.is_overdue.unwrap_or(false),
                search: filters.search,
                limit,
                offset: (page - 1) * limit,
            })
            .await?;

        let data = rows
            .into_iter()
            .map(|row| AccountListing {
                customer_name: row.customer_name(),
                account: row.account.into_domain(),
            })
            .collect();

        Ok(PaginatedAccounts {
            data,
            total,
            page,
            limit,
            total_pages: (total + limit - 1) / limit,
        })
    }

    /// All accounts with outstanding debt, largest first
    pub async fn debtors(&self) -> Result<Vec<AccountListing>, AccountsError> {
        let rows = self.accounts.debtors().await?;
        Ok(rows
            .into_iter()
            .map(|row| AccountListing {
                customer_name: row.customer_name(),
                account: row.account.into_domain(),
            })
            .collect())
    }

    /// Accounts that are both indebted and overdue, worst first
    pub async fn overdue_alerts(&self) -> Result<Vec<OverdueAlert>, AccountsError> {
        let rows = self.accounts.overdue().await?;
        Ok(rows
            .into_iter()
            .map(|row| OverdueAlert {
                customer_id: row.account.customer_id.into(),
                customer_name: row.customer_name(),
                balance: row.account.balance,
                days_overdue: row.account.days_overdue,
                last_payment_date: row.account.last_payment_date,
            })
            .collect())
    }

    /// Aggregate counters over the whole account store
    pub async fn stats(&self) -> Result<AccountStats, AccountsError> {
        let row = self.accounts.stats().await?;

        let average_debt = if row.total_debtors > 0 {
            round2(row.total_debt / Decimal::from(row.total_debtors))
        } else {
            Decimal::ZERO
        };

        Ok(AccountStats {
            total_accounts: row.total_accounts,
            active_accounts: row.active_accounts,
            suspended_accounts: row.suspended_accounts,
            total_debtors: row.total_debtors,
            total_debt: row.total_debt,
            average_debt,
            overdue_accounts: row.overdue_accounts,
            total_overdue: row.total_overdue,
        })
    }

    /// Administrative update of credit limit and/or status
    ///
    /// No business gating: the caller decides. A suspended account updated
    /// to `active` here skips the full-payment path on purpose.
    pub async fn update_account(
        &self,
        customer_id: CustomerId,
        update: UpdateAccount,
    ) -> Result<CustomerAccount, AccountsError> {
        get_or_create_account(&self.accounts, self.directory.as_ref(), customer_id).await?;

        let row = self
            .accounts
            .update_admin(Uuid::from(customer_id), update.credit_limit, update.status)
            .await?;

        Ok(row.into_domain())
    }

    /// Suspends the customer's account
    pub async fn suspend_account(
        &self,
        customer_id: CustomerId,
    ) -> Result<CustomerAccount, AccountsError> {
        self.update_account(
            customer_id,
            UpdateAccount {
                credit_limit: None,
                status: Some(AccountStatus::Suspended),
            },
        )
        .await
    }

    /// Reactivates the customer's account
    pub async fn activate_account(
        &self,
        customer_id: CustomerId,
    ) -> Result<CustomerAccount, AccountsError> {
        self.update_account(
            customer_id,
            UpdateAccount {
                credit_limit: None,
                status: Some(AccountStatus::Active),
            },
        )
        .await
    }
}

// ============================================================================
// Type definitions
// ============================================================================

/// Filters accepted by the paginated listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountFilters {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub status: Option<AccountStatus>,
    pub has_debt: Option<bool>,
    pub is_overdue: Option<bool>,
    pub search: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

/// Administrative account update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAccount {
    pub credit_limit: Option<Decimal>,
    pub status: Option<AccountStatus>,
}

/// An account plus its customer's display name
#[derive(Debug, Clone, Serialize)]
pub struct AccountListing {
    pub customer_name: String,
    #[serde(flatten)]
    pub account: CustomerAccount,
}

/// One page of the account listing
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedAccounts {
    pub data: Vec<AccountListing>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

/// A customer's statement: the account, its history, and the summary
#[derive(Debug, Clone, Serialize)]
pub struct AccountStatement {
    pub account: CustomerAccount,
    pub movements: Vec<AccountMovement>,
    pub summary: StatementSummary,
}

/// Aggregate account statistics
#[derive(Debug, Clone, Serialize)]
pub struct AccountStats {
    pub total_accounts: i64,
    pub active_accounts: i64,
    pub suspended_accounts: i64,
    pub total_debtors: i64,
    pub total_debt: Decimal,
    pub average_debt: Decimal,
    pub overdue_accounts: i64,
    pub total_overdue: Decimal,
}
