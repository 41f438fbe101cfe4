//! Ledger engine
//!
//! All four mutation operations share one transactional shape: load the
//! account row with an exclusive lock, validate against the locked state,
//! compute the new balance, insert the movement, and update the account,
//! all committed as a single atomic unit. Concurrent operations on the same
//! customer serialize on the row lock; operations on different customers are
//! fully independent.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use core_kernel::{Clock, CustomerId, SaleId, UserId};
use domain_customers::CustomerDirectory;
use domain_ledger::{
    plan_adjustment, plan_charge, plan_payment, plan_surcharge, AccountMovement,
    AccountPaymentNotice, AdjustmentCommand, CashRegister, ChargeCommand, CustomerAccount,
    LedgerError, LedgerUpdate, MovementDraft, MovementType, PaymentCommand, PendingSales,
    SurchargeCommand,
};
use infra_db::repositories::accounts::AccountRepository;
use infra_db::repositories::movements::MovementRepository;
use infra_db::DatabaseError;

use crate::error::AccountsError;

/// Loads the account for a customer, creating it on first reference
///
/// Creation verifies the customer against the directory first. Two
/// concurrent first-time calls can both reach the insert; the unique index
/// on `customer_id` rejects the loser, which recovers by re-reading the
/// winner's row.
pub(crate) async fn get_or_create_account(
    accounts: &AccountRepository,
    directory: &dyn CustomerDirectory,
    customer_id: CustomerId,
) -> Result<CustomerAccount, AccountsError> {
    let customer_uuid = Uuid::from(customer_id);

    if let Some(row) = accounts.find_by_customer(customer_uuid).await? {
        return Ok(row.into_domain());
    }

    directory
        .find_one(customer_id)
        .await
        .map_err(|e| AccountsError::from_directory(customer_id, e))?;

    match accounts.insert(customer_uuid).await {
        Ok(row) => {
            info!(%customer_id, "opened current account");
            Ok(row.into_domain())
        }
        Err(e) if e.is_duplicate() => {
            // Lost the first-creation race; the winner's row is authoritative
            let row = accounts
                .find_by_customer(customer_uuid)
                .await?
                .ok_or_else(|| DatabaseError::not_found("CustomerAccount", customer_id))?;
            Ok(row.into_domain())
        }
        Err(e) => Err(e.into()),
    }
}

/// The customer current-account ledger engine
///
/// Stateless: holds a pool handle, the repositories, and the collaborator
/// ports. Clone is cheap; every handler can carry its own copy.
#[derive(Clone)]
pub struct LedgerService {
    pool: PgPool,
    accounts: AccountRepository,
    movements: MovementRepository,
    directory: Arc<dyn CustomerDirectory>,
    cash_register: Arc<dyn CashRegister>,
    pending_sales: Arc<dyn PendingSales>,
    clock: Arc<dyn Clock>,
}

impl LedgerService {
    /// Creates the engine over a pool and its collaborator ports
    pub fn new(
        pool: PgPool,
        directory: Arc<dyn CustomerDirectory>,
        cash_register: Arc<dyn CashRegister>,
        pending_sales: Arc<dyn PendingSales>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts: AccountRepository::new(pool.clone()),
            movements: MovementRepository::new(pool.clone()),
            pool,
            directory,
            cash_register,
            pending_sales,
            clock,
        }
    }

    /// Loads or lazily creates the customer's account
    ///
    /// # Errors
    ///
    /// Returns `AccountsError::CustomerNotFound` when the directory does not
    /// know the customer.
    pub async fn get_or_create_account(
        &self,
        customer_id: CustomerId,
    ) -> Result<CustomerAccount, AccountsError> {
        get_or_create_account(&self.accounts, self.directory.as_ref(), customer_id).await
    }

    /// Charges a sale (or manual debit) to the customer's account
    ///
    /// # Errors
    ///
    /// Rejected with `InvalidOperation` when the account is suspended or the
    /// charge would exceed an enforced credit limit.
    pub async fn create_charge(
        &self,
        customer_id: CustomerId,
        cmd: ChargeCommand,
        actor: Option<UserId>,
    ) -> Result<AccountMovement, AccountsError> {
        let movement = self
            .apply(customer_id, actor, |account, now| {
                plan_charge(account, &cmd, now)
            })
            .await?;

        info!(
            %customer_id,
            amount = %movement.amount,
            balance = %movement.balance_after,
            "charge recorded"
        );
        Ok(movement)
    }

    /// Records a customer payment
    ///
    /// A payment that clears the debt settles the customer's pending
    /// on-account sales and reactivates a suspended account. The cash
    /// register is notified after the commit, best-effort: its failure is
    /// logged and never surfaces to the caller.
    pub async fn create_payment(
        &self,
        customer_id: CustomerId,
        cmd: PaymentCommand,
        actor: Option<UserId>,
    ) -> Result<AccountMovement, AccountsError> {
        let movement = self
            .apply(customer_id, actor, |account, now| {
                plan_payment(account, &cmd, now)
            })
            .await?;

        if movement.balance_after == Decimal::ZERO {
            match self.pending_sales.settle_for_customer(customer_id).await {
                Ok(settled) if settled > 0 => {
                    info!(%customer_id, settled, "debt cleared, pending sales settled");
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(%customer_id, error = %e, "could not settle pending sales after full payment");
                }
            }
        }

        self.notify_cash_register(customer_id, &movement, actor).await;

        info!(
            %customer_id,
            amount = %movement.amount.abs(),
            balance = %movement.balance_after,
            "payment recorded"
        );
        Ok(movement)
    }

    /// Applies a late-payment surcharge to the outstanding balance
    pub async fn apply_surcharge(
        &self,
        customer_id: CustomerId,
        cmd: SurchargeCommand,
        actor: Option<UserId>,
    ) -> Result<AccountMovement, AccountsError> {
        self.apply(customer_id, actor, |account, _now| {
            plan_surcharge(account, &cmd)
        })
        .await
    }

    /// Records an administrative adjustment, either sign, no gating
    pub async fn create_adjustment(
        &self,
        customer_id: CustomerId,
        cmd: AdjustmentCommand,
        actor: Option<UserId>,
    ) -> Result<AccountMovement, AccountsError> {
        self.apply(customer_id, actor, |account, _now| {
            Ok(plan_adjustment(account, &cmd))
        })
        .await
    }

    /// Creates charges for pending on-account sales that never got one
    ///
    /// Data-repair path for sales recorded before the ledger learned about
    /// them. Sales that already have a charge movement referencing them are
    /// skipped; the rest are charged oldest-first inside one transaction so
    /// the snapshot chain stays continuous.
    pub async fn sync_missing_charges(
        &self,
        customer_id: CustomerId,
        actor: Option<UserId>,
    ) -> Result<SyncReport, AccountsError> {
        let account = self.get_or_create_account(customer_id).await?;

        let pending = self
            .pending_sales
            .pending_on_account(customer_id)
            .await
            .map_err(AccountsError::Collaborator)?;

        let registered: HashSet<Uuid> = self
            .movements
            .charged_sale_ids(Uuid::from(account.id))
            .await?
            .into_iter()
            .collect();

        let missing: Vec<_> = pending
            .into_iter()
            .filter(|sale| !registered.contains(sale.id.as_uuid()))
            .collect();

        if missing.is_empty() {
            return Ok(SyncReport::default());
        }

        let now = self.clock.now();
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from_sqlx)?;

        let row = AccountRepository::lock_by_customer(&mut tx, Uuid::from(customer_id))
            .await?
            .ok_or_else(|| DatabaseError::not_found("CustomerAccount", customer_id))?;
        let account_id = row.id;
        let mut balance = row.balance;
        let mut created = Vec::with_capacity(missing.len());

        for sale in missing {
            let draft = MovementDraft {
                movement_type: MovementType::Charge,
                amount: sale.total,
                balance_before: balance,
                balance_after: balance + sale.total,
                description: format!("Sale {}", sale.number),
                reference_type: Some("sale".to_string()),
                reference_id: Some(Uuid::from(sale.id)),
                payment_method_id: None,
                notes: Some("Charge generated by historical data sync".to_string()),
            };

            MovementRepository::insert(
                &mut tx,
                account_id,
                &draft,
                actor.map(Uuid::from),
                now,
            )
            .await?;

            balance = draft.balance_after;
            created.push(SyncedCharge {
                sale_id: sale.id,
                sale_number: sale.number,
                amount: sale.total,
            });
        }

        AccountRepository::apply_patch(
            &mut tx,
            account_id,
            &domain_ledger::AccountPatch {
                balance: Some(balance),
                ..Default::default()
            },
            now,
        )
        .await?;

        tx.commit().await.map_err(DatabaseError::from_sqlx)?;

        let total_amount: Decimal = created.iter().map(|c| c.amount).sum();
        info!(
            %customer_id,
            charges = created.len(),
            total = %total_amount,
            "synced missing charges"
        );

        Ok(SyncReport {
            charges_created: created.len(),
            total_amount,
            sales: created,
        })
    }

    /// Runs one planned operation as a row-locked transaction
    async fn apply<F>(
        &self,
        customer_id: CustomerId,
        actor: Option<UserId>,
        plan: F,
    ) -> Result<AccountMovement, AccountsError>
    where
        F: FnOnce(&CustomerAccount, DateTime<Utc>) -> Result<LedgerUpdate, LedgerError>,
    {
        self.get_or_create_account(customer_id).await?;

        let now = self.clock.now();
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from_sqlx)?;

        let row = AccountRepository::lock_by_customer(&mut tx, Uuid::from(customer_id))
            .await?
            .ok_or_else(|| DatabaseError::not_found("CustomerAccount", customer_id))?;
        let account_id = row.id;
        let account = row.into_domain();

        // A validation failure aborts here; nothing has been written yet
        let update = plan(&account, now)?;

        let movement = MovementRepository::insert(
            &mut tx,
            account_id,
            &update.movement,
            actor.map(Uuid::from),
            now,
        )
        .await?;
        AccountRepository::apply_patch(&mut tx, account_id, &update.account, now).await?;

        tx.commit().await.map_err(DatabaseError::from_sqlx)?;

        Ok(movement.into_domain())
    }

    /// Forwards a committed payment to the cash register, best-effort
    async fn notify_cash_register(
        &self,
        customer_id: CustomerId,
        movement: &AccountMovement,
        actor: Option<UserId>,
    ) {
        let Some(payment_method_id) = movement.payment_method_id else {
            return;
        };

        let customer_name = match self.directory.find_one(customer_id).await {
            Ok(customer) => customer.full_name(),
            Err(_) => "Customer".to_string(),
        };

        let notice = AccountPaymentNotice {
            movement_id: movement.id,
            customer_id,
            amount: movement.amount.abs(),
            payment_method_id,
            description: format!("Account payment - {customer_name}"),
            recorded_by: actor,
        };

        if let Err(e) = self.cash_register.register_account_payment(notice).await {
            warn!(
                %customer_id,
                error = %e,
                "cash register notification failed; the payment is committed"
            );
        }
    }
}

/// One charge created by the missing-charge sync
#[derive(Debug, Clone, Serialize)]
pub struct SyncedCharge {
    pub sale_id: SaleId,
    pub sale_number: String,
    pub amount: Decimal,
}

/// Outcome of a missing-charge sync run
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub charges_created: usize,
    pub total_amount: Decimal,
    pub sales: Vec<SyncedCharge>,
}
