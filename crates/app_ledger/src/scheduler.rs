//! Overdue scheduler
//!
//! Two periodic jobs over the account store:
//!
//! - daily: recompute `days_overdue` for every indebted account from its
//!   most recent charge, suspending active accounts past the threshold
//! - monthly: report the current overdue list to the notifier port
//!
//! Both bodies are public methods driven by an injectable [`Clock`], so
//! tests invoke them directly with a fixed instant; [`OverdueScheduler::run`]
//! is the thin timer loop production spawns. The scheduler writes only
//! `days_overdue` and `status`, never balances or movements, so it cannot
//! conflict with the engine on the balance invariant.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Datelike;
use sqlx::PgPool;
use tracing::{error, info, warn};

use core_kernel::{Clock, DomainPort, PortError};
use domain_ledger::{
    overdue_transition, whole_days_overdue, AccountPatch, OverdueAlert, OverdueNotifier,
};
use infra_db::repositories::accounts::{AccountRepository, AccountRow};
use infra_db::repositories::movements::MovementRepository;
use infra_db::DatabaseError;

use crate::error::AccountsError;
use crate::queries::AccountQueries;

/// Outcome of one daily overdue recompute
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverdueRunReport {
    /// Accounts whose `days_overdue` was recomputed
    pub updated: usize,
    /// Accounts newly suspended this run
    pub suspended: usize,
    /// Accounts skipped because they have no charge movement
    pub skipped: usize,
    /// Accounts whose update failed; the batch continued past them
    pub failed: usize,
}

/// Periodic overdue recompute and alert broadcast
pub struct OverdueScheduler {
    pool: PgPool,
    accounts: AccountRepository,
    movements: MovementRepository,
    queries: AccountQueries,
    notifier: Arc<dyn OverdueNotifier>,
    clock: Arc<dyn Clock>,
}

impl OverdueScheduler {
    /// Creates the scheduler over a pool, the query facade, and its ports
    pub fn new(
        pool: PgPool,
        queries: AccountQueries,
        notifier: Arc<dyn OverdueNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts: AccountRepository::new(pool.clone()),
            movements: MovementRepository::new(pool.clone()),
            pool,
            queries,
            notifier,
            clock,
        }
    }

    /// Recomputes `days_overdue` for every account with outstanding debt
    ///
    /// Each account is processed in its own error scope: one bad account is
    /// logged and the batch continues. Accounts without any charge movement
    /// are left untouched.
    pub async fn update_overdue_days(&self) -> Result<OverdueRunReport, AccountsError> {
        let now = self.clock.now();
        let debtors = self.accounts.debtor_accounts().await?;
        let total = debtors.len();

        let mut report = OverdueRunReport::default();
        for row in debtors {
            match self.update_one(&row, now).await {
                Ok(Some(suspended)) => {
                    report.updated += 1;
                    if suspended {
                        report.suspended += 1;
                    }
                }
                Ok(None) => report.skipped += 1,
                Err(e) => {
                    report.failed += 1;
                    error!(
                        account_id = %row.id,
                        error = %e,
                        "overdue update failed for account, continuing batch"
                    );
                }
            }
        }

        info!(
            total,
            updated = report.updated,
            suspended = report.suspended,
            skipped = report.skipped,
            failed = report.failed,
            "overdue recompute finished"
        );
        Ok(report)
    }

    /// Recomputes one account; `Ok(Some(true))` means it was suspended
    async fn update_one(
        &self,
        row: &AccountRow,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<Option<bool>, AccountsError> {
        let Some(last_charge_at) = self.movements.last_charge_at(row.id).await? else {
            return Ok(None);
        };

        let days = whole_days_overdue(last_charge_at, now);
        let transition = overdue_transition(days, row.status.into());

        let patch = AccountPatch {
            days_overdue: Some(days),
            status: transition,
            ..Default::default()
        };

        let mut conn = self.pool.acquire().await.map_err(DatabaseError::from_sqlx)?;
        AccountRepository::apply_patch(&mut conn, row.id, &patch, now).await?;

        if transition.is_some() {
            warn!(account_id = %row.id, days, "account suspended for overdue debt");
        }
        Ok(Some(transition.is_some()))
    }

    /// Reports the current overdue list through the notifier port
    ///
    /// Purely observational; mutates nothing. Returns the number of alerts
    /// delivered.
    pub async fn broadcast_overdue_alerts(&self) -> Result<usize, AccountsError> {
        let alerts = self.queries.overdue_alerts().await?;

        if alerts.is_empty() {
            info!("no overdue accounts to report");
            return Ok(0);
        }

        self.notifier
            .notify_overdue(&alerts)
            .await
            .map_err(AccountsError::Collaborator)?;

        info!(count = alerts.len(), "overdue alerts reported");
        Ok(alerts.len())
    }

    /// Timer loop: daily recompute, monthly broadcast on the 1st
    ///
    /// Failures are logged and the loop keeps ticking; this job must never
    /// take the foreground ledger down with it.
    pub async fn run(self: Arc<Self>) {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(24 * 60 * 60));
        // The first tick fires immediately; skip it so startup does not
        // double-run with a previously scheduled execution.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            if let Err(e) = self.update_overdue_days().await {
                error!(error = %e, "daily overdue recompute failed");
            }

            if self.clock.now().day() == 1 {
                if let Err(e) = self.broadcast_overdue_alerts().await {
                    error!(error = %e, "monthly overdue broadcast failed");
                }
            }
        }
    }
}

/// Default notifier that reports overdue accounts to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingOverdueNotifier;

impl DomainPort for TracingOverdueNotifier {}

#[async_trait]
impl OverdueNotifier for TracingOverdueNotifier {
    async fn notify_overdue(&self, alerts: &[OverdueAlert]) -> Result<(), PortError> {
        for alert in alerts {
            warn!(
                customer = %alert.customer_name,
                balance = %alert.balance,
                days_overdue = alert.days_overdue,
                "overdue account"
            );
        }
        Ok(())
    }
}
