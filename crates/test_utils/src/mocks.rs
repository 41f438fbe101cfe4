//! In-memory mock ports
//!
//! Every collaborator the ledger consumes, implemented against in-process
//! state: a directory seeded with customers, a recording cash register that
//! can be told to fail, a scripted pending-sales source, a collecting
//! overdue notifier, and a fixed clock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use core_kernel::{Clock, CustomerId, DomainPort, PortError};
use domain_customers::{Customer, CustomerDirectory};
use domain_ledger::{
    AccountPaymentNotice, CashRegister, OverdueAlert, OverdueNotifier, PendingSale, PendingSales,
};

/// Directory seeded with a fixed set of customers
#[derive(Default)]
pub struct InMemoryCustomerDirectory {
    customers: HashMap<CustomerId, Customer>,
}

impl InMemoryCustomerDirectory {
    /// Creates an empty directory; every lookup fails NotFound
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a directory containing the given customers
    pub fn with_customers(customers: impl IntoIterator<Item = Customer>) -> Self {
        Self {
            customers: customers.into_iter().map(|c| (c.id, c)).collect(),
        }
    }
}

impl DomainPort for InMemoryCustomerDirectory {}

#[async_trait]
impl CustomerDirectory for InMemoryCustomerDirectory {
    async fn find_one(&self, customer_id: CustomerId) -> Result<Customer, PortError> {
        self.customers
            .get(&customer_id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Customer", customer_id))
    }
}

/// Cash register that records every notice it receives
///
/// Flip [`RecordingCashRegister::fail_next`] to exercise the best-effort
/// path: the ledger must commit the payment even when this port errors.
#[derive(Default)]
pub struct RecordingCashRegister {
    notices: Mutex<Vec<AccountPaymentNotice>>,
    fail: AtomicBool,
}

impl RecordingCashRegister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail until cleared
    pub fn fail_next(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Notices received so far
    pub fn received(&self) -> Vec<AccountPaymentNotice> {
        self.notices.lock().unwrap().clone()
    }
}

impl DomainPort for RecordingCashRegister {}

#[async_trait]
impl CashRegister for RecordingCashRegister {
    async fn register_account_payment(
        &self,
        notice: AccountPaymentNotice,
    ) -> Result<(), PortError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortError::ServiceUnavailable {
                service: "cash-register".to_string(),
            });
        }
        self.notices.lock().unwrap().push(notice);
        Ok(())
    }
}

/// Pending-sales source scripted per customer
#[derive(Default)]
pub struct ScriptedPendingSales {
    pending: Mutex<HashMap<CustomerId, Vec<PendingSale>>>,
    settled: Mutex<Vec<CustomerId>>,
}

impl ScriptedPendingSales {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the pending backlog for a customer
    pub fn seed(&self, customer_id: CustomerId, sales: Vec<PendingSale>) {
        self.pending.lock().unwrap().insert(customer_id, sales);
    }

    /// Customers whose backlog was settled, in call order
    pub fn settled_customers(&self) -> Vec<CustomerId> {
        self.settled.lock().unwrap().clone()
    }
}

impl DomainPort for ScriptedPendingSales {}

#[async_trait]
impl PendingSales for ScriptedPendingSales {
    async fn pending_on_account(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<PendingSale>, PortError> {
        Ok(self
            .pending
            .lock()
            .unwrap()
            .get(&customer_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn settle_for_customer(&self, customer_id: CustomerId) -> Result<u64, PortError> {
        let settled = self
            .pending
            .lock()
            .unwrap()
            .remove(&customer_id)
            .map(|sales| sales.len() as u64)
            .unwrap_or(0);
        self.settled.lock().unwrap().push(customer_id);
        Ok(settled)
    }
}

/// Notifier that collects the alerts it is handed
#[derive(Default)]
pub struct CollectingOverdueNotifier {
    alerts: Mutex<Vec<OverdueAlert>>,
}

impl CollectingOverdueNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alerts received so far
    pub fn received(&self) -> Vec<OverdueAlert> {
        self.alerts.lock().unwrap().clone()
    }
}

impl DomainPort for CollectingOverdueNotifier {}

#[async_trait]
impl OverdueNotifier for CollectingOverdueNotifier {
    async fn notify_overdue(&self, alerts: &[OverdueAlert]) -> Result<(), PortError> {
        self.alerts.lock().unwrap().extend_from_slice(alerts);
        Ok(())
    }
}

/// Clock pinned to a scripted instant
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Creates a clock frozen at the given instant
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Moves the clock forward
    pub fn advance(&self, duration: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += duration;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
