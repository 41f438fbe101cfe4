//! Engine tests against a real PostgreSQL store
//!
//! These exercise the row-locked transactional path end to end: account
//! auto-creation, credit-limit boundaries, full-payment side effects, the
//! missing-charge sync, and the lost-update property under concurrency.
//!
//! All tests here need Docker and are ignored by default:
//!
//! ```bash
//! cargo test -p app_ledger -- --ignored
//! ```

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use app_ledger::{AccountQueries, LedgerService, UpdateAccount};
use core_kernel::{CustomerId, PaymentMethodId, SystemClock};
use domain_ledger::{
    AccountStatus, ChargeCommand, CustomerPosition, MovementType, PaymentCommand,
};
use infra_db::adapters::{PgCustomerDirectory, PgPendingSales};
use test_utils::database::TestDatabase;
use test_utils::mocks::RecordingCashRegister;

struct Harness {
    db: TestDatabase,
    service: LedgerService,
    queries: AccountQueries,
    cash_register: Arc<RecordingCashRegister>,
}

impl Harness {
    async fn new() -> Self {
        let db = TestDatabase::new().await.expect("container should start");
        let pool = db.pool().clone();

        let directory = Arc::new(PgCustomerDirectory::new(pool.clone()));
        let cash_register = Arc::new(RecordingCashRegister::new());
        let pending_sales = Arc::new(PgPendingSales::new(pool.clone()));

        let service = LedgerService::new(
            pool.clone(),
            directory.clone(),
            cash_register.clone(),
            pending_sales,
            Arc::new(SystemClock),
        );
        let queries = AccountQueries::new(pool, directory);

        Self {
            db,
            service,
            queries,
            cash_register,
        }
    }

    async fn seed_customer(&self) -> CustomerId {
        self.db
            .seed_customer("Ana", "Pereyra")
            .await
            .expect("seed customer")
            .into()
    }
}

fn charge(amount: Decimal) -> ChargeCommand {
    ChargeCommand {
        amount,
        description: format!("Sale of ${amount}"),
        sale_id: None,
        notes: None,
    }
}

fn payment(amount: Decimal) -> PaymentCommand {
    PaymentCommand {
        amount,
        payment_method_id: PaymentMethodId::new(),
        description: None,
        notes: None,
    }
}

#[tokio::test]
#[ignore = "requires Docker for the PostgreSQL test container"]
async fn first_charge_creates_the_account() {
    let h = Harness::new().await;
    let customer_id = h.seed_customer().await;

    let movement = h
        .service
        .create_charge(customer_id, charge(dec!(1500)), None)
        .await
        .expect("charge should succeed");

    assert_eq!(movement.movement_type, MovementType::Charge);
    assert_eq!(movement.balance_before, Decimal::ZERO);
    assert_eq!(movement.balance_after, dec!(1500));

    let statement = h.queries.account_statement(customer_id).await.unwrap();
    assert_eq!(statement.account.balance, dec!(1500));
    assert_eq!(statement.summary.customer_position, CustomerPosition::CustomerOwes);
    assert_eq!(statement.movements.len(), 1);
}

#[tokio::test]
#[ignore = "requires Docker for the PostgreSQL test container"]
async fn unknown_customer_is_rejected() {
    let h = Harness::new().await;

    let err = h
        .service
        .create_charge(CustomerId::new(), charge(dec!(100)), None)
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
#[ignore = "requires Docker for the PostgreSQL test container"]
async fn credit_limit_boundary_is_strict() {
    let h = Harness::new().await;
    let customer_id = h.seed_customer().await;

    h.queries
        .update_account(
            customer_id,
            UpdateAccount {
                credit_limit: Some(dec!(10000)),
                status: None,
            },
        )
        .await
        .unwrap();

    h.service
        .create_charge(customer_id, charge(dec!(8000)), None)
        .await
        .expect("charge within limit");

    // 8000 + 3000 > 10000: rejected before any write
    let err = h
        .service
        .create_charge(customer_id, charge(dec!(3000)), None)
        .await
        .unwrap_err();
    assert!(err.is_invalid_operation());

    // Reaching the limit exactly is allowed
    let movement = h
        .service
        .create_charge(customer_id, charge(dec!(2000)), None)
        .await
        .expect("charge to the exact limit");
    assert_eq!(movement.balance_after, dec!(10000));
}

#[tokio::test]
#[ignore = "requires Docker for the PostgreSQL test container"]
async fn full_payment_settles_reactivates_and_notifies() {
    let h = Harness::new().await;
    let customer_id = h.seed_customer().await;

    h.service
        .create_charge(customer_id, charge(dec!(5000)), None)
        .await
        .unwrap();
    h.queries.suspend_account(customer_id).await.unwrap();

    let movement = h
        .service
        .create_payment(customer_id, payment(dec!(5000)), None)
        .await
        .expect("full payment");

    assert_eq!(movement.amount, dec!(-5000));
    assert_eq!(movement.balance_after, Decimal::ZERO);

    let statement = h.queries.account_statement(customer_id).await.unwrap();
    assert_eq!(statement.account.status, AccountStatus::Active);
    assert_eq!(statement.account.days_overdue, 0);

    let notices = h.cash_register.received();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].amount, dec!(5000));
}

#[tokio::test]
#[ignore = "requires Docker for the PostgreSQL test container"]
async fn cash_register_failure_does_not_fail_the_payment() {
    let h = Harness::new().await;
    let customer_id = h.seed_customer().await;

    h.service
        .create_charge(customer_id, charge(dec!(1000)), None)
        .await
        .unwrap();

    h.cash_register.fail_next(true);
    let movement = h
        .service
        .create_payment(customer_id, payment(dec!(400)), None)
        .await
        .expect("payment must commit despite the notifier failure");

    assert_eq!(movement.balance_after, dec!(600));
    assert!(h.cash_register.received().is_empty());
}

#[tokio::test]
#[ignore = "requires Docker for the PostgreSQL test container"]
async fn sync_recovers_missing_charges_once() {
    let h = Harness::new().await;
    let customer_id = h.seed_customer().await;

    h.db
        .seed_pending_sale(customer_id.into(), "0001-00000042", dec!(750.25))
        .await
        .unwrap();
    h.db
        .seed_pending_sale(customer_id.into(), "0001-00000043", dec!(249.75))
        .await
        .unwrap();

    let report = h
        .service
        .sync_missing_charges(customer_id, None)
        .await
        .expect("sync should succeed");
    assert_eq!(report.charges_created, 2);
    assert_eq!(report.total_amount, dec!(1000.00));

    let statement = h.queries.account_statement(customer_id).await.unwrap();
    assert_eq!(statement.account.balance, dec!(1000.00));

    // Re-running finds nothing left to charge
    let rerun = h.service.sync_missing_charges(customer_id, None).await.unwrap();
    assert_eq!(rerun.charges_created, 0);
    assert_eq!(statement.account.balance, dec!(1000.00));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires Docker for the PostgreSQL test container"]
async fn concurrent_charges_serialize_on_the_row_lock() {
    let h = Harness::new().await;
    let customer_id = h.seed_customer().await;

    // Materialize the account first so both tasks hit the locked-read path
    h.service.get_or_create_account(customer_id).await.unwrap();

    let (a, b) = tokio::join!(
        h.service.create_charge(customer_id, charge(dec!(700)), None),
        h.service.create_charge(customer_id, charge(dec!(300)), None),
    );
    let a = a.expect("first concurrent charge");
    let b = b.expect("second concurrent charge");

    // Never the same starting snapshot: one of them observed the other
    assert_ne!(a.balance_before, b.balance_before);

    // No lost update: both charges landed and the chain reaches the sum
    let statement = h.queries.account_statement(customer_id).await.unwrap();
    assert_eq!(statement.account.balance, dec!(1000));
    assert_eq!(statement.movements.len(), 2);
    let final_after = statement
        .movements
        .iter()
        .map(|m| m.balance_after)
        .max()
        .unwrap();
    assert_eq!(final_after, dec!(1000));
}
