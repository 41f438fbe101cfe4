//! Ledger domain scenario tests
//!
//! These replay full operation sequences through the planning functions and
//! check the cross-movement invariants: the balance equals the sum of signed
//! amounts, and the snapshot chain is continuous.

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{CustomerId, MovementId, PaymentMethodId};
use domain_ledger::{
    chain_is_continuous, plan_adjustment, plan_charge, plan_payment, plan_surcharge,
    AccountMovement, AccountStatus, AdjustmentCommand, ChargeCommand, CustomerAccount,
    LedgerUpdate, PaymentCommand, SurchargeCommand, SurchargeKind,
};

/// Applies a planned update to the in-memory account and materializes the
/// movement, the way the engine's transaction does against the store.
fn commit(account: &mut CustomerAccount, update: LedgerUpdate) -> AccountMovement {
    let now = Utc::now();
    let draft = update.movement.clone();
    update.account.apply(account, now);

    AccountMovement {
        id: MovementId::new(),
        account_id: account.id,
        movement_type: draft.movement_type,
        amount: draft.amount,
        balance_before: draft.balance_before,
        balance_after: draft.balance_after,
        description: draft.description,
        reference_type: draft.reference_type,
        reference_id: draft.reference_id,
        payment_method_id: draft.payment_method_id,
        notes: draft.notes,
        created_by: None,
        created_at: now,
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

fn ten_percent() -> SurchargeCommand {
    SurchargeCommand {
        kind: SurchargeKind::Percentage,
        value: dec!(10),
        description: None,
    }
}

#[test]
fn balance_equals_sum_of_movements_after_mixed_sequence() {
    let mut account = CustomerAccount::open(CustomerId::new(), Utc::now());
    let mut log: Vec<AccountMovement> = Vec::new();
    let now = Utc::now();

    let update = plan_charge(&account, &charge(dec!(1500)), now).unwrap();
    log.push(commit(&mut account, update));

    let update = plan_charge(&account, &charge(dec!(800.25)), now).unwrap();
    log.push(commit(&mut account, update));

    let update = plan_payment(&account, &payment(dec!(1000)), now).unwrap();
    log.push(commit(&mut account, update));

    let update = plan_surcharge(
        &account,
        &SurchargeCommand {
            kind: SurchargeKind::Percentage,
            value: dec!(5),
            description: None,
        },
    )
    .unwrap();
    log.push(commit(&mut account, update));

    let update = plan_adjustment(
        &account,
        &AdjustmentCommand {
            amount: dec!(-50.50),
            description: "Goodwill".to_string(),
            reference_type: None,
            reference_id: None,
            notes: None,
        },
    );
    log.push(commit(&mut account, update));

    let replayed: Decimal = log.iter().map(|m| m.amount).sum();
    assert_eq!(account.balance, replayed);
    assert!(chain_is_continuous(&log));
    assert_eq!(account.balance, log.last().unwrap().balance_after);
}

#[test]
fn new_customer_first_charge_scenario() {
    // A brand-new account takes its first charge
    let mut account = CustomerAccount::open(CustomerId::new(), Utc::now());

    let update = plan_charge(&account, &charge(dec!(1500)), Utc::now()).unwrap();
    let movement = commit(&mut account, update);

    assert_eq!(movement.balance_before, Decimal::ZERO);
    assert_eq!(movement.balance_after, dec!(1500));
    assert_eq!(movement.amount, dec!(1500));
    assert_eq!(account.balance, dec!(1500));
}

#[test]
fn full_payment_reopens_a_suspended_account() {
    let mut account = CustomerAccount::open(CustomerId::new(), Utc::now());
    let now = Utc::now();

    let update = plan_charge(&account, &charge(dec!(5000)), now).unwrap();
    commit(&mut account, update);

    account.status = AccountStatus::Suspended;
    account.days_overdue = 45;

    let update = plan_payment(&account, &payment(dec!(5000)), now).unwrap();
    let movement = commit(&mut account, update);

    assert_eq!(movement.amount, dec!(-5000));
    assert_eq!(account.balance, Decimal::ZERO);
    assert_eq!(account.days_overdue, 0);
    assert_eq!(account.status, AccountStatus::Active);
}

#[test]
fn surcharge_then_exact_payoff() {
    let mut account = CustomerAccount::open(CustomerId::new(), Utc::now());
    let now = Utc::now();

    let update = plan_charge(&account, &charge(dec!(1000.33)), now).unwrap();
    commit(&mut account, update);

    let update = plan_surcharge(&account, &ten_percent()).unwrap();
    commit(&mut account, update);

    assert_eq!(account.balance, dec!(1100.36));

    let update = plan_payment(&account, &payment(dec!(1100.36)), now).unwrap();
    commit(&mut account, update);
    assert_eq!(account.balance, Decimal::ZERO);
}

#[test]
fn adjustments_can_push_the_balance_negative() {
    // The business can end up owing the customer through adjustments
    let mut account = CustomerAccount::open(CustomerId::new(), Utc::now());

    let update = plan_adjustment(
        &account,
        &AdjustmentCommand {
            amount: dec!(-200),
            description: "Deposit carried over".to_string(),
            reference_type: Some("migration".to_string()),
            reference_id: None,
            notes: None,
        },
    );
    commit(&mut account, update);

    assert_eq!(account.balance, dec!(-200));
    assert!(!account.has_debt());
}
