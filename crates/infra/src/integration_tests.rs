//! Integration tests for the ledger core over the in-memory store.
//!
//! Exercises the full path engine → per-account locks → durable store, in
//! single- and multi-threaded runs.

use std::sync::atomic::{AtomicUsize, Ordering};

use proptest::prelude::*;

use ledgerbank_auth::Principal;
use ledgerbank_banking::{parse_birth_date, AccountNumber, TaxId, TransactionKind};
use ledgerbank_core::Money;
use ledgerbank_ledger::{LedgerEngine, LedgerError, NewClient};

use crate::store::InMemoryLedgerStore;

fn active_principal() -> Principal {
    Principal {
        username: "user@example.com".to_string(),
        display_name: Some("John Doe".to_string()),
        active: true,
    }
}

fn inactive_principal() -> Principal {
    Principal {
        username: "dormant@example.com".to_string(),
        display_name: None,
        active: false,
    }
}

fn engine() -> LedgerEngine<InMemoryLedgerStore> {
    LedgerEngine::new(InMemoryLedgerStore::new())
}

fn tax_id() -> TaxId {
    TaxId::new("11111111111").unwrap()
}

fn money(s: &str) -> Money {
    s.parse().unwrap()
}

fn new_client(tax_id: &TaxId) -> NewClient {
    NewClient {
        tax_id: tax_id.clone(),
        name: "Maria Silva".to_string(),
        birth_date: parse_birth_date("01/01/1990").unwrap(),
        address: "Rua das Flores 123".to_string(),
    }
}

/// Register a client and open a zero-balance account under `number`.
fn setup_account(engine: &LedgerEngine<InMemoryLedgerStore>, tax_id: &TaxId, number: i64) {
    let principal = active_principal();
    engine
        .register_client(&principal, new_client(tax_id))
        .unwrap();
    engine
        .open_account(
            &principal,
            tax_id,
            AccountNumber::new(number).unwrap(),
            Money::ZERO,
        )
        .unwrap();
}

fn balance_of(engine: &LedgerEngine<InMemoryLedgerStore>, tax_id: &TaxId) -> Money {
    let accounts = engine
        .accounts_for_client(&active_principal(), tax_id)
        .unwrap();
    accounts[0].balance
}

#[test]
fn deposit_increases_balance_and_records_one_transaction() {
    let engine = engine();
    let tax_id = tax_id();
    setup_account(&engine, &tax_id, 1001);
    let principal = active_principal();

    let recorded = engine.deposit(&principal, &tax_id, money("100")).unwrap();
    assert_eq!(recorded.kind, TransactionKind::Deposit);
    assert_eq!(recorded.amount, money("100"));

    assert_eq!(balance_of(&engine, &tax_id), money("100"));
    let statement = engine.statement(&principal, &tax_id).unwrap();
    assert_eq!(statement.len(), 1);
    assert_eq!(statement[0].kind, TransactionKind::Deposit);
    assert_eq!(statement[0].amount, money("100"));
}

#[test]
fn overdraw_fails_and_leaves_state_untouched() {
    let engine = engine();
    let tax_id = tax_id();
    setup_account(&engine, &tax_id, 1001);
    let principal = active_principal();
    engine.deposit(&principal, &tax_id, money("100")).unwrap();

    let err = engine
        .withdraw(&principal, &tax_id, money("150"))
        .unwrap_err();
    match err {
        LedgerError::InsufficientFunds { balance, requested } => {
            assert_eq!(balance, money("100"));
            assert_eq!(requested, money("150"));
        }
        other => panic!("expected InsufficientFunds, got {other:?}"),
    }

    assert_eq!(balance_of(&engine, &tax_id), money("100"));
    assert_eq!(engine.statement(&principal, &tax_id).unwrap().len(), 1);
}

#[test]
fn withdraw_decreases_balance_and_appends_to_the_log() {
    let engine = engine();
    let tax_id = tax_id();
    setup_account(&engine, &tax_id, 1001);
    let principal = active_principal();
    engine.deposit(&principal, &tax_id, money("100")).unwrap();

    engine.withdraw(&principal, &tax_id, money("40")).unwrap();
    assert_eq!(balance_of(&engine, &tax_id), money("60"));

    let statement = engine.statement(&principal, &tax_id).unwrap();
    let log: Vec<(TransactionKind, Money)> =
        statement.iter().map(|t| (t.kind, t.amount)).collect();
    assert_eq!(
        log,
        vec![
            (TransactionKind::Deposit, money("100")),
            (TransactionKind::Withdrawal, money("40")),
        ]
    );
}

#[test]
fn duplicate_account_number_is_a_conflict() {
    let engine = engine();
    let tax_id = tax_id();
    setup_account(&engine, &tax_id, 1001);
    let principal = active_principal();

    let other = TaxId::new("22222222222").unwrap();
    engine
        .register_client(&principal, new_client(&other))
        .unwrap();
    let err = engine
        .open_account(
            &principal,
            &other,
            AccountNumber::new(1001).unwrap(),
            Money::ZERO,
        )
        .unwrap_err();
    assert!(matches!(err, LedgerError::Conflict(_)));
}

#[test]
fn duplicate_tax_id_is_a_conflict() {
    let engine = engine();
    let tax_id = tax_id();
    let principal = active_principal();
    engine
        .register_client(&principal, new_client(&tax_id))
        .unwrap();
    let err = engine
        .register_client(&principal, new_client(&tax_id))
        .unwrap_err();
    assert!(matches!(err, LedgerError::Conflict(_)));
}

#[test]
fn zero_amounts_are_rejected_without_side_effects() {
    let engine = engine();
    let tax_id = tax_id();
    setup_account(&engine, &tax_id, 1001);
    let principal = active_principal();

    let err = engine.deposit(&principal, &tax_id, Money::ZERO).unwrap_err();
    assert!(matches!(err, LedgerError::InvalidAmount(_)));
    let err = engine.withdraw(&principal, &tax_id, Money::ZERO).unwrap_err();
    assert!(matches!(err, LedgerError::InvalidAmount(_)));

    assert_eq!(balance_of(&engine, &tax_id), Money::ZERO);
    assert!(engine.statement(&principal, &tax_id).unwrap().is_empty());
}

#[test]
fn unknown_clients_and_missing_accounts_are_distinguished() {
    let engine = engine();
    let tax_id = tax_id();
    let principal = active_principal();

    let err = engine
        .deposit(&principal, &tax_id, money("10"))
        .unwrap_err();
    assert!(matches!(err, LedgerError::ClientNotFound));

    engine
        .register_client(&principal, new_client(&tax_id))
        .unwrap();
    let err = engine
        .deposit(&principal, &tax_id, money("10"))
        .unwrap_err();
    assert!(matches!(err, LedgerError::AccountNotFound));
}

#[test]
fn inactive_principals_cannot_operate() {
    let engine = engine();
    let tax_id = tax_id();
    setup_account(&engine, &tax_id, 1001);
    let dormant = inactive_principal();

    assert!(matches!(
        engine.register_client(&dormant, new_client(&TaxId::new("22222222222").unwrap())),
        Err(LedgerError::Unauthorized)
    ));
    assert!(matches!(
        engine.deposit(&dormant, &tax_id, money("10")),
        Err(LedgerError::Unauthorized)
    ));
    assert!(matches!(
        engine.withdraw(&dormant, &tax_id, money("10")),
        Err(LedgerError::Unauthorized)
    ));
    assert!(matches!(
        engine.statement(&dormant, &tax_id),
        Err(LedgerError::Unauthorized)
    ));
}

#[test]
fn statement_preserves_application_order() {
    let engine = engine();
    let tax_id = tax_id();
    setup_account(&engine, &tax_id, 1001);
    let principal = active_principal();

    let applied = [
        (TransactionKind::Deposit, money("100")),
        (TransactionKind::Withdrawal, money("30")),
        (TransactionKind::Deposit, money("5.50")),
        (TransactionKind::Withdrawal, money("75.50")),
    ];
    for (kind, amount) in &applied {
        match kind {
            TransactionKind::Deposit => engine.deposit(&principal, &tax_id, *amount).unwrap(),
            TransactionKind::Withdrawal => engine.withdraw(&principal, &tax_id, *amount).unwrap(),
        };
    }

    let statement = engine.statement(&principal, &tax_id).unwrap();
    let log: Vec<(TransactionKind, Money)> =
        statement.iter().map(|t| (t.kind, t.amount)).collect();
    assert_eq!(log, applied);

    let sequences: Vec<u64> = statement.iter().map(|t| t.sequence).collect();
    assert_eq!(sequences, vec![1, 2, 3, 4]);
}

#[test]
fn exact_decimal_arithmetic_has_no_drift() {
    let engine = engine();
    let tax_id = tax_id();
    setup_account(&engine, &tax_id, 1001);
    let principal = active_principal();

    for _ in 0..3 {
        engine.deposit(&principal, &tax_id, money("0.10")).unwrap();
    }
    assert_eq!(balance_of(&engine, &tax_id), money("0.30"));
}

#[test]
fn concurrent_withdrawals_never_overdraw() {
    const WINNERS: usize = 8;
    const ATTEMPTS: usize = 16;
    let amount = money("10");

    let engine = engine();
    let tax_id = tax_id();
    setup_account(&engine, &tax_id, 1001);
    let principal = active_principal();
    engine
        .deposit(&principal, &tax_id, money("80"))
        .unwrap();

    let successes = AtomicUsize::new(0);
    std::thread::scope(|scope| {
        for _ in 0..ATTEMPTS {
            scope.spawn(|| {
                let principal = active_principal();
                match engine.withdraw(&principal, &tax_id, amount) {
                    Ok(_) => {
                        successes.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(LedgerError::InsufficientFunds { .. }) => {}
                    Err(other) => panic!("unexpected error: {other:?}"),
                }
            });
        }
    });

    assert_eq!(successes.load(Ordering::SeqCst), WINNERS);
    assert_eq!(balance_of(&engine, &tax_id), Money::ZERO);
    // Initial deposit + exactly WINNERS withdrawals.
    let statement = engine.statement(&principal, &tax_id).unwrap();
    assert_eq!(statement.len(), WINNERS + 1);
    let withdrawals = statement
        .iter()
        .filter(|t| t.kind == TransactionKind::Withdrawal)
        .count();
    assert_eq!(withdrawals, WINNERS);
}

proptest! {
    /// Property: deposit(x) then withdraw(x) restores the balance exactly.
    #[test]
    fn deposit_withdraw_round_trips(amounts in prop::collection::vec(1i64..1_000_000i64, 1..20)) {
        let engine = engine();
        let tax_id = tax_id();
        setup_account(&engine, &tax_id, 1001);
        let principal = active_principal();

        for units in amounts {
            let amount = Money::from_minor_units(units).unwrap();
            let before = balance_of(&engine, &tax_id);
            engine.deposit(&principal, &tax_id, amount).unwrap();
            engine.withdraw(&principal, &tax_id, amount).unwrap();
            prop_assert_eq!(balance_of(&engine, &tax_id), before);
        }
        prop_assert_eq!(balance_of(&engine, &tax_id), Money::ZERO);
    }

    /// Property: under any operation sequence the balance tracks the model
    /// and never goes negative.
    #[test]
    fn balance_never_goes_negative(
        ops in prop::collection::vec((any::<bool>(), 1i64..50_000i64), 1..40)
    ) {
        let engine = engine();
        let tax_id = tax_id();
        setup_account(&engine, &tax_id, 1001);
        let principal = active_principal();

        let mut model: i64 = 0;
        for (is_deposit, units) in ops {
            let amount = Money::from_minor_units(units).unwrap();
            if is_deposit {
                engine.deposit(&principal, &tax_id, amount).unwrap();
                model += units;
            } else if units <= model {
                engine.withdraw(&principal, &tax_id, amount).unwrap();
                model -= units;
            } else {
                let err = engine.withdraw(&principal, &tax_id, amount).unwrap_err();
                let is_insufficient = matches!(err, LedgerError::InsufficientFunds { .. });
                prop_assert!(is_insufficient);
            }

            let balance = balance_of(&engine, &tax_id);
            prop_assert_eq!(balance.minor_units(), model);
            prop_assert!(balance.minor_units() >= 0);
        }
    }
}
