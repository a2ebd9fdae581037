use std::sync::atomic::Ordering;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use zippin_common::ledger::DEFAULT_SEED_BALANCE;
use zippin_common::{LedgerError, TransactionKind, WalletLedger};
use zippin_ride_integration::harness::Rider;
use zippin_ride_integration::{at, expected_balance, init_tracing, SwitchableStore};

/// The wallet screen's "Add $5" from a fresh wallet.
#[test]
fn five_dollar_top_up_from_seed() {
    let mut rider = Rider::setup();
    rider.top_up(dec!(5));

    assert_eq!(rider.ledger.balance(), dec!(17.42));
    let head = &rider.ledger.history()[0];
    assert_eq!(head.kind(), TransactionKind::TopUp);
    assert_eq!(head.amount(), dec!(5.00));
}

/// Balance is exactly seed + credits - debits, history length equals the
/// number of operations, newest first.
#[test]
fn mixed_sequence_keeps_balance_exact() {
    let mut rider = Rider::setup();
    let credits = [dec!(0.1), dec!(0.2), dec!(0.3), dec!(10)];
    let debits = [dec!(0.07), dec!(1.2541666666666666666666666667), dec!(3.33)];

    for c in credits {
        rider.top_up(c);
    }
    for (i, d) in debits.iter().enumerate() {
        rider.ledger.debit_at(*d, None, at(100 + i as i64)).unwrap();
    }

    assert_eq!(
        rider.ledger.balance(),
        expected_balance(DEFAULT_SEED_BALANCE, &credits, &debits)
    );
    let history = rider.ledger.history();
    assert_eq!(history.len(), credits.len() + debits.len());
    assert_eq!(history[0].amount(), dec!(3.33));
    assert_eq!(history.last().unwrap().amount(), dec!(0.1));
    assert!(history.windows(2).all(|w| w[0].timestamp() >= w[1].timestamp()));
}

#[test]
fn non_positive_amounts_rejected_without_side_effects() {
    let mut rider = Rider::setup();
    for amount in [Decimal::ZERO, dec!(-5)] {
        assert!(matches!(
            rider.ledger.credit_at(amount, at(0)),
            Err(LedgerError::InvalidAmount(_))
        ));
        assert!(matches!(
            rider.ledger.debit_at(amount, None, at(0)),
            Err(LedgerError::InvalidAmount(_))
        ));
    }
    assert!(rider.ledger.credit_at(dec!(0.01), at(0)).is_ok());
    assert_eq!(rider.ledger.history().len(), 1);
}

/// Whatever was written before a restart comes back verbatim.
#[test]
fn wallet_survives_restart() {
    let mut rider = Rider::setup();
    rider.top_up(dec!(5));
    rider.ride_for(120).unwrap();
    let before = rider.ledger.state().clone();

    rider.restart();
    assert_eq!(rider.ledger.state(), &before);
    assert_eq!(rider.ledger.seed_balance(), DEFAULT_SEED_BALANCE);

    rider.top_up(dec!(1));
    assert_eq!(rider.ledger.balance(), before.balance + dec!(1));
}

/// A failed write never rolls back what the user already sees; the next
/// successful write carries it to storage.
#[test]
fn storage_outage_keeps_in_memory_state() {
    init_tracing();
    let store = SwitchableStore::new();
    let outage = store.switch();
    let mut ledger = WalletLedger::open(store, DEFAULT_SEED_BALANCE).unwrap();
    ledger.credit_at(dec!(5), at(0)).unwrap();

    outage.store(true, Ordering::SeqCst);
    let receipt = ledger.debit_at(dec!(2), None, at(1)).unwrap();
    assert!(receipt.persist_warning.is_some());
    assert_eq!(receipt.balance, dec!(15.42));
    assert_eq!(ledger.balance(), dec!(15.42));
    assert!(ledger.needs_flush());
    // first attempt and one retry
    assert_eq!(ledger.store().failed_writes, 2);

    outage.store(false, Ordering::SeqCst);
    ledger.credit_at(dec!(1), at(2)).unwrap();
    assert!(!ledger.needs_flush());

    let reloaded = WalletLedger::open(ledger.into_store(), DEFAULT_SEED_BALANCE).unwrap();
    assert_eq!(reloaded.balance(), dec!(16.42));
    assert_eq!(reloaded.history().len(), 3);
}

#[test]
fn flush_after_outage_persists_pending_state() {
    init_tracing();
    let store = SwitchableStore::new();
    let outage = store.switch();
    outage.store(true, Ordering::SeqCst);
    let mut ledger = WalletLedger::open(store, DEFAULT_SEED_BALANCE).unwrap();

    ledger.credit_at(dec!(5), at(0)).unwrap();
    assert!(ledger.flush().is_err());
    assert!(ledger.needs_flush());

    outage.store(false, Ordering::SeqCst);
    ledger.flush().unwrap();
    assert!(!ledger.needs_flush());

    let reloaded = WalletLedger::open(ledger.into_store(), Decimal::ZERO).unwrap();
    assert_eq!(reloaded.balance(), dec!(17.42));
}
