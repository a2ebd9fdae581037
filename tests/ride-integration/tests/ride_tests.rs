use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use zippin_common::ride::RideState;
use zippin_common::{FareSchedule, RideError, RideSession, TransactionKind};
use zippin_ride_integration::harness::Rider;
use zippin_ride_integration::{at, init_tracing};

/// Two minutes at the standard fares: $1.00 unlock + 2 × $0.25.
#[test]
fn two_minute_ride_is_charged_and_recorded() {
    let mut rider = Rider::setup();
    let receipt = rider.ride_for(120).unwrap();

    let summary = &receipt.summary;
    assert_eq!(summary.duration_seconds, 120);
    assert_eq!(summary.distance_km, dec!(0.6));
    assert_eq!(summary.cost, dec!(1.50));
    assert_eq!(summary.co2_saved_kg, dec!(0.126));

    assert_eq!(rider.ledger.balance(), dec!(10.92));
    let head = &rider.ledger.history()[0];
    assert_eq!(head.kind(), TransactionKind::RidePayment);
    assert_eq!(head.amount(), dec!(1.50));
    assert_eq!(head.ride(), Some(&summary.details()));
    assert_eq!(head.timestamp(), summary.timestamp);
}

#[test]
fn cost_never_below_unlock_fee() {
    let mut rider = Rider::with_seed(dec!(100));
    for seconds in [0, 1, 59, 60, 61, 3600] {
        let receipt = rider.ride_for(seconds).unwrap();
        assert!(receipt.summary.cost >= rider.fare.unlock_fee);
    }
    let hour = &rider.ledger.history()[0];
    assert_eq!(hour.amount(), dec!(16.00));
}

/// Starting with less than the unlock fee leaves the wallet and session untouched.
#[test]
fn insufficient_funds_blocks_the_ride() {
    let mut rider = Rider::with_seed(dec!(0.99));
    let err = rider.ride_for(10).unwrap_err();
    assert_eq!(
        err,
        RideError::InsufficientFunds {
            available: dec!(0.99),
            required: dec!(1.00),
        }
    );
    assert!(rider.ledger.history().is_empty());

    rider.top_up(dec!(0.01));
    assert!(rider.ride_for(0).is_ok());
}

/// The ledger allows a ride that started with enough funds to end below zero.
#[test]
fn long_ride_can_overdraw() {
    let mut rider = Rider::with_seed(dec!(1.00));
    rider.ride_for(600).unwrap();
    assert_eq!(rider.ledger.balance(), dec!(-2.50));

    // and the next ride is refused until topped up
    assert!(matches!(
        rider.ride_for(1),
        Err(RideError::InsufficientFunds { .. })
    ));
}

#[test]
fn stopping_an_idle_session_changes_nothing() {
    let mut rider = Rider::setup();
    rider.top_up(dec!(5));
    let before = rider.ledger.state().clone();

    let mut session = RideSession::new(FareSchedule::default());
    assert!(rider
        .ledger
        .finish_ride_at(&mut session, at(10))
        .unwrap()
        .is_none());
    assert!(session.stop(at(11)).is_none());
    assert_eq!(rider.ledger.state(), &before);
}

#[test]
fn only_one_active_ride_per_session() {
    init_tracing();
    let mut rider = Rider::setup();
    let mut session = RideSession::default();
    rider.ledger.start_ride(&mut session).unwrap();
    assert_eq!(
        rider.ledger.start_ride(&mut session),
        Err(RideError::AlreadyActive)
    );

    session.tick();
    let receipt = rider
        .ledger
        .finish_ride_at(&mut session, at(1))
        .unwrap()
        .unwrap();
    assert_eq!(receipt.summary.duration_seconds, 1);
    assert_eq!(session.state(), &RideState::Idle);
    assert!(!session.tick());

    // a late finish after settlement does not charge twice
    assert!(rider
        .ledger
        .finish_ride_at(&mut session, at(2))
        .unwrap()
        .is_none());
    assert_eq!(rider.ledger.history().len(), 1);
}

#[test]
fn custom_fares_flow_through() {
    let mut rider = Rider::setup();
    rider.fare = FareSchedule {
        unlock_fee: dec!(0.50),
        per_minute_rate: dec!(0.30),
        ..FareSchedule::default()
    };
    let receipt = rider.ride_for(90).unwrap();
    assert_eq!(receipt.summary.cost, dec!(0.95));
    let payment = receipt.payment.unwrap();
    assert_eq!(payment.balance, dec!(12.42) - dec!(0.95));
    assert_ne!(payment.balance, Decimal::ZERO);
}
