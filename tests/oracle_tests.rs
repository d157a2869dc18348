//! Oracle surface tests through the ledger: authorization, batch atomicity,
//! the strict/permissive read split, history, averages, and staleness.

use cardex_core::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const OWNER: TraderId = TraderId(1);
const FEEDER: TraderId = TraderId(2);
const OUTSIDER: TraderId = TraderId(66);

fn card() -> InstrumentId {
    InstrumentId::from("charizard-base-psa10")
}

fn ledger() -> Ledger {
    let mut ledger = Ledger::new(OWNER, LedgerConfig::default());
    ledger.set_time(Timestamp::from_secs(0));
    ledger
}

#[test]
fn owner_and_updaters_write_outsiders_do_not() {
    let mut ledger = ledger();

    assert!(matches!(
        ledger.update_price(OUTSIDER, card(), dec!(400), 95),
        Err(LedgerError::Oracle(OracleError::Unauthorized(_)))
    ));

    ledger.update_price(OWNER, card(), dec!(400), 95).unwrap();

    ledger.add_price_updater(OWNER, FEEDER).unwrap();
    ledger.advance_time(60);
    ledger.update_price(FEEDER, card(), dec!(410), 90).unwrap();

    ledger.remove_price_updater(OWNER, FEEDER).unwrap();
    assert!(matches!(
        ledger.update_price(FEEDER, card(), dec!(420), 90),
        Err(LedgerError::Oracle(OracleError::Unauthorized(_)))
    ));

    // updater management itself is owner-only
    assert!(matches!(
        ledger.add_price_updater(FEEDER, OUTSIDER),
        Err(LedgerError::Oracle(OracleError::Unauthorized(_)))
    ));
}

#[test]
fn invalid_confidence_and_price_rejected() {
    let mut ledger = ledger();

    assert!(matches!(
        ledger.update_price(OWNER, card(), dec!(400), 101),
        Err(LedgerError::Oracle(OracleError::InvalidConfidence(101)))
    ));
    assert!(matches!(
        ledger.update_price(OWNER, card(), dec!(0), 95),
        Err(LedgerError::Oracle(OracleError::InvalidPrice(_)))
    ));
    assert_eq!(ledger.oracle().observation_count(&card()), 0);
}

#[test]
fn batch_update_is_atomic() {
    let mut ledger = ledger();

    let good = vec![
        PriceUpdate::new("a", dec!(10), 90),
        PriceUpdate::new("b", dec!(20), 85),
        PriceUpdate::new("a", dec!(11), 90),
    ];
    assert_eq!(ledger.update_prices(OWNER, &good).unwrap(), 3);
    assert_eq!(ledger.oracle().observation_count(&InstrumentId::from("a")), 2);

    // one poisoned entry rolls back the whole batch
    let poisoned = vec![
        PriceUpdate::new("a", dec!(12), 90),
        PriceUpdate::new("c", dec!(30), 120),
    ];
    assert!(matches!(
        ledger.update_prices(OWNER, &poisoned),
        Err(LedgerError::Oracle(OracleError::InvalidConfidence(120)))
    ));
    assert_eq!(ledger.oracle().observation_count(&InstrumentId::from("a")), 2);
    assert_eq!(ledger.oracle().observation_count(&InstrumentId::from("c")), 0);
}

#[test]
fn strict_and_permissive_reads_split_on_deactivation() {
    let mut ledger = ledger();
    ledger.update_price(OWNER, card(), dec!(400), 95).unwrap();

    assert!(matches!(
        ledger.deactivate_price_feed(OUTSIDER, &card()),
        Err(LedgerError::Oracle(OracleError::Unauthorized(_)))
    ));
    ledger.deactivate_price_feed(OWNER, &card()).unwrap();

    // strict read fails even though history is non-empty
    assert!(matches!(
        ledger.oracle().get_price(&card()),
        Err(OracleError::FeedInactive(_))
    ));
    // permissive read still serves the last observation
    assert_eq!(ledger.oracle().latest_price_or_zero(&card()), dec!(400));
    // history survives deactivation
    assert_eq!(ledger.oracle().price_history(&card()).unwrap().len(), 1);

    ledger.activate_price_feed(OWNER, &card()).unwrap();
    assert_eq!(ledger.oracle().get_price(&card()).unwrap().price.value(), dec!(400));
}

#[test]
fn unpriced_instrument_reads() {
    let ledger = ledger();

    assert!(matches!(
        ledger.oracle().get_price(&card()),
        Err(OracleError::UnknownInstrument(_))
    ));
    assert_eq!(ledger.oracle().latest_price_or_zero(&card()), Decimal::ZERO);
    assert!(matches!(
        ledger.oracle().average_price(&card(), 3),
        Err(OracleError::NoData(_))
    ));
    assert!(matches!(
        ledger.oracle().price_history(&card()),
        Err(OracleError::UnknownInstrument(_))
    ));
    // unpriced is always stale
    assert!(ledger.is_price_stale(&card(), i64::MAX - 1));
}

#[test]
fn history_is_ordered_and_averages_use_recent_window() {
    let mut ledger = ledger();
    for (i, p) in [dec!(10), dec!(20), dec!(30)].iter().enumerate() {
        ledger.set_time(Timestamp::from_secs(i as i64 * 60));
        ledger.update_price(OWNER, card(), *p, 95).unwrap();
    }

    let history = ledger.oracle().price_history(&card()).unwrap();
    assert_eq!(history.len(), 3);
    assert!(history.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

    assert_eq!(ledger.oracle().average_price(&card(), 3).unwrap(), dec!(20));
    assert_eq!(ledger.oracle().average_price(&card(), 2).unwrap(), dec!(25));
    assert_eq!(ledger.oracle().average_price(&card(), 100).unwrap(), dec!(20));
    assert!(matches!(
        ledger.oracle().average_price(&card(), 0),
        Err(OracleError::NoData(_))
    ));
}

#[test]
fn staleness_follows_the_ledger_clock() {
    let mut ledger = ledger();
    ledger.set_time(Timestamp::from_secs(1_000));
    ledger.update_price(OWNER, card(), dec!(400), 95).unwrap();

    // fresh immediately after update, for any max age including zero
    assert!(!ledger.is_price_stale(&card(), 0));
    assert!(!ledger.is_price_stale(&card(), 3_600));

    ledger.advance_time(3_600);
    assert!(!ledger.is_price_stale(&card(), 3_600));
    ledger.advance_time(1);
    assert!(ledger.is_price_stale(&card(), 3_600));

    // staleness ignores the active flag
    ledger.deactivate_price_feed(OWNER, &card()).unwrap();
    assert!(ledger.is_price_stale(&card(), 3_600));
    assert!(!ledger.is_price_stale(&card(), 7_200));
}

#[test]
fn price_events_are_emitted() {
    let mut ledger = ledger();
    ledger.update_price(OWNER, card(), dec!(400), 95).unwrap();
    ledger.deactivate_price_feed(OWNER, &card()).unwrap();

    assert!(ledger.events().iter().any(|e| matches!(e.payload, EventPayload::PriceUpdated(_))));
    assert!(ledger
        .events()
        .iter()
        .any(|e| matches!(e.payload, EventPayload::FeedDeactivated(_))));
}
