//! Card Derivatives Engine Simulation.
//!
//! Walks the full engine lifecycle: feeding the oracle, a futures round trip,
//! a crash liquidation, an option exercise, and a netted swap.

use cardex_core::*;
use rust_decimal_macros::dec;

fn main() {
    println!("Card Derivatives Core Engine Simulation");
    println!("Oracle, Futures, Options, Swaps\n");

    scenario_1_oracle_feed();
    scenario_2_futures_round_trip();
    scenario_3_crash_liquidation();
    scenario_4_option_exercise();
    scenario_5_swap_netting();

    println!("\nAll simulations completed successfully.");
}

const ORACLE_OWNER: TraderId = TraderId(1);

fn ledger() -> Ledger {
    Ledger::new(ORACLE_OWNER, LedgerConfig::default())
}

/// Authenticated price feed with averages and staleness.
fn scenario_1_oracle_feed() {
    println!("Scenario 1: Oracle Feed\n");

    let mut ledger = ledger();
    let card = InstrumentId::from("charizard-base-psa10");

    ledger.set_time(Timestamp::from_secs(0));
    for (day, price) in [dec!(400), dec!(410), dec!(430)].iter().enumerate() {
        ledger.set_time(Timestamp::from_secs(day as i64 * SECONDS_PER_DAY));
        ledger
            .update_price(ORACLE_OWNER, card.clone(), *price, 95)
            .unwrap();
    }

    let latest = ledger.oracle().get_price(&card).unwrap();
    println!("  Latest: ${} (confidence {})", latest.price, latest.confidence);
    println!("  3-period average: ${}", ledger.oracle().average_price(&card, 3).unwrap());
    println!("  Stale within 1h? {}\n", ledger.is_price_stale(&card, 3_600));
}

/// Open, hold to expiry, settle at a profit.
fn scenario_2_futures_round_trip() {
    println!("Scenario 2: Futures Round Trip\n");

    let mut ledger = ledger();
    let card = InstrumentId::from("black-lotus-alpha");
    let alice = TraderId(10);

    ledger
        .update_price(ORACLE_OWNER, card.clone(), dec!(25000), 98)
        .unwrap();

    let id = ledger
        .open_position(
            alice,
            card.clone(),
            Side::Long,
            dec!(25000),
            dec!(1),
            30 * SECONDS_PER_DAY,
            Quote::new(dec!(5000)), // 20% of notional
        )
        .unwrap();
    println!("  Alice opens LONG 1 @ $25,000 with $5,000 collateral");

    ledger.advance_time(30 * SECONDS_PER_DAY);
    ledger
        .update_price(ORACLE_OWNER, card.clone(), dec!(27000), 98)
        .unwrap();

    let result = ledger.settle_position(id).unwrap();
    println!("  Settled at ${}: pnl ${}, payout ${}\n", result.mark_price, result.pnl, result.payout);
}

/// A crash breaches maintenance; anyone may liquidate.
fn scenario_3_crash_liquidation() {
    println!("Scenario 3: Crash Liquidation\n");

    let mut ledger = ledger();
    let card = InstrumentId::from("pikachu-illustrator");
    let bob = TraderId(20);
    let keeper = TraderId(99);

    ledger
        .update_price(ORACLE_OWNER, card.clone(), dec!(10), 90)
        .unwrap();

    let id = ledger
        .open_position(
            bob,
            card.clone(),
            Side::Long,
            dec!(10),
            dec!(100),
            30 * SECONDS_PER_DAY,
            Quote::new(dec!(200)),
        )
        .unwrap();
    println!("  Bob opens LONG 100 @ $10 with $200 collateral");

    ledger.advance_time(SECONDS_PER_DAY);
    ledger
        .update_price(ORACLE_OWNER, card.clone(), dec!(2), 90)
        .unwrap();

    println!("  Price crashes to $2, liquidatable: {}", ledger.can_liquidate(id).unwrap());
    let result = ledger.liquidate_position(keeper, id).unwrap();
    println!(
        "  Liquidated by keeper {:?}: pnl ${}, residual returned ${}, pool now ${}\n",
        result.liquidator.0,
        result.pnl,
        result.residual_returned,
        ledger.pool_balance()
    );
}

/// Covered call listed, purchased, and exercised in the money.
fn scenario_4_option_exercise() {
    println!("Scenario 4: Option Exercise\n");

    let mut ledger = ledger();
    let card = InstrumentId::from("blue-eyes-1st-ed");
    let seller = TraderId(30);
    let buyer = TraderId(31);

    ledger
        .update_price(ORACLE_OWNER, card.clone(), dec!(100), 92)
        .unwrap();

    let id = ledger
        .create_option(
            seller,
            card.clone(),
            OptionKind::Call,
            dec!(100),
            dec!(8),
            dec!(2),
            60 * SECONDS_PER_DAY,
            Quote::new(dec!(200)), // full notional
        )
        .unwrap();
    println!("  Seller lists CALL strike $100 x2, premium $8, escrow $200");

    ledger.purchase_option(buyer, id).unwrap();
    ledger.advance_time(10 * SECONDS_PER_DAY);
    ledger
        .update_price(ORACLE_OWNER, card.clone(), dec!(130), 92)
        .unwrap();

    println!("  Mark $130, in the money: {}", ledger.is_in_the_money(id).unwrap());
    let result = ledger.exercise_option(buyer, id).unwrap();
    println!(
        "  Exercised: payoff ${}, ${} back to seller\n",
        result.payoff, result.collateral_returned_to_seller
    );
}

/// Two card legs, netted at maturity.
fn scenario_5_swap_netting() {
    println!("Scenario 5: Swap Netting\n");

    let mut ledger = ledger();
    let leg_a = InstrumentId::from("mox-sapphire");
    let leg_b = InstrumentId::from("time-walk");
    let alice = TraderId(40);
    let bob = TraderId(41);

    ledger.update_price(ORACLE_OWNER, leg_a.clone(), dec!(50), 90).unwrap();
    ledger.update_price(ORACLE_OWNER, leg_b.clone(), dec!(40), 90).unwrap();

    let id = ledger
        .propose_swap(
            alice,
            bob,
            leg_a.clone(),
            dec!(1000),
            leg_b.clone(),
            dec!(1000),
            90 * SECONDS_PER_DAY,
            Quote::new(dec!(150)),
        )
        .unwrap();
    ledger.accept_swap(bob, id, Quote::new(dec!(150))).unwrap();
    println!("  Alice and Bob each escrow $150 on $1,000 legs");

    ledger.advance_time(90 * SECONDS_PER_DAY);
    ledger.update_price(ORACLE_OWNER, leg_a.clone(), dec!(55), 90).unwrap(); // +10%
    ledger.update_price(ORACLE_OWNER, leg_b.clone(), dec!(38), 90).unwrap(); // -5%

    let result = ledger.settle_swap(id).unwrap();
    println!(
        "  Leg A return ${}, leg B return ${}, net ${}",
        result.return_a, result.return_b, result.net
    );
    println!("  Payouts: Alice ${}, Bob ${}", result.payout_a, result.payout_b);
}
