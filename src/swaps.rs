// 6.0: swap record and net-settlement math. two card-price legs, each party
// collateralizing its own notional; at maturity only the difference between
// the legs' realized returns changes hands.
// state machine: Pending -> Active -> Settled, or Pending -> Cancelled.

use crate::types::{InstrumentId, Price, Quote, SwapId, Timestamp, TraderId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapStatus {
    Pending,
    Active,
    Settled,
    Cancelled,
}

impl SwapStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SwapStatus::Settled | SwapStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Swap {
    pub id: SwapId,
    pub party_a: TraderId,
    pub party_b: TraderId,
    pub instrument_a: InstrumentId,
    pub instrument_b: InstrumentId,
    pub notional_a: Quote,
    pub notional_b: Quote,
    /// Leg prices at inception, recorded from strict oracle reads at proposal.
    pub entry_price_a: Price,
    pub entry_price_b: Price,
    pub collateral_a: Quote,
    /// Zero until party B accepts.
    pub collateral_b: Quote,
    pub proposed_at: Timestamp,
    pub maturity: Timestamp,
    pub status: SwapStatus,
}

impl Swap {
    pub fn is_matured(&self, now: Timestamp) -> bool {
        now >= self.maturity
    }
}

// 6.1: realized return of one leg since inception: (mark - entry) / entry * notional.
// checked on the notional multiply, which takes an oracle-driven ratio.
pub fn leg_return(entry: Price, mark: Price, notional: Quote) -> Option<Quote> {
    let ratio = (mark.value() - entry.value()) / entry.value();
    notional.checked_mul(ratio)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapOutcome {
    pub payout_a: Quote,
    pub payout_b: Quote,
    /// Positive when leg A outperformed (party A receives the net).
    pub net: Quote,
}

// 6.2: netting. the winner is paid from the loser's collateral, capped at what
// the loser actually posted; payouts stay zero-sum over total posted collateral.
// checked where the two leg returns combine, since each can sit near the
// decimal range on its own.
pub fn net_settlement(
    return_a: Quote,
    return_b: Quote,
    collateral_a: Quote,
    collateral_b: Quote,
) -> Option<SwapOutcome> {
    let net = return_a.checked_sub(return_b)?;

    if net.value() >= Decimal::ZERO {
        let transfer = net.min(collateral_b);
        Some(SwapOutcome {
            payout_a: collateral_a.checked_add(transfer)?,
            payout_b: collateral_b.sub(transfer),
            net,
        })
    } else {
        let transfer = net.negate().min(collateral_a);
        Some(SwapOutcome {
            payout_a: collateral_a.sub(transfer),
            payout_b: collateral_b.checked_add(transfer)?,
            net,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn p(v: Decimal) -> Price {
        Price::new_unchecked(v)
    }

    #[test]
    fn leg_return_tracks_price_move() {
        // +50% on a 1000 notional
        let ret = leg_return(p(dec!(10)), p(dec!(15)), Quote::new(dec!(1000))).unwrap();
        assert_eq!(ret.value(), dec!(500));

        // -20%
        let ret = leg_return(p(dec!(10)), p(dec!(8)), Quote::new(dec!(1000))).unwrap();
        assert_eq!(ret.value(), dec!(-200));
    }

    #[test]
    fn netting_pays_winner_from_loser() {
        let outcome = net_settlement(
            Quote::new(dec!(500)),  // leg A up
            Quote::new(dec!(-200)), // leg B down
            Quote::new(dec!(150)),
            Quote::new(dec!(150)),
        )
        .unwrap();
        // net 700, but capped at B's 150 collateral
        assert_eq!(outcome.net.value(), dec!(700));
        assert_eq!(outcome.payout_a.value(), dec!(300));
        assert_eq!(outcome.payout_b.value(), dec!(0));
    }

    #[test]
    fn netting_is_zero_sum() {
        let ca = Quote::new(dec!(150));
        let cb = Quote::new(dec!(90));
        let outcome = net_settlement(Quote::new(dec!(-40)), Quote::new(dec!(10)), ca, cb).unwrap();

        assert_eq!(
            outcome.payout_a.add(outcome.payout_b),
            ca.add(cb),
            "collateral is conserved across the two payouts"
        );
        // A lost 50 net, paid from A's collateral
        assert_eq!(outcome.payout_a.value(), dec!(100));
        assert_eq!(outcome.payout_b.value(), dec!(140));
    }

    #[test]
    fn equal_legs_return_collateral_unchanged() {
        let outcome = net_settlement(
            Quote::new(dec!(120)),
            Quote::new(dec!(120)),
            Quote::new(dec!(150)),
            Quote::new(dec!(90)),
        )
        .unwrap();
        assert_eq!(outcome.payout_a.value(), dec!(150));
        assert_eq!(outcome.payout_b.value(), dec!(90));
        assert_eq!(outcome.net, Quote::zero());
    }

    #[test]
    fn opposed_extreme_returns_fail_instead_of_panicking() {
        let outcome = net_settlement(
            Quote::new(Decimal::MAX - dec!(100)),
            Quote::new(-(Decimal::MAX - dec!(100))),
            Quote::new(dec!(150)),
            Quote::new(dec!(90)),
        );
        assert!(outcome.is_none());
    }
}
