// 4.0: futures position record and the pure math behind marking, settlement
// and liquidation. pnl = sign * (mark - strike) * quantity.
// state machine: Active -> {Settled | Liquidated | Cancelled}, terminal on the right.

use crate::types::{InstrumentId, Price, PositionId, Quote, Side, Timestamp, TraderId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// per-instrument-kind status. never a raw numeric code shared across kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FuturesStatus {
    Active,
    Settled,
    Liquidated,
    Cancelled,
}

impl FuturesStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, FuturesStatus::Active)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuturesPosition {
    pub id: PositionId,
    pub trader: TraderId,
    pub instrument: InstrumentId,
    pub side: Side,
    pub strike: Price,
    pub quantity: Decimal,
    pub collateral: Quote,
    pub opened_at: Timestamp,
    pub expiry: Timestamp,
    pub status: FuturesStatus,
}

impl FuturesPosition {
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expiry
    }

    pub fn unrealized_pnl(&self, mark: Price) -> Option<Quote> {
        calculate_unrealized_pnl(self.side, self.strike, self.quantity, mark)
    }
}

// 4.1: the pnl formula. Long: (mark - strike) * qty, Short: (strike - mark) * qty.
// checked: the mark comes from the oracle unbounded, so the quantity multiply
// can exceed the decimal range. None means overflow, mapped to a typed error
// at the ledger boundary.
pub fn calculate_unrealized_pnl(
    side: Side,
    strike: Price,
    quantity: Decimal,
    mark: Price,
) -> Option<Quote> {
    (mark.value() - strike.value())
        .checked_mul(quantity)
        .and_then(|gross| gross.checked_mul(side.sign()))
        .map(Quote::new)
}

// 4.2: liquidation trigger. fires once paper losses eat through
// liquidation_threshold of posted collateral, which is strictly before the
// collateral is fully exhausted, so no position ever carries negative equity.
pub fn is_liquidatable(pnl: Quote, collateral: Quote, liquidation_threshold: Decimal) -> bool {
    pnl.value() <= -(collateral.value() * liquidation_threshold)
}

// 4.3: settlement payout. collateral plus pnl, clipped at zero: losses past
// posted collateral are never charged back to the trader.
pub fn settlement_payout(collateral: Quote, pnl: Quote) -> Option<Quote> {
    collateral.checked_add(pnl).map(|q| q.clamp_non_negative())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn mark(p: Decimal) -> Price {
        Price::new_unchecked(p)
    }

    #[test]
    fn pnl_long_and_short_mirror() {
        let strike = mark(dec!(10));
        let pnl_long =
            calculate_unrealized_pnl(Side::Long, strike, dec!(1), mark(dec!(15))).unwrap();
        let pnl_short =
            calculate_unrealized_pnl(Side::Short, strike, dec!(1), mark(dec!(15))).unwrap();
        assert_eq!(pnl_long.value(), dec!(5));
        assert_eq!(pnl_short.value(), dec!(-5));
    }

    #[test]
    fn pnl_scales_with_quantity() {
        let pnl =
            calculate_unrealized_pnl(Side::Long, mark(dec!(10)), dec!(4), mark(dec!(12))).unwrap();
        assert_eq!(pnl.value(), dec!(8));
    }

    #[test]
    fn pnl_overflow_is_none_not_panic() {
        let pnl = calculate_unrealized_pnl(
            Side::Long,
            mark(dec!(1)),
            Decimal::MAX / dec!(2),
            mark(Decimal::MAX / dec!(2)),
        );
        assert!(pnl.is_none());
    }

    #[test]
    fn liquidation_threshold_boundary() {
        let collateral = Quote::new(dec!(2)); // strike 10, qty 1, 20% margin
        let threshold = dec!(0.8);

        // crash from 10 to 2: pnl -8, far past -1.6
        let crash_pnl =
            calculate_unrealized_pnl(Side::Long, mark(dec!(10)), dec!(1), mark(dec!(2))).unwrap();
        assert!(is_liquidatable(crash_pnl, collateral, threshold));

        // rally to 15: healthy profit, never liquidatable
        let up_pnl =
            calculate_unrealized_pnl(Side::Long, mark(dec!(10)), dec!(1), mark(dec!(15))).unwrap();
        assert!(!is_liquidatable(up_pnl, collateral, threshold));

        // exactly at the threshold counts as liquidatable
        assert!(is_liquidatable(Quote::new(dec!(-1.6)), collateral, threshold));
        assert!(!is_liquidatable(Quote::new(dec!(-1.59)), collateral, threshold));
    }

    #[test]
    fn liquidation_monotone_in_adverse_moves() {
        let collateral = Quote::new(dec!(2));
        let threshold = dec!(0.8);
        let strike = mark(dec!(10));

        let mut worse = dec!(2);
        while worse > dec!(0.5) {
            let pnl = calculate_unrealized_pnl(Side::Long, strike, dec!(1), mark(worse)).unwrap();
            assert!(is_liquidatable(pnl, collateral, threshold));
            worse -= dec!(0.25);
        }
    }

    #[test]
    fn payout_clipped_at_zero() {
        let collateral = Quote::new(dec!(2));
        assert_eq!(
            settlement_payout(collateral, Quote::new(dec!(-8))).unwrap(),
            Quote::zero()
        );
        assert_eq!(
            settlement_payout(collateral, Quote::new(dec!(5))).unwrap().value(),
            dec!(7)
        );
        // mark == strike: exactly the posted collateral comes back
        assert_eq!(
            settlement_payout(collateral, Quote::zero()).unwrap(),
            collateral
        );
    }

    #[test]
    fn terminal_statuses() {
        assert!(!FuturesStatus::Active.is_terminal());
        assert!(FuturesStatus::Settled.is_terminal());
        assert!(FuturesStatus::Liquidated.is_terminal());
        assert!(FuturesStatus::Cancelled.is_terminal());
    }
}
