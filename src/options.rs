// 5.0: option contract record and intrinsic-value math. the seller posts the
// full notional at listing; the buyer binds with a premium and may exercise
// any time while the contract is live.
// state machine: Active -> {Exercised | Expired | Cancelled}.

use crate::types::{InstrumentId, OptionId, Price, Quote, Timestamp, TraderId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionKind {
    Call,
    Put,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionStatus {
    Active,
    Exercised,
    Expired,
    Cancelled,
}

impl OptionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OptionStatus::Active)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionContract {
    pub id: OptionId,
    pub seller: TraderId,
    pub buyer: Option<TraderId>,
    pub instrument: InstrumentId,
    pub kind: OptionKind,
    pub strike: Price,
    pub premium: Quote,
    pub quantity: Decimal,
    /// Full notional escrowed by the seller at creation.
    pub collateral: Quote,
    pub created_at: Timestamp,
    pub expiry: Timestamp,
    pub status: OptionStatus,
}

impl OptionContract {
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expiry
    }

    pub fn is_in_the_money(&self, mark: Price) -> bool {
        match self.kind {
            OptionKind::Call => mark.value() > self.strike.value(),
            OptionKind::Put => mark.value() < self.strike.value(),
        }
    }

    pub fn exercise_payoff(&self, mark: Price) -> Option<Quote> {
        exercise_payoff(self.kind, self.strike, self.quantity, mark, self.collateral)
    }
}

// 5.1: per-unit intrinsic value, floored at zero.
pub fn intrinsic_value(kind: OptionKind, strike: Price, mark: Price) -> Decimal {
    let raw = match kind {
        OptionKind::Call => mark.value() - strike.value(),
        OptionKind::Put => strike.value() - mark.value(),
    };
    raw.max(Decimal::ZERO)
}

// 5.2: buyer payoff on exercise, capped at the seller's escrow. the cap is the
// hard solvency bound: an option can never pay out more than was posted.
// checked: the mark is oracle-supplied and unbounded, so the gross payoff
// multiply can overflow before the cap applies.
pub fn exercise_payoff(
    kind: OptionKind,
    strike: Price,
    quantity: Decimal,
    mark: Price,
    escrowed: Quote,
) -> Option<Quote> {
    intrinsic_value(kind, strike, mark)
        .checked_mul(quantity)
        .map(|gross| Quote::new(gross).min(escrowed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn p(v: Decimal) -> Price {
        Price::new_unchecked(v)
    }

    #[test]
    fn call_moneyness() {
        assert_eq!(intrinsic_value(OptionKind::Call, p(dec!(50)), p(dec!(60))), dec!(10));
        assert_eq!(intrinsic_value(OptionKind::Call, p(dec!(50)), p(dec!(40))), dec!(0));
        assert_eq!(intrinsic_value(OptionKind::Call, p(dec!(50)), p(dec!(50))), dec!(0));
    }

    #[test]
    fn put_moneyness() {
        assert_eq!(intrinsic_value(OptionKind::Put, p(dec!(50)), p(dec!(40))), dec!(10));
        assert_eq!(intrinsic_value(OptionKind::Put, p(dec!(50)), p(dec!(60))), dec!(0));
    }

    #[test]
    fn payoff_capped_at_escrow() {
        // strike 50, qty 2 -> escrow 100. mark 120 -> raw payoff 140, capped.
        let payoff = exercise_payoff(
            OptionKind::Call,
            p(dec!(50)),
            dec!(2),
            p(dec!(120)),
            Quote::new(dec!(100)),
        )
        .unwrap();
        assert_eq!(payoff.value(), dec!(100));

        // in-range payoff passes through uncapped
        let payoff = exercise_payoff(
            OptionKind::Call,
            p(dec!(50)),
            dec!(2),
            p(dec!(70)),
            Quote::new(dec!(100)),
        )
        .unwrap();
        assert_eq!(payoff.value(), dec!(40));
    }

    #[test]
    fn payoff_overflow_is_none_not_panic() {
        let payoff = exercise_payoff(
            OptionKind::Call,
            p(dec!(1)),
            Decimal::MAX / dec!(2),
            p(Decimal::MAX / dec!(2)),
            Quote::new(dec!(100)),
        );
        assert!(payoff.is_none());
    }

    #[test]
    fn contract_moneyness_delegates() {
        let contract = OptionContract {
            id: OptionId(1),
            seller: TraderId(1),
            buyer: Some(TraderId(2)),
            instrument: InstrumentId::from("pikachu-illustrator"),
            kind: OptionKind::Put,
            strike: p(dec!(80)),
            premium: Quote::new(dec!(4)),
            quantity: dec!(1),
            collateral: Quote::new(dec!(80)),
            created_at: Timestamp::from_secs(0),
            expiry: Timestamp::from_secs(1_000_000),
            status: OptionStatus::Active,
        };
        assert!(contract.is_in_the_money(p(dec!(60))));
        assert!(!contract.is_in_the_money(p(dec!(90))));
        assert_eq!(contract.exercise_payoff(p(dec!(60))).unwrap().value(), dec!(20));
    }
}
