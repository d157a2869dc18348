// 8.0.1: ledger configuration. all tunable constants in one place.

use crate::collateral::CollateralParams;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub collateral: CollateralParams,
    /// Fraction of posted collateral that paper losses must reach before a
    /// position becomes liquidatable. Below 1 so liquidation fires strictly
    /// before the collateral is exhausted.
    pub liquidation_threshold: Decimal,
    pub max_events: usize,
    pub verbose: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            collateral: CollateralParams::default(),
            liquidation_threshold: dec!(0.8),
            max_events: 10_000,
            verbose: false,
        }
    }
}
