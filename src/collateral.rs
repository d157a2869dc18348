//! Collateral requirements for every instrument kind.
//!
//! Pure and stateless: parameters in, required escrow out. The ledger calls
//! these at entry and rejects any open whose escrowed value falls below the
//! formula, even by one unit.
//!
//! Ratios: futures post 20% of notional, option sellers post the full
//! notional (they must be able to deliver at strike), swap parties each post
//! 15% of their own leg's notional.

use crate::types::{Price, Quote, Timestamp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

pub const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollateralParams {
    pub futures_margin_ratio: Decimal,
    pub swap_margin_ratio: Decimal,
    /// Sub-day positions are rejected; there is no day-trading tier.
    pub min_duration_secs: i64,
    pub max_duration_secs: i64,
}

impl Default for CollateralParams {
    fn default() -> Self {
        Self {
            futures_margin_ratio: dec!(0.20),
            swap_margin_ratio: dec!(0.15),
            min_duration_secs: SECONDS_PER_DAY,
            max_duration_secs: 365 * SECONDS_PER_DAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollateralError {
    #[error("duration {requested}s is outside [{min}s, {max}s]")]
    InvalidDuration {
        requested: i64,
        min: i64,
        max: i64,
    },

    #[error("collateral amount overflows the decimal range")]
    Overflow,
}

// checked multiplies throughout: strike and quantity are caller-supplied, so
// the notional product can exceed the decimal range and must fail typed
pub fn futures_required_collateral(
    strike: Price,
    quantity: Decimal,
    params: &CollateralParams,
) -> Result<Quote, CollateralError> {
    strike
        .value()
        .checked_mul(quantity)
        .and_then(|notional| notional.checked_mul(params.futures_margin_ratio))
        .map(Quote::new)
        .ok_or(CollateralError::Overflow)
}

// fully covered: the seller must be able to deliver at strike
pub fn option_required_collateral(
    strike: Price,
    quantity: Decimal,
) -> Result<Quote, CollateralError> {
    strike
        .value()
        .checked_mul(quantity)
        .map(Quote::new)
        .ok_or(CollateralError::Overflow)
}

// computed independently per party since leg notionals may differ
pub fn swap_leg_collateral(
    notional: Quote,
    params: &CollateralParams,
) -> Result<Quote, CollateralError> {
    notional
        .checked_mul(params.swap_margin_ratio)
        .ok_or(CollateralError::Overflow)
}

pub fn validate_duration(
    duration_secs: i64,
    params: &CollateralParams,
) -> Result<(), CollateralError> {
    if duration_secs < params.min_duration_secs || duration_secs > params.max_duration_secs {
        return Err(CollateralError::InvalidDuration {
            requested: duration_secs,
            min: params.min_duration_secs,
            max: params.max_duration_secs,
        });
    }
    Ok(())
}

pub fn expiry_for(now: Timestamp, duration_secs: i64) -> Timestamp {
    now.plus(duration_secs)
}
