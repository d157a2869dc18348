// 8.0.2: result types and errors for ledger operations.

use crate::collateral::CollateralError;
use crate::oracle::OracleError;
use crate::types::{OptionId, PositionId, Price, Quote, SwapId, Timestamp, TraderId};
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct SettlementResult {
    pub position_id: PositionId,
    pub mark_price: Price,
    pub pnl: Quote,
    pub payout: Quote,
    /// Negative-pnl remainder retained by the collateral pool.
    pub forfeited: Quote,
}

#[derive(Debug, Clone)]
pub struct LiquidationResult {
    pub position_id: PositionId,
    pub liquidator: TraderId,
    pub mark_price: Price,
    pub pnl: Quote,
    pub residual_returned: Quote,
    pub forfeited: Quote,
}

#[derive(Debug, Clone)]
pub struct ExerciseResult {
    pub option_id: OptionId,
    pub mark_price: Price,
    pub payoff: Quote,
    pub collateral_returned_to_seller: Quote,
}

#[derive(Debug, Clone)]
pub struct SwapSettlementResult {
    pub swap_id: SwapId,
    pub return_a: Quote,
    pub return_b: Quote,
    pub net: Quote,
    pub payout_a: Quote,
    pub payout_b: Quote,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("caller {0:?} is not authorized for this operation")]
    Unauthorized(TraderId),

    #[error("position {0:?} not found")]
    PositionNotFound(PositionId),

    #[error("option {0:?} not found")]
    OptionNotFound(OptionId),

    #[error("swap {0:?} not found")]
    SwapNotFound(SwapId),

    #[error("insufficient collateral: sent {sent}, required {required}")]
    InsufficientCollateral { sent: Quote, required: Quote },

    #[error("quantity {0} must be positive")]
    InvalidQuantity(Decimal),

    #[error("strike {0} must be positive")]
    InvalidStrike(Decimal),

    #[error("notional {0} must be positive")]
    InvalidNotional(Decimal),

    #[error("premium {0} must not be negative")]
    InvalidPremium(Decimal),

    #[error("counterparty must differ from the proposer")]
    InvalidCounterparty,

    #[error("not expired yet: expiry {expiry}, now {now}")]
    NotExpiredYet { expiry: Timestamp, now: Timestamp },

    #[error("past expiry: expiry {expiry}, now {now}")]
    PastExpiry { expiry: Timestamp, now: Timestamp },

    #[error("option {0:?} is not exercisable")]
    NotExercisable(OptionId),

    #[error("position {0:?} is not liquidatable")]
    NotLiquidatable(PositionId),

    #[error("position {0:?} is past the liquidation threshold and can only be liquidated")]
    MarginBreached(PositionId),

    #[error("amount arithmetic overflowed the decimal range")]
    AmountOverflow,

    #[error("record is in a terminal state and cannot be mutated")]
    AlreadyClosed,

    #[error("option {0:?} already has a buyer")]
    AlreadyPurchased(OptionId),

    #[error("swap {0:?} is no longer pending")]
    NotPending(SwapId),

    #[error("swap {0:?} has no accepted counterparty yet")]
    SwapNotActive(SwapId),

    #[error("oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("collateral error: {0}")]
    Collateral(#[from] CollateralError),
}
