// cardex-core: collateralized derivatives on trading-card valuations.
// oracle-first architecture: every financial decision marks against the
// authenticated price oracle. all computation is deterministic with no
// external I/O.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: InstrumentId, TraderId, Side, Price, Quote,
//        Confidence, Timestamp
//   2.x  auth.rs: oracle write authorization (owner + updater set)
//   3.x  oracle.rs: price store + oracle: strict/permissive reads, batch
//        updates, averages, staleness, per-feed activation
//   4.x  futures.rs: futures record, pnl, liquidation trigger, payout math
//   5.x  options.rs: option record, moneyness, capped exercise payoff
//   6.x  swaps.rs: swap record, leg returns, net settlement
//   7.x  events.rs: state transition events for audit
//   8.x  engine/: the position ledger: open/settle/liquidate/exercise/
//        propose/accept/cancel, collateral pool, clock, event log
//   collateral.rs: pure collateral calculator (20% / 100% / 15%, duration bounds)

pub mod auth;
pub mod collateral;
pub mod engine;
pub mod events;
pub mod futures;
pub mod options;
pub mod oracle;
pub mod swaps;
pub mod types;

// re exports for convenience
pub use auth::AuthPolicy;
pub use collateral::{
    futures_required_collateral, option_required_collateral, swap_leg_collateral,
    validate_duration, CollateralError, CollateralParams, SECONDS_PER_DAY,
};
pub use engine::{
    ExerciseResult, Ledger, LedgerConfig, LedgerError, LiquidationResult, SettlementResult,
    SwapSettlementResult,
};
pub use events::*;
pub use futures::{
    calculate_unrealized_pnl, is_liquidatable, settlement_payout, FuturesPosition, FuturesStatus,
};
pub use options::{exercise_payoff, intrinsic_value, OptionContract, OptionKind, OptionStatus};
pub use oracle::{OracleError, PriceFeed, PriceObservation, PriceOracle, PriceUpdate};
pub use swaps::{leg_return, net_settlement, Swap, SwapOutcome, SwapStatus};
pub use types::*;
