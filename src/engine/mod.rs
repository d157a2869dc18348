// 8.x engine/: the position ledger and settlement engine.
// core.rs holds state, the other files implement operations per instrument kind.

mod config;
mod core;
mod futures;
mod options;
mod results;
mod swaps;

pub use config::LedgerConfig;
pub use core::Ledger;
pub use results::{
    ExerciseResult, LedgerError, LiquidationResult, SettlementResult, SwapSettlementResult,
};
