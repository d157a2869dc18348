// 7.0: every state change produces an event. used for audit trails, state
// reconstruction, and the polling dashboard. the EventPayload enum lists all
// event types.

use crate::options::OptionKind;
use crate::types::{
    InstrumentId, OptionId, Price, PositionId, Quote, Side, SwapId, Timestamp, TraderId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId, timestamp: Timestamp, payload: EventPayload) -> Self {
        Self {
            id,
            timestamp,
            payload,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    // Oracle events
    PriceUpdated(PriceUpdatedEvent),
    FeedActivated(FeedToggledEvent),
    FeedDeactivated(FeedToggledEvent),
    UpdaterAdded(UpdaterEvent),
    UpdaterRemoved(UpdaterEvent),

    // Futures events
    PositionOpened(PositionOpenedEvent),
    PositionSettled(PositionSettledEvent),
    PositionLiquidated(PositionLiquidatedEvent),
    PositionCancelled(PositionCancelledEvent),

    // Option events
    OptionCreated(OptionCreatedEvent),
    OptionPurchased(OptionPurchasedEvent),
    OptionExercised(OptionExercisedEvent),
    OptionExpired(OptionExpiredEvent),
    OptionCancelled(OptionCancelledEvent),

    // Swap events
    SwapProposed(SwapProposedEvent),
    SwapAccepted(SwapAcceptedEvent),
    SwapSettled(SwapSettledEvent),
    SwapCancelled(SwapCancelledEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceUpdatedEvent {
    pub instrument: InstrumentId,
    pub price: Price,
    pub confidence: u8,
    pub updater: TraderId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedToggledEvent {
    pub instrument: InstrumentId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdaterEvent {
    pub updater: TraderId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionOpenedEvent {
    pub position_id: PositionId,
    pub trader: TraderId,
    pub instrument: InstrumentId,
    pub side: Side,
    pub strike: Price,
    pub quantity: Decimal,
    pub collateral: Quote,
    pub expiry: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionSettledEvent {
    pub position_id: PositionId,
    pub trader: TraderId,
    pub mark_price: Price,
    pub pnl: Quote,
    pub payout: Quote,
    pub forfeited: Quote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionLiquidatedEvent {
    pub position_id: PositionId,
    pub trader: TraderId,
    /// Liquidation is permissionless; the caller is recorded for audit.
    pub liquidator: TraderId,
    pub mark_price: Price,
    pub pnl: Quote,
    pub residual_returned: Quote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionCancelledEvent {
    pub position_id: PositionId,
    pub trader: TraderId,
    pub collateral_returned: Quote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionCreatedEvent {
    pub option_id: OptionId,
    pub seller: TraderId,
    pub instrument: InstrumentId,
    pub kind: OptionKind,
    pub strike: Price,
    pub premium: Quote,
    pub quantity: Decimal,
    pub collateral: Quote,
    pub expiry: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionPurchasedEvent {
    pub option_id: OptionId,
    pub buyer: TraderId,
    pub seller: TraderId,
    pub premium: Quote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionExercisedEvent {
    pub option_id: OptionId,
    pub buyer: TraderId,
    pub mark_price: Price,
    pub payoff: Quote,
    pub collateral_returned_to_seller: Quote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionExpiredEvent {
    pub option_id: OptionId,
    pub seller: TraderId,
    pub collateral_returned: Quote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionCancelledEvent {
    pub option_id: OptionId,
    pub seller: TraderId,
    pub collateral_returned: Quote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapProposedEvent {
    pub swap_id: SwapId,
    pub party_a: TraderId,
    pub party_b: TraderId,
    pub instrument_a: InstrumentId,
    pub instrument_b: InstrumentId,
    pub notional_a: Quote,
    pub notional_b: Quote,
    pub maturity: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapAcceptedEvent {
    pub swap_id: SwapId,
    pub party_b: TraderId,
    pub collateral_b: Quote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapSettledEvent {
    pub swap_id: SwapId,
    pub net: Quote,
    pub payout_a: Quote,
    pub payout_b: Quote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapCancelledEvent {
    pub swap_id: SwapId,
    pub party_a: TraderId,
    pub collateral_returned: Quote,
}
