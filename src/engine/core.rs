// 8.1 engine/core.rs: the position ledger. owns the oracle, all three record
// stores, the collateral pool, the clock, and the event log. single-threaded
// ledger of record: every mutating call validates fully, then commits, so a
// failed call leaves no partial state.

use super::config::LedgerConfig;
use super::results::LedgerError;
use crate::auth::AuthPolicy;
use crate::events::{Event, EventId, EventPayload};
use crate::futures::FuturesPosition;
use crate::options::OptionContract;
use crate::oracle::{PriceOracle, PriceUpdate};
use crate::swaps::Swap;
use crate::types::{
    InstrumentId, OptionId, PositionId, Quote, SwapId, Timestamp, TraderId,
};
use rust_decimal::Decimal;
use std::collections::HashMap;

#[derive(Debug)]
pub struct Ledger {
    pub(super) config: LedgerConfig,
    pub(super) oracle: PriceOracle,

    pub(super) positions: HashMap<PositionId, FuturesPosition>,
    pub(super) options: HashMap<OptionId, OptionContract>,
    pub(super) swaps: HashMap<SwapId, Swap>,

    // trader -> ids secondary indexes for listing
    pub(super) positions_by_trader: HashMap<TraderId, Vec<PositionId>>,
    pub(super) options_by_trader: HashMap<TraderId, Vec<OptionId>>,
    pub(super) swaps_by_trader: HashMap<TraderId, Vec<SwapId>>,

    // forfeited collateral accumulates here; winning settlements draw on it
    pub(super) pool: Quote,

    pub(super) events: Vec<Event>,
    pub(super) next_event_id: u64,
    pub(super) next_position_id: u64,
    pub(super) next_option_id: u64,
    pub(super) next_swap_id: u64,
    pub(super) current_time: Timestamp,
}

impl Ledger {
    pub fn new(owner: TraderId, config: LedgerConfig) -> Self {
        Self {
            config,
            oracle: PriceOracle::new(AuthPolicy::new(owner)),
            positions: HashMap::new(),
            options: HashMap::new(),
            swaps: HashMap::new(),
            positions_by_trader: HashMap::new(),
            options_by_trader: HashMap::new(),
            swaps_by_trader: HashMap::new(),
            pool: Quote::zero(),
            events: Vec::new(),
            next_event_id: 1,
            next_position_id: 1,
            next_option_id: 1,
            next_swap_id: 1,
            current_time: Timestamp::from_secs(0),
        }
    }

    // 8.2: clock. external callers (keepers) drive time; the ledger never
    // self-schedules settlement or liquidation.

    pub fn set_time(&mut self, timestamp: Timestamp) {
        self.current_time = timestamp;
    }

    pub fn advance_time(&mut self, secs: i64) {
        self.current_time = self.current_time.plus(secs);
    }

    pub fn time(&self) -> Timestamp {
        self.current_time
    }

    // 8.3: oracle passthrough. mutating calls stamp the ledger clock and emit
    // audit events; reads delegate directly.

    pub fn update_price(
        &mut self,
        caller: TraderId,
        instrument: InstrumentId,
        price: Decimal,
        confidence: u8,
    ) -> Result<(), LedgerError> {
        let observation = self.oracle.update_price(
            caller,
            instrument.clone(),
            price,
            confidence,
            self.current_time,
        )?;
        self.emit_event(EventPayload::PriceUpdated(crate::events::PriceUpdatedEvent {
            instrument,
            price: observation.price,
            confidence: observation.confidence.value(),
            updater: caller,
        }));
        Ok(())
    }

    pub fn update_prices(
        &mut self,
        caller: TraderId,
        batch: &[PriceUpdate],
    ) -> Result<usize, LedgerError> {
        let applied = self.oracle.update_prices(caller, batch, self.current_time)?;
        for update in batch {
            self.emit_event(EventPayload::PriceUpdated(crate::events::PriceUpdatedEvent {
                instrument: update.instrument.clone(),
                price: crate::types::Price::new_unchecked(update.price),
                confidence: update.confidence,
                updater: caller,
            }));
        }
        Ok(applied)
    }

    pub fn add_price_updater(
        &mut self,
        caller: TraderId,
        updater: TraderId,
    ) -> Result<(), LedgerError> {
        self.oracle.add_updater(caller, updater)?;
        self.emit_event(EventPayload::UpdaterAdded(crate::events::UpdaterEvent {
            updater,
        }));
        Ok(())
    }

    pub fn remove_price_updater(
        &mut self,
        caller: TraderId,
        updater: TraderId,
    ) -> Result<(), LedgerError> {
        self.oracle.remove_updater(caller, updater)?;
        self.emit_event(EventPayload::UpdaterRemoved(crate::events::UpdaterEvent {
            updater,
        }));
        Ok(())
    }

    pub fn activate_price_feed(
        &mut self,
        caller: TraderId,
        instrument: &InstrumentId,
    ) -> Result<(), LedgerError> {
        self.oracle.activate_feed(caller, instrument)?;
        self.emit_event(EventPayload::FeedActivated(crate::events::FeedToggledEvent {
            instrument: instrument.clone(),
        }));
        Ok(())
    }

    pub fn deactivate_price_feed(
        &mut self,
        caller: TraderId,
        instrument: &InstrumentId,
    ) -> Result<(), LedgerError> {
        self.oracle.deactivate_feed(caller, instrument)?;
        self.emit_event(EventPayload::FeedDeactivated(
            crate::events::FeedToggledEvent {
                instrument: instrument.clone(),
            },
        ));
        Ok(())
    }

    pub fn oracle(&self) -> &PriceOracle {
        &self.oracle
    }

    pub fn is_price_stale(&self, instrument: &InstrumentId, max_age_secs: i64) -> bool {
        self.oracle.is_stale(instrument, max_age_secs, self.current_time)
    }

    // 8.4: record reads and trader indexes

    pub fn get_position(&self, id: PositionId) -> Option<&FuturesPosition> {
        self.positions.get(&id)
    }

    pub fn get_option(&self, id: OptionId) -> Option<&OptionContract> {
        self.options.get(&id)
    }

    pub fn get_swap(&self, id: SwapId) -> Option<&Swap> {
        self.swaps.get(&id)
    }

    pub fn positions_for(&self, trader: TraderId) -> &[PositionId] {
        self.positions_by_trader
            .get(&trader)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn options_for(&self, trader: TraderId) -> &[OptionId] {
        self.options_by_trader
            .get(&trader)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn swaps_for(&self, trader: TraderId) -> &[SwapId] {
        self.swaps_by_trader
            .get(&trader)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn pool_balance(&self) -> Quote {
        self.pool
    }

    // 8.5: event log

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn recent_events(&self, count: usize) -> &[Event] {
        let start = self.events.len().saturating_sub(count);
        &self.events[start..]
    }

    pub(super) fn emit_event(&mut self, payload: EventPayload) {
        let event = Event::new(EventId(self.next_event_id), self.current_time, payload);
        self.next_event_id += 1;

        if self.config.verbose {
            println!("[Event {}] {:?}", event.id.0, event.payload);
        }

        self.events.push(event);

        if self.events.len() > self.config.max_events {
            let drain_count = self.events.len() - self.config.max_events;
            self.events.drain(0..drain_count);
        }
    }

    // 8.6: id allocation and index maintenance

    pub(super) fn allocate_position_id(&mut self) -> PositionId {
        let id = PositionId(self.next_position_id);
        self.next_position_id += 1;
        id
    }

    pub(super) fn allocate_option_id(&mut self) -> OptionId {
        let id = OptionId(self.next_option_id);
        self.next_option_id += 1;
        id
    }

    pub(super) fn allocate_swap_id(&mut self) -> SwapId {
        let id = SwapId(self.next_swap_id);
        self.next_swap_id += 1;
        id
    }

    pub(super) fn index_position(&mut self, trader: TraderId, id: PositionId) {
        self.positions_by_trader.entry(trader).or_default().push(id);
    }

    pub(super) fn index_option(&mut self, trader: TraderId, id: OptionId) {
        self.options_by_trader.entry(trader).or_default().push(id);
    }

    pub(super) fn index_swap(&mut self, trader: TraderId, id: SwapId) {
        self.swaps_by_trader.entry(trader).or_default().push(id);
    }

    pub(super) fn pool_credit(&mut self, amount: Quote) {
        self.pool = self.pool.add(amount);
    }

    pub(super) fn pool_debit(&mut self, amount: Quote) {
        self.pool = self.pool.sub(amount);
    }
}
