// 3.0: price oracle. per-instrument append-only observation history with
// access-controlled writes and a two-tier read contract:
//   get_price          strict, used before financial decisions (fail-safe)
//   latest_price_or_zero permissive, used for best-effort display (fail-open)
// callers must preserve that split.
//
// the oracle never tells time itself; the ledger clock is passed into every
// call that needs "now", which keeps tests deterministic.

use crate::auth::AuthPolicy;
use crate::types::{Confidence, InstrumentId, Price, Timestamp, TraderId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// 3.1: single authenticated price point. immutable once written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub price: Price,
    pub timestamp: Timestamp,
    pub confidence: Confidence,
}

// 3.2: one instrument's feed. created on first update, never deleted,
// only deactivated. history is monotonically non-decreasing in timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceFeed {
    pub instrument: InstrumentId,
    pub history: Vec<PriceObservation>,
    pub active: bool,
}

impl PriceFeed {
    fn new(instrument: InstrumentId) -> Self {
        Self {
            instrument,
            history: Vec::new(),
            active: true,
        }
    }

    pub fn latest(&self) -> Option<&PriceObservation> {
        self.history.last()
    }
}

// 3.3: raw batch entry, pre-validation. confidence is the raw u8 so that
// out-of-range values reach the oracle and fail there, not at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceUpdate {
    pub instrument: InstrumentId,
    pub price: Decimal,
    pub confidence: u8,
}

impl PriceUpdate {
    pub fn new(instrument: impl Into<InstrumentId>, price: Decimal, confidence: u8) -> Self {
        Self {
            instrument: instrument.into(),
            price,
            confidence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("caller {0:?} is not authorized for this oracle operation")]
    Unauthorized(TraderId),

    #[error("confidence {0} is out of range (0-100)")]
    InvalidConfidence(u8),

    #[error("price {0} must be positive")]
    InvalidPrice(Decimal),

    #[error("update timestamp {attempted} precedes feed head {head}")]
    NonMonotonicTimestamp {
        attempted: Timestamp,
        head: Timestamp,
    },

    #[error("instrument {0} has never been priced")]
    UnknownInstrument(InstrumentId),

    #[error("price feed for {0} is inactive")]
    FeedInactive(InstrumentId),

    #[error("no price data for {0}")]
    NoData(InstrumentId),
}

// 3.4: the oracle proper. owns all feeds plus the injected auth policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceOracle {
    policy: AuthPolicy,
    feeds: HashMap<InstrumentId, PriceFeed>,
}

impl PriceOracle {
    pub fn new(policy: AuthPolicy) -> Self {
        Self {
            policy,
            feeds: HashMap::new(),
        }
    }

    pub fn policy(&self) -> &AuthPolicy {
        &self.policy
    }

    // 3.5: privileged write paths

    pub fn update_price(
        &mut self,
        caller: TraderId,
        instrument: InstrumentId,
        price: Decimal,
        confidence: u8,
        now: Timestamp,
    ) -> Result<PriceObservation, OracleError> {
        if !self.policy.can_update(caller) {
            return Err(OracleError::Unauthorized(caller));
        }
        let observation = self.validate_update(&instrument, price, confidence, now)?;
        self.append(instrument, observation);
        Ok(observation)
    }

    // atomic: every entry is validated before any is applied, so one bad
    // entry fails the whole batch with no state change
    pub fn update_prices(
        &mut self,
        caller: TraderId,
        batch: &[PriceUpdate],
        now: Timestamp,
    ) -> Result<usize, OracleError> {
        if !self.policy.can_update(caller) {
            return Err(OracleError::Unauthorized(caller));
        }

        let mut validated = Vec::with_capacity(batch.len());
        for update in batch {
            let observation =
                self.validate_update(&update.instrument, update.price, update.confidence, now)?;
            validated.push((update.instrument.clone(), observation));
        }

        let applied = validated.len();
        for (instrument, observation) in validated {
            self.append(instrument, observation);
        }
        Ok(applied)
    }

    fn validate_update(
        &self,
        instrument: &InstrumentId,
        price: Decimal,
        confidence: u8,
        now: Timestamp,
    ) -> Result<PriceObservation, OracleError> {
        let price = Price::new(price).ok_or(OracleError::InvalidPrice(price))?;
        let confidence =
            Confidence::new(confidence).ok_or(OracleError::InvalidConfidence(confidence))?;

        if let Some(head) = self.feeds.get(instrument).and_then(PriceFeed::latest) {
            if now < head.timestamp {
                return Err(OracleError::NonMonotonicTimestamp {
                    attempted: now,
                    head: head.timestamp,
                });
            }
        }

        Ok(PriceObservation {
            price,
            timestamp: now,
            confidence,
        })
    }

    fn append(&mut self, instrument: InstrumentId, observation: PriceObservation) {
        self.feeds
            .entry(instrument.clone())
            .or_insert_with(|| PriceFeed::new(instrument))
            .history
            .push(observation);
    }

    // 3.6: reads

    /// Strict read for financial decisions. Fails on unknown instruments and
    /// on deactivated feeds even when history is non-empty.
    pub fn get_price(&self, instrument: &InstrumentId) -> Result<PriceObservation, OracleError> {
        let feed = self
            .feeds
            .get(instrument)
            .ok_or_else(|| OracleError::UnknownInstrument(instrument.clone()))?;
        if !feed.active {
            return Err(OracleError::FeedInactive(instrument.clone()));
        }
        feed.latest()
            .copied()
            .ok_or_else(|| OracleError::NoData(instrument.clone()))
    }

    /// Permissive read for display. Zero for unpriced instruments, and the
    /// last observed value even when the feed is deactivated.
    pub fn latest_price_or_zero(&self, instrument: &InstrumentId) -> Decimal {
        self.feeds
            .get(instrument)
            .and_then(PriceFeed::latest)
            .map(|obs| obs.price.value())
            .unwrap_or(Decimal::ZERO)
    }

    pub fn price_history(
        &self,
        instrument: &InstrumentId,
    ) -> Result<&[PriceObservation], OracleError> {
        self.feeds
            .get(instrument)
            .map(|feed| feed.history.as_slice())
            .ok_or_else(|| OracleError::UnknownInstrument(instrument.clone()))
    }

    /// Arithmetic mean of the most recent min(periods, len) observations.
    pub fn average_price(
        &self,
        instrument: &InstrumentId,
        periods: usize,
    ) -> Result<Decimal, OracleError> {
        let history = self
            .feeds
            .get(instrument)
            .map(|feed| feed.history.as_slice())
            .unwrap_or(&[]);

        if history.is_empty() || periods == 0 {
            return Err(OracleError::NoData(instrument.clone()));
        }

        let window = periods.min(history.len());
        let sum: Decimal = history[history.len() - window..]
            .iter()
            .map(|obs| obs.price.value())
            .sum();
        Ok(sum / Decimal::from(window as u64))
    }

    /// Stale when older than max_age_secs, or never priced at all.
    /// Independent of the active flag.
    pub fn is_stale(&self, instrument: &InstrumentId, max_age_secs: i64, now: Timestamp) -> bool {
        match self.feeds.get(instrument).and_then(PriceFeed::latest) {
            Some(obs) => now.age_since(obs.timestamp) > max_age_secs,
            None => true,
        }
    }

    pub fn feed(&self, instrument: &InstrumentId) -> Option<&PriceFeed> {
        self.feeds.get(instrument)
    }

    pub fn observation_count(&self, instrument: &InstrumentId) -> usize {
        self.feeds
            .get(instrument)
            .map(|feed| feed.history.len())
            .unwrap_or(0)
    }

    // 3.7: owner-only administration

    pub fn add_updater(&mut self, caller: TraderId, updater: TraderId) -> Result<(), OracleError> {
        if !self.policy.is_owner(caller) {
            return Err(OracleError::Unauthorized(caller));
        }
        self.policy.add_updater(updater);
        Ok(())
    }

    pub fn remove_updater(
        &mut self,
        caller: TraderId,
        updater: TraderId,
    ) -> Result<(), OracleError> {
        if !self.policy.is_owner(caller) {
            return Err(OracleError::Unauthorized(caller));
        }
        self.policy.remove_updater(updater);
        Ok(())
    }

    pub fn activate_feed(
        &mut self,
        caller: TraderId,
        instrument: &InstrumentId,
    ) -> Result<(), OracleError> {
        self.set_feed_active(caller, instrument, true)
    }

    // deactivation keeps history; it only blocks the strict read path
    pub fn deactivate_feed(
        &mut self,
        caller: TraderId,
        instrument: &InstrumentId,
    ) -> Result<(), OracleError> {
        self.set_feed_active(caller, instrument, false)
    }

    fn set_feed_active(
        &mut self,
        caller: TraderId,
        instrument: &InstrumentId,
        active: bool,
    ) -> Result<(), OracleError> {
        if !self.policy.is_owner(caller) {
            return Err(OracleError::Unauthorized(caller));
        }
        let feed = self
            .feeds
            .get_mut(instrument)
            .ok_or_else(|| OracleError::UnknownInstrument(instrument.clone()))?;
        feed.active = active;
        Ok(())
    }
}
