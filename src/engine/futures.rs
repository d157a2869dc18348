//! Futures operations: open, mark, settle, liquidate, cancel.
//!
//! Settlement requires expiry; liquidation is permissionless and ignores
//! expiry but demands the margin-breach condition. Both fail loudly on
//! terminal positions instead of silently no-opping.

use super::core::Ledger;
use super::results::{LedgerError, LiquidationResult, SettlementResult};
use crate::collateral::{expiry_for, futures_required_collateral, validate_duration};
use crate::events::{
    EventPayload, PositionCancelledEvent, PositionLiquidatedEvent, PositionOpenedEvent,
    PositionSettledEvent,
};
use crate::futures::{
    calculate_unrealized_pnl, is_liquidatable, settlement_payout, FuturesPosition, FuturesStatus,
};
use crate::types::{InstrumentId, Price, PositionId, Quote, Side, TraderId};
use rust_decimal::Decimal;

impl Ledger {
    /// Opens a collateralized futures position. The strike is caller-chosen;
    /// the instrument must have a live strict oracle price, the duration must
    /// be inside the configured bounds, and the escrow must meet the 20%
    /// margin formula exactly (one unit short is rejected).
    pub fn open_position(
        &mut self,
        caller: TraderId,
        instrument: InstrumentId,
        side: Side,
        strike: Decimal,
        quantity: Decimal,
        duration_secs: i64,
        collateral_sent: Quote,
    ) -> Result<PositionId, LedgerError> {
        let strike = Price::new(strike).ok_or(LedgerError::InvalidStrike(strike))?;
        if quantity <= Decimal::ZERO {
            return Err(LedgerError::InvalidQuantity(quantity));
        }
        validate_duration(duration_secs, &self.config.collateral)?;

        // positions cannot open against unpriced or deactivated instruments
        self.oracle.get_price(&instrument)?;

        let required = futures_required_collateral(strike, quantity, &self.config.collateral)?;
        if collateral_sent < required {
            return Err(LedgerError::InsufficientCollateral {
                sent: collateral_sent,
                required,
            });
        }

        let id = self.allocate_position_id();
        let expiry = expiry_for(self.current_time, duration_secs);
        let position = FuturesPosition {
            id,
            trader: caller,
            instrument: instrument.clone(),
            side,
            strike,
            quantity,
            collateral: collateral_sent,
            opened_at: self.current_time,
            expiry,
            status: FuturesStatus::Active,
        };

        self.positions.insert(id, position);
        self.index_position(caller, id);
        self.emit_event(EventPayload::PositionOpened(PositionOpenedEvent {
            position_id: id,
            trader: caller,
            instrument,
            side,
            strike,
            quantity,
            collateral: collateral_sent,
            expiry,
        }));

        Ok(id)
    }

    /// Marks an active position against the strict oracle price. Pure read.
    pub fn unrealized_pnl(&self, id: PositionId) -> Result<Quote, LedgerError> {
        let position = self
            .positions
            .get(&id)
            .ok_or(LedgerError::PositionNotFound(id))?;
        if position.status.is_terminal() {
            return Err(LedgerError::AlreadyClosed);
        }
        let mark = self.oracle.get_price(&position.instrument)?.price;
        position
            .unrealized_pnl(mark)
            .ok_or(LedgerError::AmountOverflow)
    }

    /// Settles at or after expiry. Payout is collateral plus pnl, clipped at
    /// zero; a negative-pnl remainder is forfeited to the pool.
    pub fn settle_position(&mut self, id: PositionId) -> Result<SettlementResult, LedgerError> {
        let (trader, mark, pnl, collateral) = {
            let position = self
                .positions
                .get(&id)
                .ok_or(LedgerError::PositionNotFound(id))?;
            if position.status.is_terminal() {
                return Err(LedgerError::AlreadyClosed);
            }
            if !position.is_expired(self.current_time) {
                return Err(LedgerError::NotExpiredYet {
                    expiry: position.expiry,
                    now: self.current_time,
                });
            }
            let mark = self.oracle.get_price(&position.instrument)?.price;
            let pnl = position
                .unrealized_pnl(mark)
                .ok_or(LedgerError::AmountOverflow)?;
            (position.trader, mark, pnl, position.collateral)
        };

        let payout = settlement_payout(collateral, pnl).ok_or(LedgerError::AmountOverflow)?;
        let forfeited = collateral.sub(payout).clamp_non_negative();
        self.apply_pool_transfer(collateral, payout);

        let position = self.positions.get_mut(&id).unwrap();
        position.status = FuturesStatus::Settled;

        self.emit_event(EventPayload::PositionSettled(PositionSettledEvent {
            position_id: id,
            trader,
            mark_price: mark,
            pnl,
            payout,
            forfeited,
        }));

        Ok(SettlementResult {
            position_id: id,
            mark_price: mark,
            pnl,
            payout,
            forfeited,
        })
    }

    /// True when paper losses have crossed the liquidation threshold.
    pub fn can_liquidate(&self, id: PositionId) -> Result<bool, LedgerError> {
        let position = self
            .positions
            .get(&id)
            .ok_or(LedgerError::PositionNotFound(id))?;
        if position.status.is_terminal() {
            return Ok(false);
        }
        let mark = self.oracle.get_price(&position.instrument)?.price;
        let pnl = calculate_unrealized_pnl(position.side, position.strike, position.quantity, mark)
            .ok_or(LedgerError::AmountOverflow)?;
        Ok(is_liquidatable(
            pnl,
            position.collateral,
            self.config.liquidation_threshold,
        ))
    }

    /// Permissionless early close on margin breach, regardless of expiry.
    /// Residual collateral goes back to the trader, the rest to the pool.
    /// Healthy positions fail with NotLiquidatable; terminal ones with
    /// AlreadyClosed, so a re-run never double-pays.
    pub fn liquidate_position(
        &mut self,
        caller: TraderId,
        id: PositionId,
    ) -> Result<LiquidationResult, LedgerError> {
        let (trader, mark, pnl, collateral) = {
            let position = self
                .positions
                .get(&id)
                .ok_or(LedgerError::PositionNotFound(id))?;
            if position.status.is_terminal() {
                return Err(LedgerError::AlreadyClosed);
            }
            let mark = self.oracle.get_price(&position.instrument)?.price;
            let pnl =
                calculate_unrealized_pnl(position.side, position.strike, position.quantity, mark)
                    .ok_or(LedgerError::AmountOverflow)?;
            if !is_liquidatable(pnl, position.collateral, self.config.liquidation_threshold) {
                return Err(LedgerError::NotLiquidatable(id));
            }
            (position.trader, mark, pnl, position.collateral)
        };

        let residual = settlement_payout(collateral, pnl).ok_or(LedgerError::AmountOverflow)?;
        let forfeited = collateral.sub(residual).clamp_non_negative();
        self.apply_pool_transfer(collateral, residual);

        let position = self.positions.get_mut(&id).unwrap();
        position.status = FuturesStatus::Liquidated;

        self.emit_event(EventPayload::PositionLiquidated(PositionLiquidatedEvent {
            position_id: id,
            trader,
            liquidator: caller,
            mark_price: mark,
            pnl,
            residual_returned: residual,
        }));

        Ok(LiquidationResult {
            position_id: id,
            liquidator: caller,
            mark_price: mark,
            pnl,
            residual_returned: residual,
            forfeited,
        })
    }

    /// Trader-only cancel, while active, strictly before expiry, and only
    /// while the position is still margin-healthy. A breached position cannot
    /// be cancelled out from under its keepers: the collateral it owes the
    /// pool leaves through liquidation only. Full collateral returned.
    pub fn cancel_position(&mut self, caller: TraderId, id: PositionId) -> Result<Quote, LedgerError> {
        let (trader, collateral) = {
            let position = self
                .positions
                .get(&id)
                .ok_or(LedgerError::PositionNotFound(id))?;
            if position.status.is_terminal() {
                return Err(LedgerError::AlreadyClosed);
            }
            if position.trader != caller {
                return Err(LedgerError::Unauthorized(caller));
            }
            if position.is_expired(self.current_time) {
                return Err(LedgerError::PastExpiry {
                    expiry: position.expiry,
                    now: self.current_time,
                });
            }
            let mark = self.oracle.get_price(&position.instrument)?.price;
            let pnl = position
                .unrealized_pnl(mark)
                .ok_or(LedgerError::AmountOverflow)?;
            if is_liquidatable(pnl, position.collateral, self.config.liquidation_threshold) {
                return Err(LedgerError::MarginBreached(id));
            }
            (position.trader, position.collateral)
        };

        let position = self.positions.get_mut(&id).unwrap();
        position.status = FuturesStatus::Cancelled;

        self.emit_event(EventPayload::PositionCancelled(PositionCancelledEvent {
            position_id: id,
            trader,
            collateral_returned: collateral,
        }));

        Ok(collateral)
    }

    // escrow leaves the position either toward the trader (payout) or the
    // pool (forfeit); winnings beyond escrow are drawn from the pool
    fn apply_pool_transfer(&mut self, collateral: Quote, payout: Quote) {
        if payout >= collateral {
            self.pool_debit(payout.sub(collateral));
        } else {
            self.pool_credit(collateral.sub(payout));
        }
    }
}
