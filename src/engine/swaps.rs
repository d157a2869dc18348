//! Swap operations: propose, accept, settle, cancel.
//!
//! Both legs are priced at proposal from strict oracle reads; settlement
//! measures each leg's return from those inception marks and nets the two,
//! paying the winner from the loser's collateral.

use super::core::Ledger;
use super::results::{LedgerError, SwapSettlementResult};
use crate::collateral::{expiry_for, swap_leg_collateral, validate_duration};
use crate::events::{
    EventPayload, SwapAcceptedEvent, SwapCancelledEvent, SwapProposedEvent, SwapSettledEvent,
};
use crate::swaps::{leg_return, net_settlement, Swap, SwapStatus};
use crate::types::{InstrumentId, Quote, SwapId, TraderId};
use rust_decimal::Decimal;

impl Ledger {
    /// Party A proposes a two-leg swap against a named counterparty, escrowing
    /// 15% of its own leg's notional. Both instruments must have strict
    /// oracle prices; those marks become the legs' inception prices.
    #[allow(clippy::too_many_arguments)]
    pub fn propose_swap(
        &mut self,
        caller: TraderId,
        party_b: TraderId,
        instrument_a: InstrumentId,
        notional_a: Decimal,
        instrument_b: InstrumentId,
        notional_b: Decimal,
        duration_secs: i64,
        collateral_sent: Quote,
    ) -> Result<SwapId, LedgerError> {
        if party_b == caller {
            return Err(LedgerError::InvalidCounterparty);
        }
        if notional_a <= Decimal::ZERO {
            return Err(LedgerError::InvalidNotional(notional_a));
        }
        if notional_b <= Decimal::ZERO {
            return Err(LedgerError::InvalidNotional(notional_b));
        }
        validate_duration(duration_secs, &self.config.collateral)?;

        let entry_price_a = self.oracle.get_price(&instrument_a)?.price;
        let entry_price_b = self.oracle.get_price(&instrument_b)?.price;

        let notional_a = Quote::new(notional_a);
        let notional_b = Quote::new(notional_b);
        let required = swap_leg_collateral(notional_a, &self.config.collateral)?;
        if collateral_sent < required {
            return Err(LedgerError::InsufficientCollateral {
                sent: collateral_sent,
                required,
            });
        }

        let id = self.allocate_swap_id();
        let maturity = expiry_for(self.current_time, duration_secs);
        let swap = Swap {
            id,
            party_a: caller,
            party_b,
            instrument_a: instrument_a.clone(),
            instrument_b: instrument_b.clone(),
            notional_a,
            notional_b,
            entry_price_a,
            entry_price_b,
            collateral_a: collateral_sent,
            collateral_b: Quote::zero(),
            proposed_at: self.current_time,
            maturity,
            status: SwapStatus::Pending,
        };

        self.swaps.insert(id, swap);
        self.index_swap(caller, id);
        self.emit_event(EventPayload::SwapProposed(SwapProposedEvent {
            swap_id: id,
            party_a: caller,
            party_b,
            instrument_a,
            instrument_b,
            notional_a,
            notional_b,
            maturity,
        }));

        Ok(id)
    }

    /// The named party B accepts by escrowing 15% of its own leg's notional.
    pub fn accept_swap(
        &mut self,
        caller: TraderId,
        id: SwapId,
        collateral_sent: Quote,
    ) -> Result<(), LedgerError> {
        {
            let swap = self.swaps.get(&id).ok_or(LedgerError::SwapNotFound(id))?;
            if swap.status.is_terminal() {
                return Err(LedgerError::AlreadyClosed);
            }
            if swap.status != SwapStatus::Pending {
                return Err(LedgerError::NotPending(id));
            }
            if swap.party_b != caller {
                return Err(LedgerError::Unauthorized(caller));
            }
            let required = swap_leg_collateral(swap.notional_b, &self.config.collateral)?;
            if collateral_sent < required {
                return Err(LedgerError::InsufficientCollateral {
                    sent: collateral_sent,
                    required,
                });
            }
        }

        let swap = self.swaps.get_mut(&id).unwrap();
        swap.collateral_b = collateral_sent;
        swap.status = SwapStatus::Active;
        self.index_swap(caller, id);

        self.emit_event(EventPayload::SwapAccepted(SwapAcceptedEvent {
            swap_id: id,
            party_b: caller,
            collateral_b: collateral_sent,
        }));

        Ok(())
    }

    /// Net settlement at or after maturity. Each payout is capped at the
    /// counterparty's posted collateral, so the two payouts always sum to the
    /// total escrow.
    pub fn settle_swap(&mut self, id: SwapId) -> Result<SwapSettlementResult, LedgerError> {
        let (return_a, return_b, outcome) = {
            let swap = self.swaps.get(&id).ok_or(LedgerError::SwapNotFound(id))?;
            if swap.status.is_terminal() {
                return Err(LedgerError::AlreadyClosed);
            }
            if swap.status != SwapStatus::Active {
                return Err(LedgerError::SwapNotActive(id));
            }
            if !swap.is_matured(self.current_time) {
                return Err(LedgerError::NotExpiredYet {
                    expiry: swap.maturity,
                    now: self.current_time,
                });
            }

            let mark_a = self.oracle.get_price(&swap.instrument_a)?.price;
            let mark_b = self.oracle.get_price(&swap.instrument_b)?.price;
            let return_a = leg_return(swap.entry_price_a, mark_a, swap.notional_a)
                .ok_or(LedgerError::AmountOverflow)?;
            let return_b = leg_return(swap.entry_price_b, mark_b, swap.notional_b)
                .ok_or(LedgerError::AmountOverflow)?;
            let outcome = net_settlement(return_a, return_b, swap.collateral_a, swap.collateral_b)
                .ok_or(LedgerError::AmountOverflow)?;
            (return_a, return_b, outcome)
        };

        let swap = self.swaps.get_mut(&id).unwrap();
        swap.status = SwapStatus::Settled;

        self.emit_event(EventPayload::SwapSettled(SwapSettledEvent {
            swap_id: id,
            net: outcome.net,
            payout_a: outcome.payout_a,
            payout_b: outcome.payout_b,
        }));

        Ok(SwapSettlementResult {
            swap_id: id,
            return_a,
            return_b,
            net: outcome.net,
            payout_a: outcome.payout_a,
            payout_b: outcome.payout_b,
        })
    }

    /// Proposer-only withdrawal while no counterparty has accepted.
    pub fn cancel_swap(&mut self, caller: TraderId, id: SwapId) -> Result<Quote, LedgerError> {
        let collateral = {
            let swap = self.swaps.get(&id).ok_or(LedgerError::SwapNotFound(id))?;
            if swap.status.is_terminal() {
                return Err(LedgerError::AlreadyClosed);
            }
            if swap.status != SwapStatus::Pending {
                return Err(LedgerError::NotPending(id));
            }
            if swap.party_a != caller {
                return Err(LedgerError::Unauthorized(caller));
            }
            swap.collateral_a
        };

        let swap = self.swaps.get_mut(&id).unwrap();
        swap.status = SwapStatus::Cancelled;

        self.emit_event(EventPayload::SwapCancelled(SwapCancelledEvent {
            swap_id: id,
            party_a: caller,
            collateral_returned: collateral,
        }));

        Ok(collateral)
    }
}
