//! Option operations: create, purchase, exercise, expire, cancel.
//!
//! The seller's full-notional escrow is the solvency bound: exercise pays the
//! buyer from it, capped at it, and whatever is left flows back to the seller.

use super::core::Ledger;
use super::results::{ExerciseResult, LedgerError};
use crate::collateral::{expiry_for, option_required_collateral, validate_duration};
use crate::events::{
    EventPayload, OptionCancelledEvent, OptionCreatedEvent, OptionExercisedEvent,
    OptionExpiredEvent, OptionPurchasedEvent,
};
use crate::options::{OptionContract, OptionKind, OptionStatus};
use crate::types::{InstrumentId, OptionId, Price, Quote, TraderId};
use rust_decimal::Decimal;

impl Ledger {
    /// Lists a covered option. The seller escrows strike x quantity up front;
    /// the listing is live immediately with no buyer bound.
    pub fn create_option(
        &mut self,
        caller: TraderId,
        instrument: InstrumentId,
        kind: OptionKind,
        strike: Decimal,
        premium: Decimal,
        quantity: Decimal,
        duration_secs: i64,
        collateral_sent: Quote,
    ) -> Result<OptionId, LedgerError> {
        let strike = Price::new(strike).ok_or(LedgerError::InvalidStrike(strike))?;
        if quantity <= Decimal::ZERO {
            return Err(LedgerError::InvalidQuantity(quantity));
        }
        if premium < Decimal::ZERO {
            return Err(LedgerError::InvalidPremium(premium));
        }
        validate_duration(duration_secs, &self.config.collateral)?;
        self.oracle.get_price(&instrument)?;

        let required = option_required_collateral(strike, quantity)?;
        if collateral_sent < required {
            return Err(LedgerError::InsufficientCollateral {
                sent: collateral_sent,
                required,
            });
        }

        let id = self.allocate_option_id();
        let expiry = expiry_for(self.current_time, duration_secs);
        let premium = Quote::new(premium);
        let contract = OptionContract {
            id,
            seller: caller,
            buyer: None,
            instrument: instrument.clone(),
            kind,
            strike,
            premium,
            quantity,
            collateral: collateral_sent,
            created_at: self.current_time,
            expiry,
            status: OptionStatus::Active,
        };

        self.options.insert(id, contract);
        self.index_option(caller, id);
        self.emit_event(EventPayload::OptionCreated(OptionCreatedEvent {
            option_id: id,
            seller: caller,
            instrument,
            kind,
            strike,
            premium,
            quantity,
            collateral: collateral_sent,
            expiry,
        }));

        Ok(id)
    }

    /// Binds the caller as buyer; the premium transfers to the seller.
    pub fn purchase_option(&mut self, caller: TraderId, id: OptionId) -> Result<Quote, LedgerError> {
        let (seller, premium) = {
            let contract = self
                .options
                .get(&id)
                .ok_or(LedgerError::OptionNotFound(id))?;
            if contract.status.is_terminal() {
                return Err(LedgerError::AlreadyClosed);
            }
            if contract.buyer.is_some() {
                return Err(LedgerError::AlreadyPurchased(id));
            }
            if contract.seller == caller {
                return Err(LedgerError::InvalidCounterparty);
            }
            if contract.is_expired(self.current_time) {
                return Err(LedgerError::NotExercisable(id));
            }
            (contract.seller, contract.premium)
        };

        let contract = self.options.get_mut(&id).unwrap();
        contract.buyer = Some(caller);
        self.index_option(caller, id);

        self.emit_event(EventPayload::OptionPurchased(OptionPurchasedEvent {
            option_id: id,
            buyer: caller,
            seller,
            premium,
        }));

        Ok(premium)
    }

    /// Call: mark > strike. Put: mark < strike. Strict oracle read.
    pub fn is_in_the_money(&self, id: OptionId) -> Result<bool, LedgerError> {
        let contract = self
            .options
            .get(&id)
            .ok_or(LedgerError::OptionNotFound(id))?;
        let mark = self.oracle.get_price(&contract.instrument)?.price;
        Ok(contract.is_in_the_money(mark))
    }

    /// Buyer-only, while active and strictly before expiry. The payoff is the
    /// intrinsic value times quantity, capped at the seller's escrow; the
    /// remaining escrow returns to the seller.
    pub fn exercise_option(
        &mut self,
        caller: TraderId,
        id: OptionId,
    ) -> Result<ExerciseResult, LedgerError> {
        let (mark, payoff, returned) = {
            let contract = self
                .options
                .get(&id)
                .ok_or(LedgerError::OptionNotFound(id))?;
            if contract.status.is_terminal() || contract.is_expired(self.current_time) {
                return Err(LedgerError::NotExercisable(id));
            }
            match contract.buyer {
                Some(buyer) if buyer == caller => {}
                Some(_) | None => return Err(LedgerError::Unauthorized(caller)),
            }
            let mark = self.oracle.get_price(&contract.instrument)?.price;
            let payoff = contract
                .exercise_payoff(mark)
                .ok_or(LedgerError::AmountOverflow)?;
            let returned = contract.collateral.sub(payoff);
            (mark, payoff, returned)
        };

        let contract = self.options.get_mut(&id).unwrap();
        contract.status = OptionStatus::Exercised;

        self.emit_event(EventPayload::OptionExercised(OptionExercisedEvent {
            option_id: id,
            buyer: caller,
            mark_price: mark,
            payoff,
            collateral_returned_to_seller: returned,
        }));

        Ok(ExerciseResult {
            option_id: id,
            mark_price: mark,
            payoff,
            collateral_returned_to_seller: returned,
        })
    }

    /// Permissionless sweep for listings past expiry: the full escrow returns
    /// to the seller, whether or not a buyer was ever bound.
    pub fn expire_option(&mut self, id: OptionId) -> Result<Quote, LedgerError> {
        let (seller, collateral) = {
            let contract = self
                .options
                .get(&id)
                .ok_or(LedgerError::OptionNotFound(id))?;
            if contract.status.is_terminal() {
                return Err(LedgerError::AlreadyClosed);
            }
            if !contract.is_expired(self.current_time) {
                return Err(LedgerError::NotExpiredYet {
                    expiry: contract.expiry,
                    now: self.current_time,
                });
            }
            (contract.seller, contract.collateral)
        };

        let contract = self.options.get_mut(&id).unwrap();
        contract.status = OptionStatus::Expired;

        self.emit_event(EventPayload::OptionExpired(OptionExpiredEvent {
            option_id: id,
            seller,
            collateral_returned: collateral,
        }));

        Ok(collateral)
    }

    /// Seller-only delisting, valid only while no buyer is bound.
    pub fn cancel_option(&mut self, caller: TraderId, id: OptionId) -> Result<Quote, LedgerError> {
        let collateral = {
            let contract = self
                .options
                .get(&id)
                .ok_or(LedgerError::OptionNotFound(id))?;
            if contract.status.is_terminal() {
                return Err(LedgerError::AlreadyClosed);
            }
            if contract.seller != caller {
                return Err(LedgerError::Unauthorized(caller));
            }
            if contract.buyer.is_some() {
                return Err(LedgerError::AlreadyPurchased(id));
            }
            contract.collateral
        };

        let contract = self.options.get_mut(&id).unwrap();
        contract.status = OptionStatus::Cancelled;

        self.emit_event(EventPayload::OptionCancelled(OptionCancelledEvent {
            option_id: id,
            seller: caller,
            collateral_returned: collateral,
        }));

        Ok(collateral)
    }
}
