use std::collections::BTreeMap;

use log::*;

use crate::{
    custody::{CustodyLedger, Receipt, ReceiptSink},
    errors::TradeEngineError,
    trade_types::{CardId, PlayerId, Trade, TradeId, TradeOffer},
    trades::TradeOfferRegistry,
};

/// Hands out trade ids. Starts at 1, never repeats.
#[derive(Debug, Default, Clone)]
pub struct TradeIdSequence {
    last: u64,
}

impl TradeIdSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> TradeId {
        self.last += 1;
        TradeId::new(self.last)
    }

    pub fn last_issued(&self) -> Option<TradeId> {
        (self.last > 0).then(|| TradeId::new(self.last))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfferOutcome {
    /// No complementary offer existed, so a new one-sided offer was opened.
    Pending(TradeOffer),
    /// The offer completed an earlier one from the other player.
    Matched(Trade),
}

/// Turns pairs of complementary one-sided offers into two-sided trades.
#[derive(Debug, Default, Clone)]
pub struct TradeMatcher {
    registry: TradeOfferRegistry,
    trades: BTreeMap<TradeId, Trade>,
    ids: TradeIdSequence,
}

impl TradeMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// `from` offers `card` to `to`.
    ///
    /// The claim is recorded in the ledger, then the oldest open offer from `to` to `from` (if any) is completed with
    /// `card` as the counter-card. Otherwise a new one-sided offer is opened.
    ///
    /// Offering a card that is already part of an open offer or an active trade is rejected, and nothing changes.
    pub fn offer_card(
        &mut self,
        ledger: &mut CustodyLedger,
        from: PlayerId,
        card: CardId,
        to: PlayerId,
    ) -> Result<OfferOutcome, TradeEngineError> {
        if let Some(trade_id) = self.committed_trade_for(&card) {
            return Err(TradeEngineError::CardAlreadyCommitted { card, trade_id });
        }
        ledger.record_claim(card.clone(), from.clone());
        match self.registry.take_first_between(&to, &from) {
            Some(offer) => {
                let trade = offer.into_trade(card);
                info!(
                    "🤝️ Trade {} matched: {} gives {} to {}, {} gives {} to {}",
                    trade.id, trade.player_one, trade.card_one, trade.player_two, trade.player_two, trade.card_two,
                    trade.player_one
                );
                self.trades.insert(trade.id, trade.clone());
                Ok(OfferOutcome::Matched(trade))
            },
            None => {
                let offer = TradeOffer::new(self.ids.next_id(), from, card, to);
                debug!("🤝️ No matching offer. Opened offer {}", offer.id);
                self.registry.insert(offer.clone());
                Ok(OfferOutcome::Pending(offer))
            },
        }
    }

    /// The id of the open offer or active trade that already references `card`.
    pub fn committed_trade_for(&self, card: &CardId) -> Option<TradeId> {
        self.registry
            .offer_for_card(card)
            .map(|o| o.id)
            .or_else(|| self.trades.values().find(|t| t.side_of_card(card).is_some()).map(|t| t.id))
    }

    pub fn trade(&self, id: TradeId) -> Option<&Trade> {
        self.trades.get(&id)
    }

    pub fn trade_mut(&mut self, id: TradeId) -> Option<&mut Trade> {
        self.trades.get_mut(&id)
    }

    /// Take a trade out of the active map. Only the finalizer does this.
    pub fn remove_trade(&mut self, id: TradeId) -> Option<Trade> {
        self.trades.remove(&id)
    }

    pub fn active_trades(&self) -> impl Iterator<Item = &Trade> {
        self.trades.values()
    }

    pub fn active_trade_count(&self) -> usize {
        self.trades.len()
    }

    pub fn registry(&self) -> &TradeOfferRegistry {
        &self.registry
    }

    pub fn last_issued_id(&self) -> Option<TradeId> {
        self.ids.last_issued()
    }
}

impl ReceiptSink for TradeMatcher {
    fn mark_card_received(&mut self, card: &CardId) -> Option<Receipt> {
        self.trades.values_mut().find_map(|trade| {
            let side = trade.side_of_card(card)?;
            trade.mark_received(side);
            Some(Receipt { trade_id: trade.id, side })
        })
    }
}
