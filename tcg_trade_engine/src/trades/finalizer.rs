use std::collections::BTreeMap;

use log::*;

use crate::{
    custody::{CustodyLedger, Receipt, ReceiptSink},
    errors::TradeEngineError,
    outbound::Outbox,
    trade_types::{CardId, PlayerId, TradeHistoryRecord, TradeId, TradeSide},
    trades::TradeMatcher,
};

/// Completes trades once the custody feed shows both cards in escrow, and keeps the archive of completed trades.
///
/// Finalization depends on receipts alone. Confirmations are recorded but do not gate anything: custody is
/// authoritative, player intent is not.
#[derive(Debug, Default, Clone)]
pub struct TradeFinalizer {
    history: BTreeMap<TradeId, TradeHistoryRecord>,
}

impl TradeFinalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `player` agrees to the terms of `trade_id`. Returns the side that was confirmed.
    pub fn confirm(
        &mut self,
        matcher: &mut TradeMatcher,
        player: &PlayerId,
        trade_id: TradeId,
    ) -> Result<TradeSide, TradeEngineError> {
        let trade = matcher.trade_mut(trade_id).ok_or(TradeEngineError::UnknownTrade(trade_id))?;
        let side = trade
            .side_of_player(player)
            .ok_or_else(|| TradeEngineError::UnauthorizedConfirm { player: player.clone(), trade_id })?;
        trade.mark_confirmed(side);
        debug!("🏁️ {player} confirmed trade {trade_id} (side {side})");
        Ok(side)
    }

    /// Called when a card of an active trade arrives in escrow. Finalizes the trade if the other card is already
    /// there, returning the archived record.
    pub fn on_receipt(
        &mut self,
        matcher: &mut TradeMatcher,
        ledger: &mut CustodyLedger,
        receipt: Receipt,
        outbox: &mut Outbox,
    ) -> Result<Option<TradeHistoryRecord>, TradeEngineError> {
        let Receipt { trade_id, side } = receipt;
        let trade = matcher.trade(trade_id).ok_or(TradeEngineError::UnknownTrade(trade_id))?;
        if !trade.is_received(side.other()) {
            debug!("🏁️ Trade {trade_id}: card {} received, waiting on {}", trade.card(side), trade.card(side.other()));
            return Ok(None);
        }
        let record = self.finalize(matcher, ledger, trade_id, outbox)?;
        Ok(Some(record))
    }

    fn finalize(
        &mut self,
        matcher: &mut TradeMatcher,
        ledger: &mut CustodyLedger,
        trade_id: TradeId,
        outbox: &mut Outbox,
    ) -> Result<TradeHistoryRecord, TradeEngineError> {
        let trade = matcher.remove_trade(trade_id).ok_or(TradeEngineError::UnknownTrade(trade_id))?;
        if !(trade.player_one_confirmed && trade.player_two_confirmed) {
            warn!(
                "🏁️ Trade {trade_id} is finalizing without both confirmations (one: {}, two: {})",
                trade.player_one_confirmed, trade.player_two_confirmed
            );
        }
        let record = TradeHistoryRecord::new(trade);
        let trade = &record.trade;
        outbox.announce_completion(&record);
        for recipient in [TradeSide::Two, TradeSide::One] {
            outbox.give_card(trade.player(recipient).clone(), trade.card_for(recipient).clone());
        }
        ledger.purge(&trade.card_one);
        ledger.purge(&trade.card_two);
        info!(
            "🏁️ Trade {trade_id} complete. {} -> {}: {}, {} -> {}: {}",
            trade.player_one, trade.player_two, trade.card_one, trade.player_two, trade.player_one, trade.card_two
        );
        self.history.insert(trade_id, record.clone());
        outbox.trade_completed(record.clone());
        Ok(record)
    }

    pub fn history(&self) -> impl Iterator<Item = &TradeHistoryRecord> {
        self.history.values()
    }

    pub fn history_record(&self, id: TradeId) -> Option<&TradeHistoryRecord> {
        self.history.get(&id)
    }

    pub fn completed_count(&self) -> usize {
        self.history.len()
    }
}

/// Settles trades while a custody snapshot is being ingested. Receipt flags are flipped through the matcher, and a
/// trade is finalized the moment its second card is registered, before the rest of the snapshot is looked at.
pub struct SettlementSink<'a> {
    pub finalizer: &'a mut TradeFinalizer,
    pub matcher: &'a mut TradeMatcher,
    pub outbox: &'a mut Outbox,
    pub completed: Vec<TradeId>,
    pub discarded: Vec<TradeEngineError>,
}

impl<'a> SettlementSink<'a> {
    pub fn new(finalizer: &'a mut TradeFinalizer, matcher: &'a mut TradeMatcher, outbox: &'a mut Outbox) -> Self {
        Self { finalizer, matcher, outbox, completed: Vec::new(), discarded: Vec::new() }
    }
}

impl ReceiptSink for SettlementSink<'_> {
    fn mark_card_received(&mut self, card: &CardId) -> Option<Receipt> {
        self.matcher.mark_card_received(card)
    }

    fn receipt_recorded(&mut self, ledger: &mut CustodyLedger, receipt: Receipt) {
        match self.finalizer.on_receipt(self.matcher, ledger, receipt, self.outbox) {
            Ok(Some(record)) => self.completed.push(record.id()),
            Ok(None) => {},
            Err(e) => {
                warn!("🏁️ Discarding receipt for trade {} (side {}). {e}", receipt.trade_id, receipt.side);
                self.discarded.push(e);
            },
        }
    }
}
