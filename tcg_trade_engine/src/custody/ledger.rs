use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::*;

use crate::trade_types::{CardCustodyRecord, CardId, ClaimedSource, PlayerId, TradeId, TradeSide};

/// A card belonging to an active trade has arrived in escrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receipt {
    pub trade_id: TradeId,
    pub side: TradeSide,
}

/// Whatever holds the active trades. The ledger tells it when a newly registered card has arrived; the sink flips
/// the matching receipt flag and reports which trade and side it touched.
#[cfg_attr(test, mockall::automock)]
pub trait ReceiptSink {
    fn mark_card_received(&mut self, card: &CardId) -> Option<Receipt>;

    /// Called with the ledger once the card's custody record exists, before the next card in the snapshot is looked
    /// at. A sink that finalizes trades purges their cards from `ledger` here.
    fn receipt_recorded(&mut self, ledger: &mut CustodyLedger, receipt: Receipt) {
        let _ = (ledger, receipt);
    }
}

/// Source of truth for what currently sits in escrow, and who last claimed each card before handing it over.
#[derive(Debug, Default, Clone)]
pub struct CustodyLedger {
    claims: HashMap<CardId, PlayerId>,
    records: HashMap<CardId, CardCustodyRecord>,
}

impl CustodyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `player` says they are handing `card` over. Last write wins. Nothing is verified.
    pub fn record_claim(&mut self, card: CardId, player: PlayerId) {
        trace!("🗃️ {player} claims card {card}");
        if let Some(previous) = self.claims.insert(card.clone(), player) {
            debug!("🗃️ Claim on {card} by {previous} has been overwritten");
        }
    }

    /// Register every card in the snapshot that the ledger has not seen before.
    ///
    /// Cards that are already registered are skipped entirely, which is what makes ingesting the same snapshot twice
    /// harmless. For each new card that an active trade references, `sink` marks it received, then gets the
    /// [`Receipt`] back through [`ReceiptSink::receipt_recorded`] before the next card is processed. A card purged
    /// by the sink that appears again later in the same snapshot is registered afresh. Receipts are also returned, in
    /// snapshot order.
    pub fn ingest_snapshot<I, S>(&mut self, cards: I, observed_at: DateTime<Utc>, sink: &mut S) -> Vec<Receipt>
    where
        I: IntoIterator<Item = CardId>,
        S: ReceiptSink + ?Sized,
    {
        let mut receipts = Vec::new();
        let mut registered = 0usize;
        for card in cards {
            if self.records.contains_key(&card) {
                trace!("🗃️ Card {card} is already in custody. Skipping");
                continue;
            }
            let claimed_source = ClaimedSource::from(self.claims.get(&card).cloned());
            let receipt = sink.mark_card_received(&card);
            if let Some(r) = receipt {
                debug!("🗃️ Card {card} for trade {} (side {}) has arrived from {claimed_source}", r.trade_id, r.side);
                receipts.push(r);
            } else {
                debug!("🗃️ Card {card} has arrived from {claimed_source}, but it is not part of an active trade");
            }
            let record = CardCustodyRecord {
                card_id: card.clone(),
                claimed_source,
                time_registered: observed_at,
                trade_id: receipt.map(|r| r.trade_id),
            };
            self.records.insert(card, record);
            registered += 1;
            if let Some(r) = receipt {
                sink.receipt_recorded(self, r);
            }
        }
        trace!("🗃️ Snapshot processed. {registered} new cards, {} receipts", receipts.len());
        receipts
    }

    /// Forget everything about `card`. Only called when a trade finalizes.
    pub fn purge(&mut self, card: &CardId) -> Option<CardCustodyRecord> {
        self.claims.remove(card);
        let record = self.records.remove(card);
        if record.is_none() {
            warn!("🗃️ Purging card {card}, but it was never registered as being in custody");
        }
        record
    }

    pub fn claim_for(&self, card: &CardId) -> Option<&PlayerId> {
        self.claims.get(card)
    }

    pub fn record_for(&self, card: &CardId) -> Option<&CardCustodyRecord> {
        self.records.get(card)
    }

    pub fn is_registered(&self, card: &CardId) -> bool {
        self.records.contains_key(card)
    }

    pub fn custody_count(&self) -> usize {
        self.records.len()
    }

    pub fn claim_count(&self) -> usize {
        self.claims.len()
    }

    pub fn records(&self) -> impl Iterator<Item = &CardCustodyRecord> {
        self.records.values()
    }
}
