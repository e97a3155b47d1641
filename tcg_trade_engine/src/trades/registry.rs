use std::collections::BTreeMap;

use log::*;

use crate::trade_types::{CardId, PlayerId, TradeId, TradeOffer};

/// Open one-sided offers, keyed by id. Ids come from a monotonic sequence, so key order is creation order.
#[derive(Debug, Default, Clone)]
pub struct TradeOfferRegistry {
    offers: BTreeMap<TradeId, TradeOffer>,
}

impl TradeOfferRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, offer: TradeOffer) {
        trace!("📋️ Offer {} registered: {} -> {} ({})", offer.id, offer.player_one, offer.player_two, offer.card_one);
        if let Some(old) = self.offers.insert(offer.id, offer) {
            error!("📋️ Offer {} replaced an existing offer with the same id. This is a bug.", old.id);
        }
    }

    /// Remove and return the oldest offer made by `from` to `to`, if any.
    pub fn take_first_between(&mut self, from: &PlayerId, to: &PlayerId) -> Option<TradeOffer> {
        let id = self.offers.values().find(|o| o.is_between(from, to)).map(|o| o.id)?;
        self.offers.remove(&id)
    }

    pub fn offer_for_card(&self, card: &CardId) -> Option<&TradeOffer> {
        self.offers.values().find(|o| &o.card_one == card)
    }

    pub fn get(&self, id: TradeId) -> Option<&TradeOffer> {
        self.offers.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TradeOffer> {
        self.offers.values()
    }

    pub fn len(&self) -> usize {
        self.offers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }
}
