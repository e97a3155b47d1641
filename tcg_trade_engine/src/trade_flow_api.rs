use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;

use crate::{
    custody::CustodyLedger,
    errors::TradeEngineError,
    outbound::{Outbox, DEFAULT_PLUGIN_NAME},
    protocol::TradeEvent,
    trade_types::{CardId, PlayerId, Trade, TradeHistoryRecord, TradeId, TradeOffer, TradeSide, TradeStatus},
    trades::{OfferOutcome, SettlementSink, TradeFinalizer, TradeMatcher},
};

#[derive(Clone, Debug)]
pub struct TradeEngineConfig {
    /// Plugin name stamped on every player message.
    pub plugin_name: String,
    /// If true, custom commands addressed to a different plugin are ignored rather than treated as trade commands.
    pub strict_plugin: bool,
}

impl Default for TradeEngineConfig {
    fn default() -> Self {
        Self { plugin_name: DEFAULT_PLUGIN_NAME.to_string(), strict_plugin: false }
    }
}

/// `TradeFlowApi` is the primary API for reconciling player trade intents against the custody feed.
///
/// It owns all mutable trade state: the custody ledger, the open offers and active trades, and the trade history.
/// Every method runs to completion without blocking and returns the effects it produced in an [`Outbox`]. Events
/// must be applied one at a time, in the order they arrived; the [`TradeWorker`](crate::TradeWorker) enforces this.
pub struct TradeFlowApi {
    config: TradeEngineConfig,
    ledger: CustodyLedger,
    matcher: TradeMatcher,
    finalizer: TradeFinalizer,
}

impl Debug for TradeFlowApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TradeFlowApi({} offers, {} trades, {} in custody, {} complete)",
            self.matcher.registry().len(),
            self.matcher.active_trade_count(),
            self.ledger.custody_count(),
            self.finalizer.completed_count()
        )
    }
}

impl Default for TradeFlowApi {
    fn default() -> Self {
        Self::new(TradeEngineConfig::default())
    }
}

impl TradeFlowApi {
    pub fn new(config: TradeEngineConfig) -> Self {
        Self {
            config,
            ledger: CustodyLedger::new(),
            matcher: TradeMatcher::new(),
            finalizer: TradeFinalizer::new(),
        }
    }

    fn outbox(&self) -> Outbox {
        Outbox::new(self.config.plugin_name.as_str())
    }

    /// `from` offers `card` to `to`. If `to` already offered `from` a card, the two offers become a trade and both
    /// players are told the proposed terms.
    pub fn offer_card(&mut self, from: PlayerId, card: CardId, to: PlayerId) -> Result<Outbox, TradeEngineError> {
        debug!("🔄️🃏️ {from} offers {card} to {to}");
        let mut outbox = self.outbox();
        match self.matcher.offer_card(&mut self.ledger, from, card, to)? {
            OfferOutcome::Matched(trade) => outbox.announce_proposal(&trade),
            OfferOutcome::Pending(offer) => trace!("🔄️🃏️ Offer {} is waiting for a counter-offer", offer.id),
        }
        Ok(outbox)
    }

    /// Record a player's (advisory) agreement to a trade.
    pub fn confirm(&mut self, player: &PlayerId, trade_id: TradeId) -> Result<TradeSide, TradeEngineError> {
        self.finalizer.confirm(&mut self.matcher, player, trade_id)
    }

    /// Apply a custody snapshot. Newly seen cards are registered; any trade whose cards are now both in escrow is
    /// finalized.
    pub fn ingest_snapshot(&mut self, cards: Vec<CardId>, observed_at: DateTime<Utc>) -> Outbox {
        trace!("🔄️📸️ Custody snapshot with {} cards", cards.len());
        let mut outbox = self.outbox();
        let mut sink = SettlementSink::new(&mut self.finalizer, &mut self.matcher, &mut outbox);
        let receipts = self.ledger.ingest_snapshot(cards, observed_at, &mut sink);
        if !sink.completed.is_empty() {
            debug!("🔄️📸️ Snapshot had {} receipts and settled trades {:?}", receipts.len(), sink.completed);
        }
        outbox
    }

    /// Apply one event, reporting why it was rejected if it was.
    pub fn process_event(&mut self, event: TradeEvent) -> Result<Outbox, TradeEngineError> {
        match event {
            TradeEvent::Offer { from, target, card } => self.offer_card(from, card, target),
            TradeEvent::Confirm { player, trade_id } => self.confirm(&player, trade_id).map(|_| self.outbox()),
            TradeEvent::CustodySnapshot { cards, observed_at } => Ok(self.ingest_snapshot(cards, observed_at)),
        }
    }

    /// Apply one event. Rejected events are logged and discarded; state is left as it was.
    pub fn dispatch(&mut self, event: TradeEvent) -> Outbox {
        self.process_event(event).unwrap_or_else(|e| {
            warn!("🔄️ Discarding trade event. {e}");
            self.outbox()
        })
    }

    /// Decode and apply one raw websocket frame. Frames that are not for the engine produce no effects.
    pub fn dispatch_frame(&mut self, line: &str) -> Outbox {
        let plugin = self.config.strict_plugin.then_some(self.config.plugin_name.as_str());
        match TradeEvent::from_frame(line, plugin) {
            Ok(Some(event)) => self.dispatch(event),
            Ok(None) => self.outbox(),
            Err(e) => {
                warn!("🔄️ Discarding frame. {e}");
                self.outbox()
            },
        }
    }

    pub fn status_of(&self, id: TradeId) -> Option<TradeStatus> {
        if self.matcher.registry().get(id).is_some() {
            Some(TradeStatus::Offered)
        } else if self.matcher.trade(id).is_some() {
            Some(TradeStatus::Matched)
        } else if self.finalizer.history_record(id).is_some() {
            Some(TradeStatus::Finalized)
        } else {
            None
        }
    }

    pub fn open_offers(&self) -> impl Iterator<Item = &TradeOffer> {
        self.matcher.registry().iter()
    }

    pub fn offer(&self, id: TradeId) -> Option<&TradeOffer> {
        self.matcher.registry().get(id)
    }

    pub fn active_trades(&self) -> impl Iterator<Item = &Trade> {
        self.matcher.active_trades()
    }

    pub fn trade(&self, id: TradeId) -> Option<&Trade> {
        self.matcher.trade(id)
    }

    pub fn history(&self) -> impl Iterator<Item = &TradeHistoryRecord> {
        self.finalizer.history()
    }

    pub fn history_record(&self, id: TradeId) -> Option<&TradeHistoryRecord> {
        self.finalizer.history_record(id)
    }

    pub fn ledger(&self) -> &CustodyLedger {
        &self.ledger
    }

    pub fn config(&self) -> &TradeEngineConfig {
        &self.config
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::outbound::{Effect, GameInstruction, PlayerCommand};

    fn cards(ids: &[&str]) -> Vec<CardId> {
        ids.iter().map(|s| CardId::from(*s)).collect()
    }

    #[test]
    fn end_to_end_trade() {
        let _ = env_logger::try_init();
        let mut api = TradeFlowApi::default();
        let t1 = TradeId::new(1);

        let outbox = api.offer_card("A".into(), "X".into(), "B".into()).expect("offer accepted");
        assert!(outbox.is_empty());
        assert_eq!(api.open_offers().count(), 1);
        assert_eq!(api.active_trades().count(), 0);
        assert_eq!(api.status_of(t1), Some(TradeStatus::Offered));

        let outbox = api.offer_card("B".into(), "Y".into(), "A".into()).expect("offer accepted");
        assert_eq!(outbox.player_messages().filter(|m| m.command == PlayerCommand::Trade).count(), 2);
        assert_eq!(api.open_offers().count(), 0);
        let trade = api.trade(t1).expect("T1 is active");
        assert_eq!((trade.card_one.as_str(), trade.card_two.as_str()), ("X", "Y"));
        assert!(!trade.card_one_received && !trade.card_two_received);
        assert_eq!(api.status_of(t1), Some(TradeStatus::Matched));

        let outbox = api.ingest_snapshot(cards(&["X"]), Utc::now());
        assert!(outbox.is_empty());
        let trade = api.trade(t1).expect("T1 is active");
        assert!(trade.card_one_received && !trade.card_two_received);

        let outbox = api.ingest_snapshot(cards(&["X", "Y"]), Utc::now());
        let completes = outbox.player_messages().filter(|m| m.command == PlayerCommand::Complete).count();
        assert_eq!(completes, 2);
        let gives = outbox.game_instructions().cloned().collect::<Vec<_>>();
        assert_eq!(gives, vec![
            GameInstruction::GiveCard { recipient: "B".into(), card: "X".into() },
            GameInstruction::GiveCard { recipient: "A".into(), card: "Y".into() },
        ]);
        assert!(matches!(outbox.effects().last(), Some(Effect::TradeCompleted(r)) if r.id() == t1));
        assert!(!api.ledger().is_registered(&"X".into()));
        assert!(!api.ledger().is_registered(&"Y".into()));
        assert!(api.trade(t1).is_none());
        assert_eq!(api.status_of(t1), Some(TradeStatus::Finalized));
    }

    #[test]
    fn finalizes_once_under_repeated_snapshots() {
        let mut api = TradeFlowApi::default();
        api.offer_card("A".into(), "X".into(), "B".into()).expect("offer accepted");
        api.offer_card("B".into(), "Y".into(), "A".into()).expect("offer accepted");
        let first = api.ingest_snapshot(cards(&["X", "Y"]), Utc::now());
        assert_eq!(first.completed_trades().count(), 1);
        // The game has not moved the cards out yet, so they show up again as brand-new custody.
        let second = api.ingest_snapshot(cards(&["X", "Y"]), Utc::now());
        assert!(second.is_empty());
        let third = api.ingest_snapshot(cards(&["X", "Y"]), Utc::now());
        assert!(third.is_empty());
        assert_eq!(api.history().count(), 1);
        assert_eq!(api.ledger().custody_count(), 2);
    }

    #[test]
    fn stranger_confirm_changes_nothing() {
        let mut api = TradeFlowApi::default();
        api.offer_card("A".into(), "X".into(), "B".into()).expect("offer accepted");
        api.offer_card("B".into(), "Y".into(), "A".into()).expect("offer accepted");
        let before = api.trade(TradeId::new(1)).cloned();
        let outbox = api.dispatch(TradeEvent::Confirm { player: "C".into(), trade_id: TradeId::new(1) });
        assert!(outbox.is_empty());
        assert_eq!(api.trade(TradeId::new(1)).cloned(), before);
    }

    #[test]
    fn frames_drive_the_engine() {
        let mut api = TradeFlowApi::new(TradeEngineConfig { plugin_name: "lb_tcg".into(), strict_plugin: true });
        assert!(api.dispatch_frame("CUSTOM=A~1:lb_tcg:offer:B;X").is_empty());
        let out = api.dispatch_frame("CUSTOM=B~2:lb_tcg:offer:A;Y");
        let frames = out.effects().iter().filter_map(Effect::to_frame).collect::<Vec<_>>();
        assert_eq!(frames, vec!["CUSTOM=A~lb_tcg:trade:X;Y;1", "CUSTOM=B~lb_tcg:trade:Y;X;1"]);
        assert!(api.dispatch_frame("CUSTOM=A~3:lb_tcg:confirm:1").is_empty());
        assert!(api.trade(TradeId::new(1)).map(|t| t.player_one_confirmed).unwrap_or(false));
        assert!(api.dispatch_frame("CUSTOM=A~4:other_plugin:confirm:1").is_empty());
        assert!(api.dispatch_frame("garbage without type").is_empty());
        let out = api.dispatch_frame("REFRESH_TCG=X~0~a~Y~0~b");
        let frames = out.effects().iter().filter_map(Effect::to_frame).collect::<Vec<_>>();
        assert_eq!(frames, vec![
            "CUSTOM=A~lb_tcg:complete:1",
            "CUSTOM=B~lb_tcg:complete:1",
            "GIVE_TCG_CARD=B~X",
            "GIVE_TCG_CARD=A~Y",
        ]);
    }
}
