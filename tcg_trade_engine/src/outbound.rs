//! Effects produced while processing one inbound event.
//!
//! The engine never sends anything itself. Every message to a player, every instruction to the game and every
//! trade lifecycle notification is appended to an [`Outbox`] which the caller (usually the
//! [`TradeWorker`](crate::TradeWorker)) hands off to whoever does the actual sending.
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::trade_types::{CardId, PlayerId, Trade, TradeHistoryRecord, TradeSide};

pub const DEFAULT_PLUGIN_NAME: &str = "lb_tcg";

//--------------------------------------    PlayerCommand    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerCommand {
    /// Proposed terms of a freshly matched trade.
    Trade,
    /// The trade has gone through.
    Complete,
}

impl Display for PlayerCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerCommand::Trade => write!(f, "trade"),
            PlayerCommand::Complete => write!(f, "complete"),
        }
    }
}

//--------------------------------------    PlayerMessage    ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerMessage {
    pub player: PlayerId,
    pub plugin: String,
    pub command: PlayerCommand,
    pub payload: String,
}

//--------------------------------------   GameInstruction   ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameInstruction {
    /// Transfer custody of `card` out of escrow to `recipient`.
    GiveCard { recipient: PlayerId, card: CardId },
}

//--------------------------------------       Effect        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Player(PlayerMessage),
    Game(GameInstruction),
    TradeProposed(Trade),
    TradeCompleted(TradeHistoryRecord),
}

//--------------------------------------       Outbox        ---------------------------------------------------------
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    plugin: String,
    effects: Vec<Effect>,
}

impl Outbox {
    pub fn new<S: Into<String>>(plugin: S) -> Self {
        Self { plugin: plugin.into(), effects: Vec::new() }
    }

    /// Tell both players what they are about to swap. Each player sees their own card first.
    pub fn announce_proposal(&mut self, trade: &Trade) {
        for side in [TradeSide::One, TradeSide::Two] {
            let payload = format!("{};{};{}", trade.card(side), trade.card(side.other()), trade.id);
            self.message(trade.player(side).clone(), PlayerCommand::Trade, payload);
        }
        self.effects.push(Effect::TradeProposed(trade.clone()));
    }

    pub fn announce_completion(&mut self, record: &TradeHistoryRecord) {
        let trade = &record.trade;
        for side in [TradeSide::One, TradeSide::Two] {
            self.message(trade.player(side).clone(), PlayerCommand::Complete, trade.id.to_string());
        }
    }

    pub fn give_card(&mut self, recipient: PlayerId, card: CardId) {
        self.effects.push(Effect::Game(GameInstruction::GiveCard { recipient, card }));
    }

    pub fn trade_completed(&mut self, record: TradeHistoryRecord) {
        self.effects.push(Effect::TradeCompleted(record));
    }

    fn message(&mut self, player: PlayerId, command: PlayerCommand, payload: String) {
        let msg = PlayerMessage { player, plugin: self.plugin.clone(), command, payload };
        self.effects.push(Effect::Player(msg));
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn into_effects(self) -> Vec<Effect> {
        self.effects
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn player_messages(&self) -> impl Iterator<Item = &PlayerMessage> {
        self.effects.iter().filter_map(|e| match e {
            Effect::Player(m) => Some(m),
            _ => None,
        })
    }

    pub fn game_instructions(&self) -> impl Iterator<Item = &GameInstruction> {
        self.effects.iter().filter_map(|e| match e {
            Effect::Game(g) => Some(g),
            _ => None,
        })
    }

    pub fn completed_trades(&self) -> impl Iterator<Item = &TradeHistoryRecord> {
        self.effects.iter().filter_map(|e| match e {
            Effect::TradeCompleted(r) => Some(r),
            _ => None,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::trade_types::{TradeId, TradeOffer};

    #[test]
    fn proposal_puts_each_players_card_first() {
        let trade = TradeOffer::new(TradeId::new(4), "alice".into(), "X".into(), "bob".into()).into_trade("Y".into());
        let mut outbox = Outbox::new(DEFAULT_PLUGIN_NAME);
        outbox.announce_proposal(&trade);
        let msgs = outbox.player_messages().cloned().collect::<Vec<_>>();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].player, PlayerId::from("alice"));
        assert_eq!(msgs[0].payload, "X;Y;4");
        assert_eq!(msgs[1].player, PlayerId::from("bob"));
        assert_eq!(msgs[1].payload, "Y;X;4");
        assert!(msgs.iter().all(|m| m.plugin == "lb_tcg" && m.command == PlayerCommand::Trade));
        assert!(matches!(outbox.effects().last(), Some(Effect::TradeProposed(t)) if t.id == TradeId::new(4)));
    }
}
