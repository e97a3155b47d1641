use serde::{Deserialize, Serialize};

use crate::{
    outbound::{Effect, GameInstruction, PlayerMessage},
    trade_types::{Trade, TradeHistoryRecord},
};

/// A message addressed to one player's client plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerMessageEvent {
    pub message: PlayerMessage,
}

impl PlayerMessageEvent {
    pub fn new(message: PlayerMessage) -> Self {
        Self { message }
    }
}

/// An instruction for the game server, e.g. to release a card from escrow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInstructionEvent {
    pub instruction: GameInstruction,
}

impl GameInstructionEvent {
    pub fn new(instruction: GameInstruction) -> Self {
        Self { instruction }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeProposedEvent {
    pub trade: Trade,
}

impl TradeProposedEvent {
    pub fn new(trade: Trade) -> Self {
        Self { trade }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeCompletedEvent {
    pub record: TradeHistoryRecord,
}

impl TradeCompletedEvent {
    pub fn new(record: TradeHistoryRecord) -> Self {
        Self { record }
    }
}

/// Everything one inbound event produced, in the order the engine produced it. Subscribers that need wire order across
/// players and the game (the frame writer, for one) listen for this rather than the per-kind events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboxEvent {
    pub effects: Vec<Effect>,
}

impl OutboxEvent {
    pub fn new(effects: Vec<Effect>) -> Self {
        Self { effects }
    }

    /// Wire frames for the batch, in order.
    pub fn frames(&self) -> impl Iterator<Item = String> + '_ {
        self.effects.iter().filter_map(Effect::to_frame)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    PlayerMessage(PlayerMessageEvent),
    GameInstruction(GameInstructionEvent),
    TradeProposed(TradeProposedEvent),
    TradeCompleted(TradeCompletedEvent),
}
