use thiserror::Error;

use crate::{
    protocol::ProtocolError,
    trade_types::{CardId, PlayerId, TradeId},
};

/// Reasons an inbound event was discarded. None of these are fatal: the engine logs them and carries on with its
/// state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TradeEngineError {
    #[error("Could not parse trade command. {0}")]
    ProtocolParse(#[from] ProtocolError),
    #[error("Trade {0} is not an active trade")]
    UnknownTrade(TradeId),
    #[error("{player} is not a party to trade {trade_id}")]
    UnauthorizedConfirm { player: PlayerId, trade_id: TradeId },
    #[error("Card {card} is already committed to trade {trade_id}")]
    CardAlreadyCommitted { card: CardId, trade_id: TradeId },
    #[error("No handler for custom command '{0}'")]
    UnknownCommand(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkerError {
    #[error("The trade worker has shut down and is no longer accepting events")]
    WorkerStopped,
}
