//! TCG Trade Engine
//!
//! The trade engine reconciles peer-to-peer card trades for a game-integration bot. It takes two untrusted, unrelated
//! inputs and turns them into one outcome:
//!
//! 1. Player trade intents (`offer` and `confirm` commands). These are advisory. A player saying they will hand a card
//!    over is recorded as a claim and nothing more.
//! 2. Custody snapshots from the game, listing every card currently sitting in the escrow account. These are
//!    authoritative.
//!
//! Two complementary offers ("A gives X to B", "B gives Y to A") are matched into a [`Trade`](trade_types::Trade).
//! When the custody feed shows both X and Y in escrow, the trade is finalized: both players are told, the game is
//! instructed to release each card to its new owner, and the trade is archived.
//!
//! The library is divided into:
//! * [`mod@custody`]: the custody ledger (what is in escrow, and who claimed it).
//! * [`mod@trades`]: the offer registry, the matcher and the finalizer.
//! * [`TradeFlowApi`]: the public API tying those together, one event at a time.
//! * [`mod@protocol`]: decoding of inbound websocket frames and rendering of outbound ones.
//! * [`mod@events`]: hooks so that other components can react to what the engine produces.
//! * [`TradeWorker`]: the single-consumer event loop that owns the engine in a running system.
//!
//! All state is in memory. A restart forgets every offer, trade and custody record.
pub mod custody;
pub mod errors;
pub mod events;
pub mod outbound;
pub mod protocol;
pub mod trade_types;
pub mod trades;

mod trade_flow_api;
mod worker;

pub use errors::{TradeEngineError, WorkerError};
pub use trade_flow_api::{TradeEngineConfig, TradeFlowApi};
pub use worker::{TradeEventSender, TradeWorker};
