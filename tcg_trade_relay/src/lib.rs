//! # TCG trade relay
//!
//! Connects the trade engine to the outside world. Game websocket frames are read one per line, decoded, and handed to
//! the [`TradeWorker`](tcg_trade_engine::TradeWorker). Every frame the engine wants sent back (player messages and
//! card transfer instructions) is written out one per line.
//!
//! Configuration is read from environment variables; see [`config::RelayConfig`].
pub mod cli;
pub mod config;
pub mod errors;
pub mod relay;
