mod ids;

pub mod helpers;

pub use ids::{CardId, IdParseError, PlayerId, TradeId, UNKNOWN_SOURCE};
