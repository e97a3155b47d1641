mod finalizer;
mod matcher;
mod registry;

pub use finalizer::{SettlementSink, TradeFinalizer};
pub use matcher::{OfferOutcome, TradeIdSequence, TradeMatcher};
pub use registry::TradeOfferRegistry;
