pub mod setups;
pub mod steps;
pub mod trade_world;

pub use trade_world::TradeWorld;
