use cucumber::given;
use tcg_trade_engine::{TradeEngineConfig, TradeFlowApi};

use crate::cucumber::{trade_world::TradeSystem, TradeWorld};

#[given("a fresh trade engine")]
async fn fresh_engine(world: &mut TradeWorld) {
    world.system = Some(TradeSystem::default());
}

#[given(expr = "a fresh trade engine that only listens to plugin '{word}'")]
async fn fresh_strict_engine(world: &mut TradeWorld, plugin: String) {
    let config = TradeEngineConfig { plugin_name: plugin, strict_plugin: true };
    world.system = Some(TradeSystem { api: TradeFlowApi::new(config), ..Default::default() });
}
