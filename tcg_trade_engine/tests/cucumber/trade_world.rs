use cucumber::World;
use tcg_trade_engine::{outbound::Outbox, TradeEngineError, TradeFlowApi};

#[derive(Default, Debug, World)]
pub struct TradeWorld {
    pub system: Option<TradeSystem>,
}

#[derive(Debug, Default)]
pub struct TradeSystem {
    pub api: TradeFlowApi,
    /// Effects of the most recent event.
    pub last_outbox: Outbox,
    /// Why the most recent event was rejected, if it was.
    pub last_error: Option<TradeEngineError>,
}

impl TradeWorld {
    pub fn api(&self) -> &TradeFlowApi {
        &self.system().api
    }

    pub fn system(&self) -> &TradeSystem {
        self.system.as_ref().expect("Trade engine not initialised")
    }

    pub fn system_mut(&mut self) -> &mut TradeSystem {
        self.system.as_mut().expect("Trade engine not initialised")
    }

    pub fn last_frames(&self) -> Vec<String> {
        self.system().last_outbox.effects().iter().filter_map(|e| e.to_frame()).collect()
    }
}
