use std::env;

use log::*;
use tcg_common::helpers::{parse_boolean_flag, parse_positive_usize};
use tcg_trade_engine::{outbound::DEFAULT_PLUGIN_NAME, TradeEngineConfig};

pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 256;

#[derive(Clone, Debug)]
pub struct RelayConfig {
    pub engine: TradeEngineConfig,
    /// Capacity of the worker queue and of each hook queue.
    pub event_buffer_size: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self { engine: TradeEngineConfig::default(), event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE }
    }
}

impl RelayConfig {
    pub fn from_env_or_default() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from any variable source. Missing values take their defaults; invalid ones are
    /// reported and replaced by the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where F: Fn(&str) -> Option<String> {
        let plugin_name = lookup("TCG_PLUGIN_NAME")
            .map(|s| s.trim().to_string())
            .filter(|s| {
                let valid = !s.is_empty() && !s.contains([':', '~', '=']);
                if !valid {
                    warn!("🪛️ '{s}' is not a valid plugin name for TCG_PLUGIN_NAME. Using {DEFAULT_PLUGIN_NAME}.");
                }
                valid
            })
            .unwrap_or_else(|| DEFAULT_PLUGIN_NAME.to_string());
        let strict_plugin = parse_boolean_flag(lookup("TCG_STRICT_PLUGIN"), false);
        let event_buffer_size = lookup("TCG_EVENT_BUFFER_SIZE")
            .map(|s| {
                parse_positive_usize(&s).unwrap_or_else(|| {
                    warn!(
                        "🪛️ {s} is not a valid size for TCG_EVENT_BUFFER_SIZE. Using the default, \
                         {DEFAULT_EVENT_BUFFER_SIZE}, instead."
                    );
                    DEFAULT_EVENT_BUFFER_SIZE
                })
            })
            .unwrap_or(DEFAULT_EVENT_BUFFER_SIZE);
        if strict_plugin {
            info!("🪛️ Strict plugin mode is on. Commands for plugins other than {plugin_name} will be ignored.");
        }
        Self { engine: TradeEngineConfig { plugin_name, strict_plugin }, event_buffer_size }
    }
}
