use dotenvy::dotenv;
use log::info;
use tcg_trade_relay::{cli::handle_command_line_args, config::RelayConfig, relay::run_relay};
use tokio::io::{stdin, stdout, BufReader};

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();
    if handle_command_line_args() {
        return;
    }
    let config = RelayConfig::from_env_or_default();

    info!("🚀️ Starting trade relay for plugin {}", config.engine.plugin_name);
    match run_relay(config, BufReader::new(stdin()), stdout()).await {
        Ok(summary) => {
            info!("🚀️ {summary}");
            println!("Bye!")
        },
        Err(e) => eprintln!("{e}"),
    }
}
