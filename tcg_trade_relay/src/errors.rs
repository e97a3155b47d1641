use tcg_trade_engine::WorkerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("An I/O error happened in the relay. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Could not hand the event to the trade engine. {0}")]
    WorkerError(#[from] WorkerError),
    #[error("A relay task stopped unexpectedly. {0}")]
    TaskFailed(String),
}
