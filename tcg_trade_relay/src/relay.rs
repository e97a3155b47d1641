//! The relay loop.
//!
//! Three kinds of task cooperate here:
//! * the reader (this task), which decodes one frame per input line and submits it to the worker,
//! * the [`TradeWorker`], which owns the engine and publishes what it produces to the event hooks,
//! * the writer, which receives rendered frames from the outbox hook and writes them out one per line, in the order
//!   the engine produced them.
//!
//! Shutdown cascades from the input. At end of input the reader drops its sender, the worker drains its queue and
//! stops, which drops the hook producers, which stops the handlers, which drops the frame sender, which stops the
//! writer.
use std::fmt::Display;

use log::*;
use tcg_trade_engine::{
    events::{EventHandlers, EventHooks},
    protocol::TradeEvent,
    TradeFlowApi,
    TradeWorker,
};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt},
    sync::mpsc,
};

use crate::{config::RelayConfig, errors::RelayError};

#[derive(Debug)]
pub struct RelaySummary {
    pub lines_read: u64,
    pub events_submitted: u64,
    pub frames_written: u64,
    /// The engine as it was when the input ran out.
    pub engine: TradeFlowApi,
}

impl Display for RelaySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Read {} lines ({} trade events) and wrote {} frames. {:?}",
            self.lines_read, self.events_submitted, self.frames_written, self.engine
        )
    }
}

/// Relay frames from `input` through the trade engine until `input` is exhausted. Outbound frames are written to
/// `output`.
pub async fn run_relay<R, W>(config: RelayConfig, input: R, output: W) -> Result<RelaySummary, RelayError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (frame_sender, frame_receiver) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_frames(frame_receiver, output));

    let handlers = EventHandlers::new(config.event_buffer_size, relay_hooks(frame_sender));
    let producers = handlers.producers();
    let handler_tasks = handlers.start_handlers();

    let (worker, sender) =
        TradeWorker::new(TradeFlowApi::new(config.engine.clone()), producers, config.event_buffer_size);
    let worker = worker.spawn();

    let plugin = config.engine.strict_plugin.then_some(config.engine.plugin_name.as_str());
    let mut lines = input.lines();
    let mut lines_read = 0u64;
    let mut events_submitted = 0u64;
    while let Some(line) = lines.next_line().await? {
        lines_read += 1;
        if line.trim().is_empty() {
            continue;
        }
        match TradeEvent::from_frame(&line, plugin) {
            Ok(Some(event)) => {
                sender.submit(event).await?;
                events_submitted += 1;
            },
            Ok(None) => trace!("🔌️ Frame is not for the trade engine: {line}"),
            Err(e) => warn!("🔌️ Discarding frame '{line}'. {e}"),
        }
    }
    debug!("🔌️ Input closed after {lines_read} lines. Shutting down");
    drop(sender);

    let engine = worker.await.map_err(|e| RelayError::TaskFailed(format!("Trade worker: {e}")))?;
    for task in handler_tasks {
        task.await.map_err(|e| RelayError::TaskFailed(format!("Event handler: {e}")))?;
    }
    let frames_written = writer.await.map_err(|e| RelayError::TaskFailed(format!("Frame writer: {e}")))??;
    Ok(RelaySummary { lines_read, events_submitted, frames_written, engine })
}

fn relay_hooks(frames: mpsc::UnboundedSender<String>) -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks
        .on_outbox(move |ev| {
            for frame in ev.frames() {
                forward(&frames, frame);
            }
            Box::pin(async {})
        })
        .on_trade_completed(|ev| {
            let trade = &ev.record.trade;
            info!(
                "🔌️ Trade {} settled at {}: {} received {}, {} received {}",
                trade.id, ev.record.finalized_at, trade.player_two, trade.card_one, trade.player_one, trade.card_two
            );
            Box::pin(async {})
        });
    hooks
}

fn forward(frames: &mpsc::UnboundedSender<String>, frame: String) {
    if let Err(e) = frames.send(frame) {
        error!("🔌️ Frame writer has stopped. Dropping frame {}", e.0);
    }
}

async fn write_frames<W>(mut frames: mpsc::UnboundedReceiver<String>, mut output: W) -> Result<u64, RelayError>
where W: AsyncWrite + Unpin {
    let mut written = 0u64;
    while let Some(frame) = frames.recv().await {
        trace!("🔌️ Sending {frame}");
        output.write_all(frame.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
        written += 1;
    }
    output.shutdown().await?;
    Ok(written)
}
