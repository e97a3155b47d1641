//! Single-consumer event loop for the trade engine.
//!
//! Offers, confirmations and custody snapshots must be applied strictly one at a time and in arrival order; the
//! idempotent-skip logic in the custody ledger is only sufficient under that ordering. [`TradeWorker`] owns the
//! [`TradeFlowApi`] outright and is the only thing that ever touches it. Everyone else holds a [`TradeEventSender`]
//! and submits events through one mpsc channel.
use log::*;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{errors::WorkerError, events::EventProducers, protocol::TradeEvent, TradeFlowApi};

#[derive(Clone)]
pub struct TradeEventSender {
    sender: mpsc::Sender<TradeEvent>,
}

impl TradeEventSender {
    pub async fn submit(&self, event: TradeEvent) -> Result<(), WorkerError> {
        self.sender.send(event).await.map_err(|_| WorkerError::WorkerStopped)
    }
}

pub struct TradeWorker {
    api: TradeFlowApi,
    producers: EventProducers,
    events: mpsc::Receiver<TradeEvent>,
}

impl TradeWorker {
    pub fn new(api: TradeFlowApi, producers: EventProducers, buffer_size: usize) -> (Self, TradeEventSender) {
        let (sender, events) = mpsc::channel(buffer_size);
        (Self { api, producers, events }, TradeEventSender { sender })
    }

    /// Process events until every [`TradeEventSender`] has been dropped, then hand back the engine so its final
    /// state can be inspected. Dropping the worker's producers at this point lets the hook handlers shut down too.
    pub async fn run(mut self) -> TradeFlowApi {
        info!("🧵️ Trade worker started");
        let mut processed = 0u64;
        while let Some(event) = self.events.recv().await {
            let outbox = self.api.dispatch(event);
            processed += 1;
            self.producers.publish_outbox(outbox).await;
        }
        info!("🧵️ Trade worker stopped after {processed} events. {:?}", self.api);
        self.api
    }

    /// Run the worker on its own task.
    pub fn spawn(self) -> JoinHandle<TradeFlowApi> {
        tokio::spawn(self.run())
    }
}

#[cfg(test)]
mod test {
    use chrono::Utc;

    use super::*;
    use crate::trade_types::{TradeId, TradeStatus};

    #[tokio::test]
    async fn worker_applies_events_in_order() {
        let _ = env_logger::try_init();
        let (worker, sender) = TradeWorker::new(TradeFlowApi::default(), EventProducers::default(), 4);
        let handle = worker.spawn();
        let events = vec![
            TradeEvent::Offer { from: "A".into(), target: "B".into(), card: "X".into() },
            TradeEvent::Offer { from: "B".into(), target: "A".into(), card: "Y".into() },
            TradeEvent::CustodySnapshot { cards: vec!["X".into()], observed_at: Utc::now() },
            TradeEvent::CustodySnapshot { cards: vec!["X".into(), "Y".into()], observed_at: Utc::now() },
        ];
        for event in events {
            sender.submit(event).await.expect("worker is running");
        }
        drop(sender);
        let api = handle.await.expect("worker task panicked");
        assert_eq!(api.status_of(TradeId::new(1)), Some(TradeStatus::Finalized));
        assert_eq!(api.open_offers().count(), 0);
    }
}
