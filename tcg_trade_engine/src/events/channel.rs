//! Ordered pub-sub delivery of engine events.
//!
//! Components that need to react to trade engine output (the frame writer, an audit mirror, a chat bridge) subscribe
//! to events here. Handlers have no access to engine state; all they receive is the event itself. Each handler runs
//! on its own task and works through its queue one event at a time, awaiting the handler future before taking the
//! next event, so a subscriber sees events in exactly the order the worker published them.
use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::sync::mpsc;

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

pub struct EventHandler<E: Send + Sync + 'static> {
    listener: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E: Send + Sync + 'static> EventHandler<E> {
    pub fn new(buffer_size: usize, handler: Handler<E>) -> Self {
        let (sender, receiver) = mpsc::channel(buffer_size);
        Self { listener: receiver, sender, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer::new(self.sender.clone())
    }

    /// Handle events in arrival order until every producer has been dropped. Returns the number of events handled.
    pub async fn start_handler(self) -> u64 {
        let Self { mut listener, sender, handler } = self;
        debug!("📬️ Starting event handler");
        // The loop ends once the last subscriber goes away.
        drop(sender);
        let mut handled = 0u64;
        while let Some(ev) = listener.recv().await {
            (handler)(ev).await;
            handled += 1;
            trace!("📬️ Event #{handled} handled");
        }
        debug!("📬️ Event handler has shut down after {handled} events");
        handled
    }
}

#[derive(Clone)]
pub struct EventProducer<E: Send + Sync> {
    sender: mpsc::Sender<E>,
}

impl<E: Send + Sync> EventProducer<E> {
    pub fn new(sender: mpsc::Sender<E>) -> Self {
        Self { sender }
    }

    /// Queue an event for the handler. Waits only for queue space, never for the handler. Failures are logged, not
    /// retried.
    pub async fn publish_event(&self, event: E) {
        if let Err(e) = self.sender.send(event).await {
            error!("📬️ Failed to send event: {e}");
        }
    }
}
