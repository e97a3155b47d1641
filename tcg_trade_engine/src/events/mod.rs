//! Engine output as subscribable events. Each [`Effect`](crate::outbound::Effect) the engine produces maps onto one
//! event type, and each event type has its own optional hook. The `on_outbox` hook sees each outbox as one batch.
mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
