use std::{future::Future, pin::Pin, sync::Arc};

use log::*;

use crate::{
    events::{
        EventHandler,
        EventProducer,
        EventType,
        GameInstructionEvent,
        Handler,
        OutboxEvent,
        PlayerMessageEvent,
        TradeCompletedEvent,
        TradeProposedEvent,
    },
    outbound::{Effect, Outbox},
};

type HookFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

#[derive(Default, Clone)]
pub struct EventProducers {
    pub outbox_producer: Vec<EventProducer<OutboxEvent>>,
    pub player_message_producer: Vec<EventProducer<PlayerMessageEvent>>,
    pub game_instruction_producer: Vec<EventProducer<GameInstructionEvent>>,
    pub trade_proposed_producer: Vec<EventProducer<TradeProposedEvent>>,
    pub trade_completed_producer: Vec<EventProducer<TradeCompletedEvent>>,
}

impl EventProducers {
    /// Publish everything one inbound event produced. Outbox subscribers get the whole batch first, then each effect
    /// goes to the subscribers of its own kind, in outbox order.
    pub async fn publish_outbox(&self, outbox: Outbox) {
        if outbox.is_empty() {
            return;
        }
        let effects = outbox.into_effects();
        if !self.outbox_producer.is_empty() {
            let event = OutboxEvent::new(effects.clone());
            for producer in &self.outbox_producer {
                producer.publish_event(event.clone()).await;
            }
        }
        for effect in effects {
            self.publish(effect).await;
        }
    }

    /// Route one engine effect to every subscriber of its event type.
    pub async fn publish(&self, effect: Effect) {
        match EventType::from(effect) {
            EventType::PlayerMessage(ev) => {
                for producer in &self.player_message_producer {
                    producer.publish_event(ev.clone()).await;
                }
            },
            EventType::GameInstruction(ev) => {
                for producer in &self.game_instruction_producer {
                    producer.publish_event(ev.clone()).await;
                }
            },
            EventType::TradeProposed(ev) => {
                for producer in &self.trade_proposed_producer {
                    producer.publish_event(ev.clone()).await;
                }
            },
            EventType::TradeCompleted(ev) => {
                trace!("📬️ Notifying {} trade completed subscribers", self.trade_completed_producer.len());
                for producer in &self.trade_completed_producer {
                    producer.publish_event(ev.clone()).await;
                }
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.outbox_producer.is_empty() &&
            self.player_message_producer.is_empty() &&
            self.game_instruction_producer.is_empty() &&
            self.trade_proposed_producer.is_empty() &&
            self.trade_completed_producer.is_empty()
    }
}

impl From<Effect> for EventType {
    fn from(effect: Effect) -> Self {
        match effect {
            Effect::Player(msg) => EventType::PlayerMessage(PlayerMessageEvent::new(msg)),
            Effect::Game(instruction) => EventType::GameInstruction(GameInstructionEvent::new(instruction)),
            Effect::TradeProposed(trade) => EventType::TradeProposed(TradeProposedEvent::new(trade)),
            Effect::TradeCompleted(record) => EventType::TradeCompleted(TradeCompletedEvent::new(record)),
        }
    }
}

pub struct EventHandlers {
    pub on_outbox: Option<EventHandler<OutboxEvent>>,
    pub on_player_message: Option<EventHandler<PlayerMessageEvent>>,
    pub on_game_instruction: Option<EventHandler<GameInstructionEvent>>,
    pub on_trade_proposed: Option<EventHandler<TradeProposedEvent>>,
    pub on_trade_completed: Option<EventHandler<TradeCompletedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_outbox = hooks.on_outbox.map(|f| EventHandler::new(buffer_size, f));
        let on_player_message = hooks.on_player_message.map(|f| EventHandler::new(buffer_size, f));
        let on_game_instruction = hooks.on_game_instruction.map(|f| EventHandler::new(buffer_size, f));
        let on_trade_proposed = hooks.on_trade_proposed.map(|f| EventHandler::new(buffer_size, f));
        let on_trade_completed = hooks.on_trade_completed.map(|f| EventHandler::new(buffer_size, f));
        Self { on_outbox, on_player_message, on_game_instruction, on_trade_proposed, on_trade_completed }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_outbox {
            result.outbox_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_player_message {
            result.player_message_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_game_instruction {
            result.game_instruction_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_trade_proposed {
            result.trade_proposed_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_trade_completed {
            result.trade_completed_producer.push(handler.subscribe());
        }
        result
    }

    /// Spawn a task per configured handler. The returned handles finish once every producer has been dropped and
    /// queued events have been handled, yielding the number of events each handler saw.
    pub fn start_handlers(self) -> Vec<tokio::task::JoinHandle<u64>> {
        let mut handles = Vec::new();
        if let Some(handler) = self.on_outbox {
            handles.push(tokio::spawn(handler.start_handler()));
        }
        if let Some(handler) = self.on_player_message {
            handles.push(tokio::spawn(handler.start_handler()));
        }
        if let Some(handler) = self.on_game_instruction {
            handles.push(tokio::spawn(handler.start_handler()));
        }
        if let Some(handler) = self.on_trade_proposed {
            handles.push(tokio::spawn(handler.start_handler()));
        }
        if let Some(handler) = self.on_trade_completed {
            handles.push(tokio::spawn(handler.start_handler()));
        }
        handles
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_outbox: Option<Handler<OutboxEvent>>,
    pub on_player_message: Option<Handler<PlayerMessageEvent>>,
    pub on_game_instruction: Option<Handler<GameInstructionEvent>>,
    pub on_trade_proposed: Option<Handler<TradeProposedEvent>>,
    pub on_trade_completed: Option<Handler<TradeCompletedEvent>>,
}

impl EventHooks {
    pub fn on_outbox<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OutboxEvent) -> HookFuture) + Send + Sync + 'static {
        self.on_outbox = Some(Arc::new(f));
        self
    }

    pub fn on_player_message<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(PlayerMessageEvent) -> HookFuture) + Send + Sync + 'static {
        self.on_player_message = Some(Arc::new(f));
        self
    }

    pub fn on_game_instruction<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(GameInstructionEvent) -> HookFuture) + Send + Sync + 'static {
        self.on_game_instruction = Some(Arc::new(f));
        self
    }

    pub fn on_trade_proposed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(TradeProposedEvent) -> HookFuture) + Send + Sync + 'static {
        self.on_trade_proposed = Some(Arc::new(f));
        self
    }

    pub fn on_trade_completed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(TradeCompletedEvent) -> HookFuture) + Send + Sync + 'static {
        self.on_trade_completed = Some(Arc::new(f));
        self
    }
}
