use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{DepositEvent, EventHandler, EventProducer, Handler, OrderEvent};

type HookFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Everything the broker APIs publish to. The default value publishes nowhere, which is what most tests want.
#[derive(Default, Clone)]
pub struct EventProducers {
    pub order_producers: Vec<EventProducer<OrderEvent>>,
    pub deposit_producers: Vec<EventProducer<DepositEvent>>,
}

impl EventProducers {
    pub async fn publish_order_event(&self, event: OrderEvent) {
        for producer in &self.order_producers {
            producer.publish_event(event.clone()).await;
        }
    }

    pub async fn publish_deposit_event(&self, event: DepositEvent) {
        for producer in &self.deposit_producers {
            producer.publish_event(event.clone()).await;
        }
    }
}

/// One handler per kind of event, created from a set of [`EventHooks`].
pub struct EventHandlers {
    pub on_order_event: Option<EventHandler<OrderEvent>>,
    pub on_deposit_event: Option<EventHandler<DepositEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let EventHooks { on_order_event, on_deposit_event } = hooks;
        Self {
            on_order_event: on_order_event.map(|hook| EventHandler::new(buffer_size, hook)),
            on_deposit_event: on_deposit_event.map(|hook| EventHandler::new(buffer_size, hook)),
        }
    }

    /// Producers wired to every handler that has a hook. Take these before calling [`Self::start_handlers`].
    pub fn producers(&self) -> EventProducers {
        EventProducers {
            order_producers: self.on_order_event.iter().map(EventHandler::subscribe).collect(),
            deposit_producers: self.on_deposit_event.iter().map(EventHandler::subscribe).collect(),
        }
    }

    /// Spawns each handler on the runtime. They stop once the last producer is dropped.
    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_order_event {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_deposit_event {
            tokio::spawn(handler.start_handler());
        }
    }
}

/// The async closures to run for each order and deposit event.
#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_order_event: Option<Handler<OrderEvent>>,
    pub on_deposit_event: Option<Handler<DepositEvent>>,
}

impl EventHooks {
    pub fn on_order_event<F>(&mut self, f: F) -> &mut Self
    where F: Fn(OrderEvent) -> HookFuture + Send + Sync + 'static {
        self.on_order_event = Some(Arc::new(f));
        self
    }

    pub fn on_deposit_event<F>(&mut self, f: F) -> &mut Self
    where F: Fn(DepositEvent) -> HookFuture + Send + Sync + 'static {
        self.on_deposit_event = Some(Arc::new(f));
        self
    }
}
