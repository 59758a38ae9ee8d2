//! Stateless, in-process pub-sub for broker events
//!
//! The broker APIs publish events (an order was claimed, a deposit was accepted, ...) and any number of subscribers
//! react to them. A subscriber is a single async closure that sees each event once and keeps no state between events.
//! Every event runs on its own task, so a slow notifier never holds up an order or deposit transition.
use std::{any::type_name, future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::{
    sync::mpsc::{channel, Receiver, Sender},
    task::{JoinError, JoinSet},
};

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// The consuming end of an event channel. Hand out [`EventProducer`]s with [`EventHandler::subscribe`], then run
/// [`EventHandler::start_handler`] on its own task.
pub struct EventHandler<E: Send + Sync + 'static> {
    inbox: Receiver<E>,
    outbox: Sender<E>,
    hook: Handler<E>,
}

impl<E: Send + Sync + 'static> EventHandler<E> {
    pub fn new(buffer_size: usize, hook: Handler<E>) -> Self {
        let (outbox, inbox) = channel(buffer_size);
        Self { inbox, outbox, hook }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer { outbox: self.outbox.clone() }
    }

    /// Runs until every producer has been dropped, then waits for in-flight hooks to finish.
    pub async fn start_handler(self) {
        let Self { mut inbox, outbox, hook } = self;
        let kind = type_name::<E>();
        debug!("📬️ Listening for {kind}");
        // Only producers may keep the channel open
        drop(outbox);
        let mut running = JoinSet::new();
        while let Some(event) = inbox.recv().await {
            trace!("📬️ Dispatching {kind}");
            let hook = Arc::clone(&hook);
            running.spawn(async move { hook(event).await });
            // Reap finished hooks as we go so the set stays small
            while let Some(done) = running.try_join_next() {
                report(done);
            }
        }
        if !running.is_empty() {
            debug!("📬️ All {kind} producers are gone. Waiting for {} hooks to finish", running.len());
        }
        while let Some(done) = running.join_next().await {
            report(done);
        }
        debug!("📬️ Stopped listening for {kind}");
    }
}

fn report(result: Result<(), JoinError>) {
    if let Err(e) = result {
        warn!("📬️ An event hook did not complete: {e}");
    }
}

/// The publishing end of an event channel. Cloning is cheap.
#[derive(Clone)]
pub struct EventProducer<E: Send + Sync> {
    outbox: Sender<E>,
}

impl<E: Send + Sync> EventProducer<E> {
    /// Queues the event. Waits while the channel is full; if the handler has gone away the event is logged and dropped.
    pub async fn publish_event(&self, event: E) {
        if self.outbox.send(event).await.is_err() {
            error!("📬️ Nobody is listening for {}. The event was dropped", type_name::<E>());
        }
    }
}
