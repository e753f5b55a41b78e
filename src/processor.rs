// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Event processor: one shared queue, many informers, a single consumer.
//!
//! Informers push `(key, handler)` [`Event`]s onto the queue. Exactly one consumer
//! drains it, so no two handler callbacks ever run concurrently and handlers need
//! no locking around their snapshots.
//!
//! # Retry Policy
//!
//! - success: the event's backoff is reset
//! - failure: the event is re-queued with rate-limited backoff, at most
//!   [`MAX_REQUEUES`] times; after that it is dropped with a warning until the next
//!   notification or resync delivers it again

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::de::DeserializeOwned;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::constants::MAX_REQUEUES;
use crate::errors::Error;
use crate::handler::{BoundHandler, EventHandler, ResourceHandler};
use crate::informer::{Informer, ObjectKey};
use crate::metrics;
use crate::queue::RateLimitingQueue;

/// Unit of work: which object changed and which handler owns it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Event {
    pub key: ObjectKey,
    pub handler: &'static str,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.handler, self.key)
    }
}

/// Initial-sync state of every registered informer.
#[derive(Clone, Default)]
pub struct SyncStatus {
    flags: Vec<Arc<AtomicBool>>,
}

impl SyncStatus {
    #[must_use]
    pub fn new(flags: Vec<Arc<AtomicBool>>) -> Self {
        Self { flags }
    }

    /// Whether every informer has loaded its initial list.
    #[must_use]
    pub fn is_synced(&self) -> bool {
        self.flags.iter().all(|flag| flag.load(Ordering::SeqCst))
    }
}

/// Drains the queue, routing each event to its handler.
pub struct Dispatcher {
    queue: RateLimitingQueue<Event>,
    handlers: HashMap<&'static str, Box<dyn EventHandler>>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(queue: RateLimitingQueue<Event>) -> Self {
        Self {
            queue,
            handlers: HashMap::new(),
        }
    }

    pub fn register(&mut self, handler: Box<dyn EventHandler>) {
        self.handlers.insert(handler.kind(), handler);
    }

    /// Process one event. Returns `false` once the queue has shut down.
    pub async fn process_next(&mut self) -> bool {
        let Some(event) = self.queue.get().await else {
            return false;
        };
        metrics::record_queue_depth(self.queue.len());

        match self.handlers.get_mut(event.handler) {
            Some(handler) => {
                let started = Instant::now();
                let result = handler.handle(&event.key).await;
                let elapsed = started.elapsed();

                match result {
                    Ok(action) => {
                        debug!(
                            key = %event.key,
                            kind = event.handler,
                            action = action.as_str(),
                            "Processed event"
                        );
                        metrics::record_reconciliation_success(event.handler, elapsed);
                        self.queue.forget(&event);
                    }
                    Err(e) => {
                        metrics::record_reconciliation_error(event.handler, elapsed);
                        metrics::record_error(event.handler, &e);
                        self.retry_or_drop(&event, &e);
                    }
                }
            }
            None => {
                error!(key = %event.key, kind = event.handler, "No handler registered for event");
                self.queue.forget(&event);
            }
        }

        self.queue.done(&event);
        true
    }

    fn retry_or_drop(&self, event: &Event, err: &Error) {
        let requeues = self.queue.num_requeues(event);
        if requeues < MAX_REQUEUES {
            warn!(
                key = %event.key,
                kind = event.handler,
                attempt = requeues + 1,
                transient = err.is_transient(),
                error = %err,
                "Error processing event, will retry"
            );
            metrics::record_reconciliation_requeue(event.handler, "error");
            self.queue.add_rate_limited(event.clone());
        } else {
            warn!(
                key = %event.key,
                kind = event.handler,
                attempts = requeues + 1,
                error = %err,
                "Dropping event after exhausting retries"
            );
            metrics::record_event_dropped(event.handler);
            self.queue.forget(event);
        }
    }

    /// Process events until the queue shuts down.
    pub async fn run(mut self) {
        while self.process_next().await {}
        debug!("Event dispatcher stopped");
    }
}

/// Owns the queue, the registered handlers and their informers.
pub struct EventProcessor {
    queue: RateLimitingQueue<Event>,
    dispatcher: Dispatcher,
    informers: Vec<BoxFuture<'static, ()>>,
    sync_status: SyncStatus,
}

impl Default for EventProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl EventProcessor {
    /// Processor using the default controller rate limiter.
    #[must_use]
    pub fn new() -> Self {
        Self::with_queue(RateLimitingQueue::with_default_rate_limiter())
    }

    #[must_use]
    pub fn with_queue(queue: RateLimitingQueue<Event>) -> Self {
        Self {
            dispatcher: Dispatcher::new(queue.clone()),
            queue,
            informers: Vec::new(),
            sync_status: SyncStatus::default(),
        }
    }

    /// Register `handler`, fed by `informer`. Must be called before [`Self::start`].
    pub fn add_handler<H>(&mut self, handler: H, informer: Informer<H::Object>)
    where
        H: ResourceHandler + 'static,
        H::Object: DeserializeOwned + fmt::Debug,
    {
        let kind = H::KIND;
        let queue = self.queue.clone();

        self.sync_status.flags.push(informer.synced());
        self.dispatcher
            .register(Box::new(BoundHandler::new(handler, informer.store())));
        self.informers.push(
            informer
                .run(move |key| queue.add(Event { key, handler: kind }))
                .boxed(),
        );
        info!(kind, "Registered handler");
    }

    /// Readiness of the registered informers.
    #[must_use]
    pub fn sync_status(&self) -> SyncStatus {
        self.sync_status.clone()
    }

    /// Watch and process until `shutdown` resolves, then stop the informers and
    /// wait for the event in flight to finish.
    pub async fn start<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let Self {
            queue,
            dispatcher,
            informers,
            ..
        } = self;

        let watchers: Vec<_> = informers.into_iter().map(tokio::spawn).collect();
        let consumer = tokio::spawn(dispatcher.run());
        info!(informers = watchers.len(), "Event processor started");

        shutdown.await;
        info!("Shutting down event processor");

        queue.shut_down();
        for watcher in &watchers {
            watcher.abort();
        }
        if let Err(e) = consumer.await {
            error!(error = %e, "Event dispatcher terminated abnormally");
        }
        info!("Event processor stopped");
    }
}

#[cfg(test)]
#[path = "processor_tests.rs"]
mod processor_tests;
