// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Watch adaptor turning Kubernetes watch notifications into queue keys.
//!
//! An [`Informer`] keeps a [`reflector`] store (the live cache) up to date from a
//! [`watcher`] stream and hands the key of every touched object to an enqueue
//! callback. It never runs handler logic itself.
//!
//! # Notifications
//!
//! - `Apply` / `Delete`: the store is updated, then the key is enqueued
//! - `Init` .. `InitDone`: a relist. The store swaps in the relisted objects on
//!   `InitDone`; every relisted key is enqueued then, together with keys that
//!   vanished while the watch was disconnected
//! - every [`RESYNC_PERIOD`] all keys in the store are enqueued again

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use kube::runtime::reflector::{self, ObjectRef, Store};
use kube::runtime::{watcher, WatchStreamExt};
use kube::{Api, Resource};
use serde::de::DeserializeOwned;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::constants::RESYNC_PERIOD;
use crate::errors::{Error, Result};

/// Identity of a watched object: `namespace/name`, or `name` for cluster-scoped objects.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub namespace: Option<String>,
    pub name: String,
}

impl ObjectKey {
    #[must_use]
    pub fn new(namespace: Option<&str>, name: &str) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            name: name.to_string(),
        }
    }

    /// Key of a namespaced object.
    #[must_use]
    pub fn namespaced(namespace: &str, name: &str) -> Self {
        Self::new(Some(namespace), name)
    }

    /// Build the key of `obj`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingName`] when the object has no name.
    pub fn from_resource<K: Resource>(obj: &K) -> Result<Self> {
        let meta = obj.meta();
        let name = meta
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or(Error::MissingName {
                kind: std::any::type_name::<K>(),
            })?;
        Ok(Self::new(meta.namespace.as_deref(), name))
    }

    /// Reference used to look the object up in a reflector store.
    #[must_use]
    pub fn object_ref<K>(&self) -> ObjectRef<K>
    where
        K: Resource<DynamicType = ()>,
    {
        let reference = ObjectRef::new(&self.name);
        match &self.namespace {
            Some(namespace) => reference.within(namespace),
            None => reference,
        }
    }

    /// Namespace of a namespaced object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingNamespace`] for cluster-scoped keys.
    pub fn require_namespace(&self, kind: &'static str) -> Result<&str> {
        self.namespace
            .as_deref()
            .ok_or_else(|| Error::MissingNamespace {
                kind,
                name: self.name.clone(),
            })
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{namespace}/{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Watches one resource kind and mirrors it into a reflector store.
pub struct Informer<K>
where
    K: Resource<DynamicType = ()> + Clone + 'static,
{
    api: Api<K>,
    config: watcher::Config,
    store: Store<K>,
    writer: reflector::store::Writer<K>,
    synced: Arc<AtomicBool>,
    resync_period: Duration,
}

impl<K> Informer<K>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + fmt::Debug + Send + Sync + 'static,
{
    /// Create an informer over every object reachable through `api`.
    #[must_use]
    pub fn new(api: Api<K>) -> Self {
        let (store, writer) = reflector::store();
        Self {
            api,
            config: watcher::Config::default(),
            store,
            writer,
            synced: Arc::new(AtomicBool::new(false)),
            resync_period: RESYNC_PERIOD,
        }
    }

    /// Live cache read by the dispatcher.
    #[must_use]
    pub fn store(&self) -> Store<K> {
        self.store.clone()
    }

    /// Flag raised once the initial list has been loaded into the store.
    #[must_use]
    pub fn synced(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.synced)
    }

    /// Watch until the stream ends or the task is aborted, calling `enqueue` with
    /// the key of every object that may need processing.
    pub async fn run<F>(self, enqueue: F)
    where
        F: Fn(ObjectKey) + Send,
    {
        let Self {
            api,
            config,
            store,
            mut writer,
            synced,
            resync_period,
        } = self;
        let kind = K::kind(&());

        let mut stream = watcher(api, config).default_backoff().boxed();
        let mut resync = interval_at(Instant::now() + resync_period, resync_period);
        resync.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut tracker = KeyTracker::default();

        info!(kind = %kind, "Starting informer");
        loop {
            tokio::select! {
                event = stream.next() => {
                    let Some(event) = event else {
                        warn!(kind = %kind, "Watch stream ended");
                        break;
                    };
                    match event {
                        Ok(event) => {
                            writer.apply_watcher_event(&event);
                            for key in tracker.observe(&event) {
                                enqueue(key);
                            }
                            let initial_sync = matches!(event, watcher::Event::InitDone)
                                && !synced.swap(true, Ordering::SeqCst);
                            if initial_sync {
                                let objects = store.state().len();
                                info!(kind = %kind, objects, "Informer synced");
                            }
                        }
                        Err(e) => warn!(kind = %kind, error = %e, "Watch error, backing off"),
                    }
                }
                _ = resync.tick(), if synced.load(Ordering::SeqCst) => {
                    let objects = store.state();
                    debug!(kind = %kind, objects = objects.len(), "Resync");
                    for obj in objects {
                        if let Some(key) = key_or_warn(obj.as_ref()) {
                            enqueue(key);
                        }
                    }
                }
            }
        }
    }
}

fn key_or_warn<K: Resource>(obj: &K) -> Option<ObjectKey> {
    match ObjectKey::from_resource(obj) {
        Ok(key) => Some(key),
        Err(e) => {
            warn!(error = %e, uid = ?obj.meta().uid, "Dropping notification");
            None
        }
    }
}

/// Tracks which keys the watch has reported so deletions missed during a
/// disconnect can be detected on relist.
#[derive(Default)]
struct KeyTracker {
    known: HashSet<ObjectKey>,
    relisted: HashSet<ObjectKey>,
}

impl KeyTracker {
    /// Keys to enqueue for `event`, after it has been applied to the store.
    fn observe<K: Resource>(&mut self, event: &watcher::Event<K>) -> Vec<ObjectKey> {
        match event {
            watcher::Event::Apply(obj) => key_or_warn(obj)
                .map(|key| {
                    self.known.insert(key.clone());
                    vec![key]
                })
                .unwrap_or_default(),
            watcher::Event::Delete(obj) => key_or_warn(obj)
                .map(|key| {
                    self.known.remove(&key);
                    vec![key]
                })
                .unwrap_or_default(),
            watcher::Event::Init => {
                self.relisted.clear();
                Vec::new()
            }
            watcher::Event::InitApply(obj) => {
                if let Some(key) = key_or_warn(obj) {
                    self.relisted.insert(key);
                }
                Vec::new()
            }
            watcher::Event::InitDone => {
                let relisted = std::mem::take(&mut self.relisted);
                let vanished = std::mem::replace(&mut self.known, relisted);
                let mut keys: Vec<ObjectKey> = vanished
                    .into_iter()
                    .filter(|key| !self.known.contains(key))
                    .collect();
                keys.extend(self.known.iter().cloned());
                keys
            }
        }
    }
}

#[cfg(test)]
#[path = "informer_tests.rs"]
mod informer_tests;
