// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation handler contract and the generic dispatch routine.
//!
//! Each watched resource kind has one [`ResourceHandler`]. The handler keeps its
//! own snapshot of the objects it has processed, so [`dispatch`] can tell a new
//! object from a changed one and still hand a deleted object to the handler after
//! the live cache has dropped it.
//!
//! # Dispatch
//!
//! | live cache | snapshot | filter | equal | callback    |
//! |------------|----------|--------|-------|-------------|
//! | absent     | present  |        |       | `delete`    |
//! | absent     | absent   |        |       | none        |
//! | present    |          | false  |       | none        |
//! | present    | absent   | true   |       | `add`       |
//! | present    | present  | true   | false | `update`    |
//! | present    | present  | true   | true  | `reconcile` |

use std::collections::HashMap;

use async_trait::async_trait;
use kube::runtime::reflector::Store;
use kube::Resource;

use crate::errors::Result;
use crate::informer::ObjectKey;

/// Objects a handler has processed, by key.
pub type SnapshotCache<K> = HashMap<ObjectKey, K>;

/// Lifecycle callbacks for one resource kind.
#[async_trait]
pub trait ResourceHandler: Send {
    /// The watched resource.
    type Object: Resource<DynamicType = ()> + Clone + Send + Sync + 'static;

    /// Handler name used to route queued events and label metrics.
    const KIND: &'static str;

    /// Whether this controller cares about `obj`.
    fn filter(&self, obj: &Self::Object) -> bool;

    /// Whether the change from `old` to `new` is insignificant.
    fn equal(&self, old: &Self::Object, new: &Self::Object) -> bool;

    /// First sighting of `obj`.
    async fn add(&mut self, key: &ObjectKey, obj: &Self::Object) -> Result<()>;

    /// Significant change from `old` to `new`.
    async fn update(&mut self, key: &ObjectKey, old: &Self::Object, new: &Self::Object)
        -> Result<()>;

    /// `old` was removed from the cluster.
    async fn delete(&mut self, key: &ObjectKey, old: &Self::Object) -> Result<()>;

    /// Steady-state tick for an unchanged object.
    async fn reconcile(&mut self, key: &ObjectKey, obj: &Self::Object) -> Result<()>;

    /// The handler's snapshot of processed objects.
    fn cache(&self) -> &SnapshotCache<Self::Object>;
}

/// Callback chosen by [`dispatch`], exposed for logging and metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Add,
    Update,
    Delete,
    Reconcile,
    Skip,
}

impl Action {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Reconcile => "reconcile",
            Self::Skip => "skip",
        }
    }
}

/// Route `key` to the right callback of `handler`.
///
/// # Errors
///
/// Returns whatever error the invoked callback returned.
pub async fn dispatch<H>(
    handler: &mut H,
    store: &Store<H::Object>,
    key: &ObjectKey,
) -> Result<Action>
where
    H: ResourceHandler + ?Sized,
{
    let live = store.get(&key.object_ref());
    let old = handler.cache().get(key).cloned();

    let Some(new) = live else {
        return match old {
            Some(old) => handler.delete(key, &old).await.map(|()| Action::Delete),
            None => Ok(Action::Skip),
        };
    };

    if !handler.filter(&new) {
        return Ok(Action::Skip);
    }

    match old {
        None => handler.add(key, &new).await.map(|()| Action::Add),
        Some(old) if !handler.equal(&old, &new) => {
            handler.update(key, &old, &new).await.map(|()| Action::Update)
        }
        Some(_) => handler.reconcile(key, &new).await.map(|()| Action::Reconcile),
    }
}

/// Object-safe view of a handler bound to its live cache, as stored by the
/// event processor.
#[async_trait]
pub trait EventHandler: Send {
    fn kind(&self) -> &'static str;

    async fn handle(&mut self, key: &ObjectKey) -> Result<Action>;
}

/// A [`ResourceHandler`] paired with the store of its informer.
pub struct BoundHandler<H: ResourceHandler> {
    handler: H,
    store: Store<H::Object>,
}

impl<H: ResourceHandler> BoundHandler<H> {
    pub fn new(handler: H, store: Store<H::Object>) -> Self {
        Self { handler, store }
    }
}

#[async_trait]
impl<H> EventHandler for BoundHandler<H>
where
    H: ResourceHandler,
{
    fn kind(&self) -> &'static str {
        H::KIND
    }

    async fn handle(&mut self, key: &ObjectKey) -> Result<Action> {
        dispatch(&mut self.handler, &self.store, key).await
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod handler_tests;
