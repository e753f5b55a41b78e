// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `handler.rs`

#[cfg(test)]
mod tests {
    use super::super::{
        dispatch, Action, BoundHandler, EventHandler, ResourceHandler, SnapshotCache,
    };
    use crate::crd::{Certificate, CertificateSpec};
    use crate::errors::Result;
    use crate::informer::ObjectKey;
    use async_trait::async_trait;
    use kube::api::ObjectMeta;
    use kube::runtime::reflector::{self, store::Writer, Store};
    use kube::runtime::watcher::Event;
    use std::collections::BTreeMap;

    /// Records every callback and snapshots objects like a real handler.
    #[derive(Default)]
    struct RecordingHandler {
        calls: Vec<String>,
        cache: SnapshotCache<Certificate>,
    }

    #[async_trait]
    impl ResourceHandler for RecordingHandler {
        type Object = Certificate;
        const KIND: &'static str = "test/Certificate";

        fn filter(&self, obj: &Certificate) -> bool {
            obj.spec.is_delegated()
        }

        fn equal(&self, old: &Certificate, new: &Certificate) -> bool {
            old.spec == new.spec
        }

        async fn add(&mut self, key: &ObjectKey, obj: &Certificate) -> Result<()> {
            self.calls.push(format!("add {key}"));
            self.cache.insert(key.clone(), obj.clone());
            Ok(())
        }

        async fn update(
            &mut self,
            key: &ObjectKey,
            _old: &Certificate,
            new: &Certificate,
        ) -> Result<()> {
            self.calls.push(format!("update {key}"));
            self.cache.insert(key.clone(), new.clone());
            Ok(())
        }

        async fn delete(&mut self, key: &ObjectKey, _old: &Certificate) -> Result<()> {
            self.calls.push(format!("delete {key}"));
            self.cache.remove(key);
            Ok(())
        }

        async fn reconcile(&mut self, key: &ObjectKey, _obj: &Certificate) -> Result<()> {
            self.calls.push(format!("reconcile {key}"));
            Ok(())
        }

        fn cache(&self) -> &SnapshotCache<Certificate> {
            &self.cache
        }
    }

    fn request(name: &str, subject: &str, delegated: bool) -> Certificate {
        let settings = if delegated {
            BTreeMap::from([("certificate-controller".into(), "cert-manager".into())])
        } else {
            BTreeMap::new()
        };
        Certificate {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some("sk1".to_string()),
                ..Default::default()
            },
            spec: CertificateSpec {
                subject: subject.to_string(),
                settings,
                ..Default::default()
            },
            status: None,
        }
    }

    fn live_cache() -> (Store<Certificate>, Writer<Certificate>) {
        reflector::store()
    }

    #[tokio::test]
    async fn test_dispatch_lifecycle() {
        let (store, mut writer) = live_cache();
        let mut handler = RecordingHandler::default();
        let key = ObjectKey::namespaced("sk1", "a");

        writer.apply_watcher_event(&Event::Apply(request("a", "one", true)));
        assert_eq!(dispatch(&mut handler, &store, &key).await.unwrap(), Action::Add);

        // Unchanged object: steady-state tick
        assert_eq!(
            dispatch(&mut handler, &store, &key).await.unwrap(),
            Action::Reconcile
        );

        writer.apply_watcher_event(&Event::Apply(request("a", "two", true)));
        assert_eq!(
            dispatch(&mut handler, &store, &key).await.unwrap(),
            Action::Update
        );

        writer.apply_watcher_event(&Event::Delete(request("a", "two", true)));
        assert_eq!(
            dispatch(&mut handler, &store, &key).await.unwrap(),
            Action::Delete
        );

        assert_eq!(
            handler.calls,
            ["add sk1/a", "reconcile sk1/a", "update sk1/a", "delete sk1/a"]
        );
        assert!(handler.cache.is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_unknown_key_is_noop() {
        let (store, _writer) = live_cache();
        let mut handler = RecordingHandler::default();

        let action = dispatch(&mut handler, &store, &ObjectKey::namespaced("sk1", "ghost"))
            .await
            .unwrap();

        assert_eq!(action, Action::Skip);
        assert!(handler.calls.is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_filtered_object_is_noop() {
        let (store, mut writer) = live_cache();
        let mut handler = RecordingHandler::default();
        writer.apply_watcher_event(&Event::Apply(request("a", "one", false)));

        let action = dispatch(&mut handler, &store, &ObjectKey::namespaced("sk1", "a"))
            .await
            .unwrap();

        assert_eq!(action, Action::Skip);
        assert!(handler.calls.is_empty());
    }

    #[tokio::test]
    async fn test_bound_handler_routes_to_dispatch() {
        let (store, mut writer) = live_cache();
        writer.apply_watcher_event(&Event::Apply(request("a", "one", true)));
        let mut bound = BoundHandler::new(RecordingHandler::default(), store);

        assert_eq!(bound.kind(), "test/Certificate");
        assert_eq!(
            bound.handle(&ObjectKey::namespaced("sk1", "a")).await.unwrap(),
            Action::Add
        );
    }

    #[test]
    fn test_action_labels() {
        assert_eq!(Action::Add.as_str(), "add");
        assert_eq!(Action::Skip.as_str(), "skip");
    }
}
