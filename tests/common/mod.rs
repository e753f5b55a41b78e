// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common test utilities for integration tests

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, DeleteParams, PostParams};
use kube::client::Client;
use tokio::time::{sleep, Instant};

/// CRDs the controller needs installed in the cluster.
pub const REQUIRED_CRDS: [&str; 3] = [
    "certificates.skupper.io",
    "certificates.cert-manager.io",
    "issuers.cert-manager.io",
];

/// Get a Kubernetes client, or `None` when no cluster with the required CRDs is
/// reachable.
pub async fn get_kube_client_or_skip() -> Option<Client> {
    let client = match Client::try_default().await {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Skipping integration test: not running in Kubernetes cluster: {e}");
            return None;
        }
    };

    let crds: Api<CustomResourceDefinition> = Api::all(client.clone());
    for name in REQUIRED_CRDS {
        match crds.get_opt(name).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                eprintln!("Skipping integration test: CRD {name} is not installed");
                return None;
            }
            Err(e) => {
                eprintln!("Skipping integration test: cannot read CRD {name}: {e}");
                return None;
            }
        }
    }
    Some(client)
}

/// Create a test namespace
pub async fn create_test_namespace(
    client: &Client,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    let ns = Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: Some(BTreeMap::from([
                ("test".to_string(), "integration".to_string()),
                ("managed-by".to_string(), "skupper-cert-manager-test".to_string()),
            ])),
            ..Default::default()
        },
        ..Default::default()
    };

    match namespaces.create(&PostParams::default(), &ns).await {
        Ok(_) => {
            println!("Created test namespace: {name}");
            Ok(())
        }
        Err(kube::Error::Api(ae)) if ae.code == 409 => {
            println!("Test namespace already exists: {name}");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

/// Cleanup test namespace
pub async fn cleanup_test_namespace(client: &Client, name: &str) {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    match namespaces.delete(name, &DeleteParams::default()).await {
        Ok(_) => println!("Deleted test namespace: {name}"),
        Err(kube::Error::Api(ae)) if ae.code == 404 => {
            println!("Test namespace already deleted: {name}");
        }
        Err(e) => eprintln!("Failed to delete test namespace {name}: {e}"),
    }
}

/// Poll `check` until it returns `true` or `timeout` elapses.
pub async fn wait_for<F, Fut>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if check().await {
            return true;
        }
        sleep(Duration::from_millis(500)).await;
    }
    false
}
