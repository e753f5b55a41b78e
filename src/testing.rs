// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Test fixtures shared by the unit tests: request builders and an in-memory
//! [`CertificateClient`] that records every mutating call.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use kube::api::ObjectMeta;

use crate::cert_manager::{
    Certificate as CmCertificate, CertificateSpec as CmCertificateSpec, Issuer,
};
use crate::crd::{Certificate, CertificateSpec, CertificateStatus};
use crate::errors::Result;
use crate::client::CertificateClient;

type Key = (String, String);

fn key(namespace: &str, name: &str) -> Key {
    (namespace.to_string(), name.to_string())
}

/// A Skupper `Certificate` delegated to this controller, with uid and generation set.
pub fn request(namespace: &str, name: &str, spec: CertificateSpec) -> Certificate {
    let mut spec = spec;
    spec.settings
        .insert("certificate-controller".to_string(), "cert-manager".to_string());
    Certificate {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            uid: Some(format!("uid-{namespace}-{name}")),
            generation: Some(1),
            ..Default::default()
        },
        spec,
        status: None,
    }
}

/// A signing request, `{ca: "", subject: name, signing: true}`.
pub fn signing_request(namespace: &str, name: &str) -> Certificate {
    request(
        namespace,
        name,
        CertificateSpec {
            subject: name.to_string(),
            signing: true,
            ..Default::default()
        },
    )
}

/// A leaf request signed by `ca`.
pub fn leaf_request(namespace: &str, name: &str, ca: &str, hosts: &[&str]) -> Certificate {
    request(
        namespace,
        name,
        CertificateSpec {
            ca: ca.to_string(),
            subject: name.to_string(),
            hosts: hosts.iter().map(ToString::to_string).collect(),
            server: true,
            ..Default::default()
        },
    )
}

#[derive(Default)]
struct FakeState {
    requests: HashMap<Key, Certificate>,
    certificates: BTreeMap<Key, CmCertificate>,
    issuers: BTreeMap<Key, Issuer>,
    mutations: Vec<String>,
}

/// In-memory cluster. Mutations are applied and logged as
/// `"<verb> <Kind> <namespace>/<name>"`.
#[derive(Default)]
pub struct FakeClient {
    state: Mutex<FakeState>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn insert_request(&self, request: &Certificate) {
        let meta = &request.metadata;
        self.state().requests.insert(
            key(meta.namespace.as_deref().unwrap(), meta.name.as_deref().unwrap()),
            request.clone(),
        );
    }

    pub fn insert_certificate(&self, certificate: &CmCertificate) {
        let meta = &certificate.metadata;
        self.state().certificates.insert(
            key(meta.namespace.as_deref().unwrap(), meta.name.as_deref().unwrap()),
            certificate.clone(),
        );
    }

    pub fn insert_issuer(&self, issuer: &Issuer) {
        let meta = &issuer.metadata;
        self.state().issuers.insert(
            key(meta.namespace.as_deref().unwrap(), meta.name.as_deref().unwrap()),
            issuer.clone(),
        );
    }

    pub fn remove_request(&self, namespace: &str, name: &str) {
        self.state().requests.remove(&key(namespace, name));
    }

    pub fn request(&self, namespace: &str, name: &str) -> Option<Certificate> {
        self.state().requests.get(&key(namespace, name)).cloned()
    }

    pub fn certificate(&self, namespace: &str, name: &str) -> Option<CmCertificate> {
        self.state().certificates.get(&key(namespace, name)).cloned()
    }

    pub fn issuer(&self, namespace: &str, name: &str) -> Option<Issuer> {
        self.state().issuers.get(&key(namespace, name)).cloned()
    }

    pub fn certificates(&self) -> Vec<CmCertificate> {
        self.state().certificates.values().cloned().collect()
    }

    pub fn issuers(&self) -> Vec<Issuer> {
        self.state().issuers.values().cloned().collect()
    }

    /// Every mutating call so far, in order.
    pub fn mutations(&self) -> Vec<String> {
        self.state().mutations.clone()
    }

    pub fn clear_mutations(&self) {
        self.state().mutations.clear();
    }
}

#[async_trait]
impl CertificateClient for FakeClient {
    async fn get_request(&self, namespace: &str, name: &str) -> Result<Option<Certificate>> {
        Ok(self.request(namespace, name))
    }

    async fn update_request_status(
        &self,
        namespace: &str,
        name: &str,
        status: &CertificateStatus,
    ) -> Result<()> {
        let mut state = self.state();
        state
            .mutations
            .push(format!("status Certificate {namespace}/{name}"));
        if let Some(request) = state.requests.get_mut(&key(namespace, name)) {
            request.status = Some(status.clone());
        }
        Ok(())
    }

    async fn get_certificate(&self, namespace: &str, name: &str) -> Result<Option<CmCertificate>> {
        Ok(self.certificate(namespace, name))
    }

    async fn create_certificate(&self, namespace: &str, certificate: &CmCertificate) -> Result<()> {
        let name = certificate.metadata.name.clone().unwrap_or_default();
        let mut state = self.state();
        state
            .mutations
            .push(format!("create Certificate {namespace}/{name}"));
        state
            .certificates
            .insert(key(namespace, &name), certificate.clone());
        Ok(())
    }

    async fn update_certificate(
        &self,
        namespace: &str,
        name: &str,
        spec: &CmCertificateSpec,
    ) -> Result<()> {
        let mut state = self.state();
        state
            .mutations
            .push(format!("update Certificate {namespace}/{name}"));
        if let Some(certificate) = state.certificates.get_mut(&key(namespace, name)) {
            certificate.spec = spec.clone();
        }
        Ok(())
    }

    async fn get_issuer(&self, namespace: &str, name: &str) -> Result<Option<Issuer>> {
        Ok(self.issuer(namespace, name))
    }

    async fn create_issuer(&self, namespace: &str, issuer: &Issuer) -> Result<()> {
        let name = issuer.metadata.name.clone().unwrap_or_default();
        let mut state = self.state();
        state.mutations.push(format!("create Issuer {namespace}/{name}"));
        state.issuers.insert(key(namespace, &name), issuer.clone());
        Ok(())
    }

    async fn delete_issuer(&self, namespace: &str, name: &str) -> Result<()> {
        let mut state = self.state();
        state.mutations.push(format!("delete Issuer {namespace}/{name}"));
        state.issuers.remove(&key(namespace, name));
        Ok(())
    }
}
