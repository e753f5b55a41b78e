// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Cluster API seam used by the reconcilers.
//!
//! [`CertificateClient`] lists exactly the calls the handlers make, so they can be
//! exercised against an in-memory implementation. `get_*` calls map "not found"
//! to `Ok(None)`: a missing object is the signal to create it, not an error.

use async_trait::async_trait;
use kube::api::{DeleteParams, Patch, PatchParams, PostParams};
use kube::{Api, Client};
use serde_json::json;
use tracing::debug;

use crate::cert_manager::{
    Certificate as CmCertificate, CertificateSpec as CmCertificateSpec, Issuer,
};
use crate::constants::FIELD_MANAGER;
use crate::crd::{Certificate, CertificateStatus};
use crate::errors::Result;

/// Calls the reconcilers make against the cluster.
#[async_trait]
pub trait CertificateClient: Send + Sync {
    /// Fetch a Skupper `Certificate` request.
    async fn get_request(&self, namespace: &str, name: &str) -> Result<Option<Certificate>>;

    /// Replace the status of a Skupper `Certificate` request.
    async fn update_request_status(
        &self,
        namespace: &str,
        name: &str,
        status: &CertificateStatus,
    ) -> Result<()>;

    /// Fetch a cert-manager `Certificate`.
    async fn get_certificate(&self, namespace: &str, name: &str) -> Result<Option<CmCertificate>>;

    async fn create_certificate(&self, namespace: &str, certificate: &CmCertificate) -> Result<()>;

    /// Overwrite the reconciled fields of a cert-manager `Certificate` spec.
    async fn update_certificate(
        &self,
        namespace: &str,
        name: &str,
        spec: &CmCertificateSpec,
    ) -> Result<()>;

    /// Fetch a cert-manager `Issuer`.
    async fn get_issuer(&self, namespace: &str, name: &str) -> Result<Option<Issuer>>;

    async fn create_issuer(&self, namespace: &str, issuer: &Issuer) -> Result<()>;

    /// Delete a cert-manager `Issuer`. Deleting a missing issuer succeeds.
    async fn delete_issuer(&self, namespace: &str, name: &str) -> Result<()>;
}

/// [`CertificateClient`] backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeCertificateClient {
    client: Client,
}

impl KubeCertificateClient {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn requests(&self, namespace: &str) -> Api<Certificate> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn certificates(&self, namespace: &str) -> Api<CmCertificate> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn issuers(&self, namespace: &str) -> Api<Issuer> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

fn post_params() -> PostParams {
    PostParams {
        field_manager: Some(FIELD_MANAGER.to_string()),
        ..Default::default()
    }
}

fn patch_params() -> PatchParams {
    PatchParams {
        field_manager: Some(FIELD_MANAGER.to_string()),
        ..Default::default()
    }
}

#[async_trait]
impl CertificateClient for KubeCertificateClient {
    async fn get_request(&self, namespace: &str, name: &str) -> Result<Option<Certificate>> {
        Ok(self.requests(namespace).get_opt(name).await?)
    }

    async fn update_request_status(
        &self,
        namespace: &str,
        name: &str,
        status: &CertificateStatus,
    ) -> Result<()> {
        let patch = json!({ "status": status });
        self.requests(namespace)
            .patch_status(name, &patch_params(), &Patch::Merge(&patch))
            .await?;
        debug!(namespace, name, status = ?status.status, "Patched certificate request status");
        Ok(())
    }

    async fn get_certificate(&self, namespace: &str, name: &str) -> Result<Option<CmCertificate>> {
        Ok(self.certificates(namespace).get_opt(name).await?)
    }

    async fn create_certificate(&self, namespace: &str, certificate: &CmCertificate) -> Result<()> {
        self.certificates(namespace)
            .create(&post_params(), certificate)
            .await?;
        Ok(())
    }

    async fn update_certificate(
        &self,
        namespace: &str,
        name: &str,
        spec: &CmCertificateSpec,
    ) -> Result<()> {
        let patch = json!({ "spec": spec });
        self.certificates(namespace)
            .patch(name, &patch_params(), &Patch::Merge(&patch))
            .await?;
        Ok(())
    }

    async fn get_issuer(&self, namespace: &str, name: &str) -> Result<Option<Issuer>> {
        Ok(self.issuers(namespace).get_opt(name).await?)
    }

    async fn create_issuer(&self, namespace: &str, issuer: &Issuer) -> Result<()> {
        self.issuers(namespace).create(&post_params(), issuer).await?;
        Ok(())
    }

    async fn delete_issuer(&self, namespace: &str, name: &str) -> Result<()> {
        match self
            .issuers(namespace)
            .delete(name, &DeleteParams::default())
            .await
        {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(e)) if e.code == 404 => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
