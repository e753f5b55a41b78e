// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Request-side handler: provisions cert-manager resources for Skupper certificates.
//!
//! For every delegated request in a namespace:
//!
//! 1. the namespace gets a self-signed `skupper-issuer`, unless a root issuer is
//!    configured for it
//! 2. a signing request gets a CA certificate and a CA issuer backed by its secret
//! 3. a non-signing request gets a leaf certificate, and loses any issuer it owned
//!    from an earlier signing role
//!
//! Every step is get-then-compare: objects are created when missing and updated
//! when their spec drifted, so a repeated pass over an unchanged request makes no
//! mutating calls. Deleting a request leaves its owned resources to the cluster's
//! garbage collector.

use std::sync::Arc;

use async_trait::async_trait;
use kube::ResourceExt;
use tracing::{debug, info};

use crate::cert_manager::Certificate as CmCertificate;
use crate::client::CertificateClient;
use crate::constants::{
    DEFAULT_ROOT_ISSUER_NAME, HANDLER_SKUPPER_CERTIFICATE, KIND_CERT_MANAGER_CERTIFICATE,
    KIND_ISSUER, KIND_SKUPPER_CERTIFICATE,
};
use crate::crd::Certificate;
use crate::errors::Result;
use crate::handler::{ResourceHandler, SnapshotCache};
use crate::informer::ObjectKey;
use crate::metrics::{record_resource_created, record_resource_deleted, record_resource_updated};
use crate::policy::IssuerPolicy;
use crate::reconcilers::resources::{
    is_owned_by, new_ca_certificate, new_certificate, new_issuer, new_root_issuer,
};
use crate::reconcilers::status::set_request_ready_or_pending;
use crate::status_reasons::REASON_PENDING;

/// Handler for Skupper `Certificate` requests.
pub struct SkupperCertificateHandler {
    client: Arc<dyn CertificateClient>,
    policy: Arc<IssuerPolicy>,
    cache: SnapshotCache<Certificate>,
}

impl SkupperCertificateHandler {
    #[must_use]
    pub fn new(client: Arc<dyn CertificateClient>, policy: Arc<IssuerPolicy>) -> Self {
        Self {
            client,
            policy,
            cache: SnapshotCache::new(),
        }
    }

    async fn reconcile_request(&mut self, key: &ObjectKey, request: &Certificate) -> Result<()> {
        let namespace = key.require_namespace(KIND_SKUPPER_CERTIFICATE)?;

        self.ensure_root_issuer(namespace).await?;
        if request.spec.signing {
            self.ensure_ca_certificate(key, namespace, request).await?;
            self.ensure_issuer(key, namespace, request).await?;
        } else {
            self.ensure_no_issuer(key, namespace, request).await?;
            self.ensure_certificate(key, namespace, request).await?;
        }

        self.cache.insert(key.clone(), request.clone());
        Ok(())
    }

    async fn ensure_root_issuer(&self, namespace: &str) -> Result<()> {
        let configured = self.policy.resolve_root_issuer(namespace);
        if !configured.is_empty() {
            debug!(
                namespace,
                root_issuer = %configured.name,
                "Root issuer configured, skipping creation"
            );
            return Ok(());
        }
        if self
            .client
            .get_issuer(namespace, DEFAULT_ROOT_ISSUER_NAME)
            .await?
            .is_some()
        {
            debug!(namespace, name = DEFAULT_ROOT_ISSUER_NAME, "Root issuer already exists");
            return Ok(());
        }

        info!(namespace, name = DEFAULT_ROOT_ISSUER_NAME, "Creating root issuer");
        self.client
            .create_issuer(namespace, &new_root_issuer(namespace))
            .await?;
        record_resource_created(KIND_ISSUER);
        Ok(())
    }

    async fn ensure_ca_certificate(
        &self,
        key: &ObjectKey,
        namespace: &str,
        request: &Certificate,
    ) -> Result<()> {
        let issuer = self.policy.resolve_issuer(namespace, &request.spec.ca);
        let root_issuer = self.policy.resolve_root_issuer(namespace);
        let desired = new_ca_certificate(request, namespace, &issuer, &root_issuer)?;
        self.apply_certificate(key, namespace, request, &desired).await
    }

    async fn ensure_certificate(
        &self,
        key: &ObjectKey,
        namespace: &str,
        request: &Certificate,
    ) -> Result<()> {
        let issuer = self.policy.resolve_issuer(namespace, &request.spec.ca);
        let desired = new_certificate(request, namespace, &issuer)?;
        self.apply_certificate(key, namespace, request, &desired).await
    }

    /// Create `desired` or bring the existing certificate's spec in line with it.
    /// A newly created certificate leaves the request pending.
    async fn apply_certificate(
        &self,
        key: &ObjectKey,
        namespace: &str,
        request: &Certificate,
        desired: &CmCertificate,
    ) -> Result<()> {
        let name = request.name_any();
        match self.client.get_certificate(namespace, &name).await? {
            Some(current) if current.spec == desired.spec => {
                debug!(key = %key, is_ca = desired.spec.is_ca, "Certificate up to date");
            }
            Some(_) => {
                info!(
                    key = %key,
                    is_ca = desired.spec.is_ca,
                    issuer = %desired.spec.issuer_ref.name,
                    "Updating certificate"
                );
                self.client
                    .update_certificate(namespace, &name, &desired.spec)
                    .await?;
                record_resource_updated(KIND_CERT_MANAGER_CERTIFICATE);
            }
            None => {
                info!(
                    key = %key,
                    is_ca = desired.spec.is_ca,
                    issuer = %desired.spec.issuer_ref.name,
                    "Creating certificate"
                );
                self.client.create_certificate(namespace, desired).await?;
                record_resource_created(KIND_CERT_MANAGER_CERTIFICATE);
                set_request_ready_or_pending(self.client.as_ref(), request, false, REASON_PENDING)
                    .await?;
            }
        }
        Ok(())
    }

    /// CA issuers are never updated once created.
    async fn ensure_issuer(
        &self,
        key: &ObjectKey,
        namespace: &str,
        request: &Certificate,
    ) -> Result<()> {
        let name = request.name_any();
        if self.client.get_issuer(namespace, &name).await?.is_some() {
            debug!(key = %key, "Issuer already exists");
            return Ok(());
        }

        info!(key = %key, "Creating issuer");
        self.client
            .create_issuer(namespace, &new_issuer(request, namespace)?)
            .await?;
        record_resource_created(KIND_ISSUER);
        Ok(())
    }

    /// Remove the issuer left from an earlier signing role, if this request owns it.
    async fn ensure_no_issuer(
        &self,
        key: &ObjectKey,
        namespace: &str,
        request: &Certificate,
    ) -> Result<()> {
        let name = request.name_any();
        let Some(issuer) = self.client.get_issuer(namespace, &name).await? else {
            return Ok(());
        };
        if !is_owned_by(&issuer, request) {
            debug!(key = %key, "Issuer is not owned by this certificate, leaving it");
            return Ok(());
        }

        info!(key = %key, "Removing issuer no longer needed");
        self.client.delete_issuer(namespace, &name).await?;
        record_resource_deleted(KIND_ISSUER);
        Ok(())
    }
}

#[async_trait]
impl ResourceHandler for SkupperCertificateHandler {
    type Object = Certificate;
    const KIND: &'static str = HANDLER_SKUPPER_CERTIFICATE;

    fn filter(&self, obj: &Certificate) -> bool {
        obj.spec.is_delegated()
    }

    fn equal(&self, old: &Certificate, new: &Certificate) -> bool {
        old.spec == new.spec
    }

    async fn add(&mut self, key: &ObjectKey, obj: &Certificate) -> Result<()> {
        self.reconcile_request(key, obj).await
    }

    async fn update(
        &mut self,
        key: &ObjectKey,
        _old: &Certificate,
        new: &Certificate,
    ) -> Result<()> {
        self.reconcile_request(key, new).await
    }

    async fn delete(&mut self, key: &ObjectKey, _old: &Certificate) -> Result<()> {
        if self.cache.remove(key).is_some() {
            info!(key = %key, "Certificate has been deleted");
        }
        Ok(())
    }

    async fn reconcile(&mut self, key: &ObjectKey, obj: &Certificate) -> Result<()> {
        self.reconcile_request(key, obj).await
    }

    fn cache(&self) -> &SnapshotCache<Certificate> {
        &self.cache
    }
}

#[cfg(test)]
#[path = "skupper_certificate_tests.rs"]
mod skupper_certificate_tests;
