// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Authority-side handler: reflects cert-manager certificate readiness back onto the
//! Skupper `Certificate` that requested it.
//!
//! Only certificates controlled by a Skupper `Certificate` are handled. A change is
//! significant when the `Ready` condition's status or reason changes. A deleted
//! cert-manager certificate always sends its request back to `Pending`.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::cert_manager::Certificate as CmCertificate;
use crate::client::CertificateClient;
use crate::constants::{HANDLER_CERT_MANAGER_CERTIFICATE, KIND_CERT_MANAGER_CERTIFICATE};
use crate::errors::Result;
use crate::handler::{ResourceHandler, SnapshotCache};
use crate::informer::ObjectKey;
use crate::reconcilers::resources::{is_owned_by_skupper, owning_request_name};
use crate::reconcilers::status::{certificate_ready_reason, set_request_ready_or_pending};
use crate::status_reasons::REASON_PENDING;

/// Handler for cert-manager `Certificate` resources.
pub struct CertManagerCertificateHandler {
    client: Arc<dyn CertificateClient>,
    cache: SnapshotCache<CmCertificate>,
}

impl CertManagerCertificateHandler {
    #[must_use]
    pub fn new(client: Arc<dyn CertificateClient>) -> Self {
        Self {
            client,
            cache: SnapshotCache::new(),
        }
    }

    /// Write `ready`/`reason` onto the owning request. A missing request is not an
    /// error: it was deleted and its certificate will follow.
    async fn propagate(
        &self,
        key: &ObjectKey,
        certificate: &CmCertificate,
        ready: bool,
        reason: &str,
    ) -> Result<()> {
        let namespace = key.require_namespace(KIND_CERT_MANAGER_CERTIFICATE)?;
        let request_name = owning_request_name(certificate);

        let Some(request) = self.client.get_request(namespace, &request_name).await? else {
            debug!(key = %key, request = %request_name, "Owning certificate request not found");
            return Ok(());
        };

        if set_request_ready_or_pending(self.client.as_ref(), &request, ready, reason).await? {
            info!(
                key = %key,
                request = %request_name,
                ready,
                reason,
                "Updated certificate request status"
            );
        }
        Ok(())
    }

    async fn observe(&mut self, key: &ObjectKey, certificate: &CmCertificate) -> Result<()> {
        let (ready, reason) = certificate_ready_reason(certificate);
        self.propagate(key, certificate, ready, &reason).await?;
        self.cache.insert(key.clone(), certificate.clone());
        Ok(())
    }
}

#[async_trait]
impl ResourceHandler for CertManagerCertificateHandler {
    type Object = CmCertificate;
    const KIND: &'static str = HANDLER_CERT_MANAGER_CERTIFICATE;

    fn filter(&self, obj: &CmCertificate) -> bool {
        is_owned_by_skupper(obj)
    }

    fn equal(&self, old: &CmCertificate, new: &CmCertificate) -> bool {
        certificate_ready_reason(old) == certificate_ready_reason(new)
    }

    async fn add(&mut self, key: &ObjectKey, obj: &CmCertificate) -> Result<()> {
        self.observe(key, obj).await
    }

    async fn update(
        &mut self,
        key: &ObjectKey,
        _old: &CmCertificate,
        new: &CmCertificate,
    ) -> Result<()> {
        self.observe(key, new).await
    }

    async fn delete(&mut self, key: &ObjectKey, old: &CmCertificate) -> Result<()> {
        info!(key = %key, "cert-manager certificate deleted");
        self.propagate(key, old, false, REASON_PENDING).await?;
        self.cache.remove(key);
        Ok(())
    }

    async fn reconcile(&mut self, _key: &ObjectKey, _obj: &CmCertificate) -> Result<()> {
        Ok(())
    }

    fn cache(&self) -> &SnapshotCache<CmCertificate> {
        &self.cache
    }
}

#[cfg(test)]
#[path = "cert_manager_certificate_tests.rs"]
mod cert_manager_certificate_tests;
