// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Builders for the cert-manager resources provisioned for Skupper certificates.
//!
//! Every builder returns the full desired object; the reconcilers compare its spec
//! against what exists in the cluster.
//!
//! | request          | issuer                                 | certificate                  |
//! |------------------|----------------------------------------|------------------------------|
//! | (namespace)      | `skupper-issuer`, self-signed, unowned |                              |
//! | `signing: true`  | `<name>`, CA from secret `<name>`      | `<name>`, `isCA`, root-signed |
//! | `signing: false` | none                                   | `<name>`, leaf               |

use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::api::ObjectMeta;
use kube::{Resource, ResourceExt};

use crate::cert_manager::{
    CaIssuer, Certificate as CmCertificate, CertificateSpec as CmCertificateSpec, IssuerRef,
    Issuer, IssuerSpec, SelfSignedIssuer,
};
use crate::constants::{
    DEFAULT_CERTIFICATE_DURATION, DEFAULT_ROOT_ISSUER_NAME, KIND_SKUPPER_CERTIFICATE,
    SKUPPER_API_GROUP_VERSION,
};
use crate::crd::Certificate;
use crate::errors::{Error, Result};
use crate::policy::IssuerSelection;

/// Controller owner reference pointing at `request`.
///
/// # Errors
///
/// Returns [`Error::MissingOwnerReference`] when the request has no name or uid.
pub fn owner_reference(request: &Certificate) -> Result<OwnerReference> {
    let reference = request
        .controller_owner_ref(&())
        .ok_or_else(|| Error::MissingOwnerReference(request.name_any()))?;
    Ok(OwnerReference {
        block_owner_deletion: Some(true),
        ..reference
    })
}

/// The controller owner reference recorded on `meta`, if any.
#[must_use]
pub fn controller_of(meta: &ObjectMeta) -> Option<&OwnerReference> {
    meta.owner_references
        .iter()
        .flatten()
        .find(|owner| owner.controller == Some(true))
}

/// Whether `obj` is controlled by exactly `request`.
#[must_use]
pub fn is_owned_by<K: Resource>(obj: &K, request: &Certificate) -> bool {
    match (controller_of(obj.meta()), owner_reference(request)) {
        (Some(current), Ok(expected)) => *current == expected,
        _ => false,
    }
}

/// Whether `obj` is controlled by some Skupper `Certificate`.
#[must_use]
pub fn is_owned_by_skupper<K: Resource>(obj: &K) -> bool {
    controller_of(obj.meta()).is_some_and(|owner| {
        owner.api_version == SKUPPER_API_GROUP_VERSION && owner.kind == KIND_SKUPPER_CERTIFICATE
    })
}

/// Name of the request controlling `obj`, falling back to the object's own name.
#[must_use]
pub fn owning_request_name<K: Resource>(obj: &K) -> String {
    controller_of(obj.meta())
        .map(|owner| owner.name.clone())
        .unwrap_or_else(|| obj.meta().name.clone().unwrap_or_default())
}

fn owned_meta(request: &Certificate, namespace: &str) -> Result<ObjectMeta> {
    Ok(ObjectMeta {
        name: Some(request.name_any()),
        namespace: Some(namespace.to_string()),
        owner_references: Some(vec![owner_reference(request)?]),
        ..Default::default()
    })
}

/// Shared, unowned, self-signed root issuer of `namespace`.
#[must_use]
pub fn new_root_issuer(namespace: &str) -> Issuer {
    Issuer {
        metadata: ObjectMeta {
            name: Some(DEFAULT_ROOT_ISSUER_NAME.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: IssuerSpec {
            self_signed: Some(SelfSignedIssuer {}),
            ca: None,
        },
    }
}

/// CA certificate for a signing request.
///
/// `issuer` is the policy selection; when empty the root issuer signs, and when no
/// root issuer is configured the namespace's own `skupper-issuer` does.
///
/// # Errors
///
/// Returns [`Error::MissingOwnerReference`] for a request without name or uid.
pub fn new_ca_certificate(
    request: &Certificate,
    namespace: &str,
    issuer: &IssuerSelection,
    root_issuer: &IssuerSelection,
) -> Result<CmCertificate> {
    let selection = if issuer.is_empty() { root_issuer } else { issuer };
    let name = if selection.is_empty() {
        DEFAULT_ROOT_ISSUER_NAME
    } else {
        selection.name.as_str()
    };
    Ok(CmCertificate {
        metadata: owned_meta(request, namespace)?,
        spec: certificate_spec(request, IssuerRef::new(name, selection.cluster_scoped), true),
        status: None,
    })
}

/// CA issuer backed by the secret of a signing request's CA certificate.
///
/// # Errors
///
/// Returns [`Error::MissingOwnerReference`] for a request without name or uid.
pub fn new_issuer(request: &Certificate, namespace: &str) -> Result<Issuer> {
    Ok(Issuer {
        metadata: owned_meta(request, namespace)?,
        spec: IssuerSpec {
            self_signed: None,
            ca: Some(CaIssuer {
                secret_name: request.name_any(),
            }),
        },
    })
}

/// Leaf certificate for a non-signing request.
///
/// Without a policy selection, the request's `ca` is taken as the issuer name.
///
/// # Errors
///
/// Returns [`Error::MissingOwnerReference`] for a request without name or uid.
pub fn new_certificate(
    request: &Certificate,
    namespace: &str,
    issuer: &IssuerSelection,
) -> Result<CmCertificate> {
    let issuer_ref = if issuer.is_empty() {
        IssuerRef::new(&request.spec.ca, false)
    } else {
        IssuerRef::new(&issuer.name, issuer.cluster_scoped)
    };
    Ok(CmCertificate {
        metadata: owned_meta(request, namespace)?,
        spec: certificate_spec(request, issuer_ref, false),
        status: None,
    })
}

fn certificate_spec(
    request: &Certificate,
    issuer_ref: IssuerRef,
    is_ca: bool,
) -> CmCertificateSpec {
    CmCertificateSpec {
        common_name: request.spec.subject.clone(),
        dns_names: request.spec.hosts.clone(),
        secret_name: request.name_any(),
        issuer_ref,
        duration: Some(DEFAULT_CERTIFICATE_DURATION.to_string()),
        is_ca,
    }
}

#[cfg(test)]
#[path = "resources_tests.rs"]
mod resources_tests;
