// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! CRDs owned by [cert-manager](https://cert-manager.io/), see
//! [their API docs](https://cert-manager.io/docs/reference/api-docs/).
//!
//! Only the fields this controller reconciles are modelled. Equality of the typed
//! specs is therefore equality of everything the controller cares about; fields
//! defaulted or added by the cert-manager webhook never cause spurious updates.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constants::{CERT_MANAGER_API_GROUP, KIND_CLUSTER_ISSUER, KIND_ISSUER};
use crate::crd::Condition;

/// See <https://cert-manager.io/docs/reference/api-docs/#cert-manager.io/v1.Certificate>.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[kube(
    group = "cert-manager.io",
    version = "v1",
    kind = "Certificate",
    namespaced,
    status = "CertificateStatus",
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct CertificateSpec {
    #[serde(default)]
    pub common_name: String,
    #[serde(default)]
    pub dns_names: Vec<String>,
    pub secret_name: String,
    pub issuer_ref: IssuerRef,
    pub duration: Option<String>,
    #[serde(default, rename = "isCA")]
    pub is_ca: bool,
}

/// See <https://cert-manager.io/docs/reference/api-docs/#cert-manager.io/v1.CertificateStatus>.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificateStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// See <https://cert-manager.io/docs/reference/api-docs/#meta.cert-manager.io/v1.ObjectReference>.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssuerRef {
    pub name: String,
    pub kind: Option<String>,
    pub group: Option<String>,
}

impl IssuerRef {
    /// Reference a namespaced `Issuer` or a `ClusterIssuer` by name.
    #[must_use]
    pub fn new(name: &str, cluster_scoped: bool) -> Self {
        let kind = if cluster_scoped {
            KIND_CLUSTER_ISSUER
        } else {
            KIND_ISSUER
        };
        Self {
            name: name.to_string(),
            kind: Some(kind.to_string()),
            group: Some(CERT_MANAGER_API_GROUP.to_string()),
        }
    }

    /// Whether the reference points at a `ClusterIssuer`.
    #[must_use]
    pub fn is_cluster_scoped(&self) -> bool {
        self.kind.as_deref() == Some(KIND_CLUSTER_ISSUER)
    }
}

/// See <https://cert-manager.io/docs/reference/api-docs/#cert-manager.io/v1.Issuer>.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(
    group = "cert-manager.io",
    version = "v1",
    kind = "Issuer",
    namespaced,
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct IssuerSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_signed: Option<SelfSignedIssuer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca: Option<CaIssuer>,
}

/// See <https://cert-manager.io/docs/reference/api-docs/#cert-manager.io/v1.SelfSignedIssuer>.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
pub struct SelfSignedIssuer {}

/// See <https://cert-manager.io/docs/reference/api-docs/#cert-manager.io/v1.CAIssuer>.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaIssuer {
    pub secret_name: String,
}
