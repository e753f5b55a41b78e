// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definitions consumed from Skupper.
//!
//! The controller does not own these CRDs; Skupper installs them. They are declared
//! here with only the fields the controller reads or writes.
//!
//! # Resource Types
//!
//! - [`Certificate`] - a request for identity material (subject, hosts, signing role)
//!   that Skupper delegates to a certificate controller through its `settings` map
//!
//! # Example
//!
//! ```rust,no_run
//! use skupper_cert_manager::crd::CertificateSpec;
//! use std::collections::BTreeMap;
//!
//! let spec = CertificateSpec {
//!     ca: "skupper-site-ca".to_string(),
//!     subject: "skupper-router".to_string(),
//!     hosts: vec!["skupper-router.sk1.svc".to_string()],
//!     server: true,
//!     settings: BTreeMap::from([(
//!         "certificate-controller".to_string(),
//!         "cert-manager".to_string(),
//!     )]),
//!     ..Default::default()
//! };
//! ```

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::{CONTROLLER_NAME, CONTROLLER_SETTINGS_KEY};

/// Condition represents an observation of a resource's current state.
///
/// The same shape is used by Skupper and cert-manager status subresources, so it
/// is shared by both resource families.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition, e.g. `Ready`.
    pub r#type: String,

    /// Status of the condition: True, False, or Unknown.
    pub status: String,

    /// Brief CamelCase reason for the condition's last transition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message indicating details about the transition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Last time the condition transitioned from one status to another (RFC3339 format).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,

    /// The `metadata.generation` the condition was computed for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

/// Skupper `Certificate` defines the identity material a site needs.
///
/// When `settings["certificate-controller"]` is `cert-manager`, Skupper leaves the
/// request to this controller, which provisions cert-manager resources for it.
///
/// # Example
///
/// ```yaml
/// apiVersion: skupper.io/v2alpha1
/// kind: Certificate
/// metadata:
///   name: skupper-site-server
///   namespace: sk1
/// spec:
///   ca: skupper-site-ca
///   subject: skupper-router
///   hosts:
///     - skupper-router.sk1.svc
///   server: true
///   settings:
///     certificate-controller: cert-manager
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[kube(
    group = "skupper.io",
    version = "v2alpha1",
    kind = "Certificate",
    namespaced,
    status = "CertificateStatus",
    derive = "PartialEq",
    printcolumn = r#"{"name":"Status","type":"string","jsonPath":".status.status"}"#,
    printcolumn = r#"{"name":"Message","type":"string","jsonPath":".status.message"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct CertificateSpec {
    /// Name of the signing authority. For leaf certificates this doubles as the
    /// issuer name when no policy mapping applies.
    #[serde(default)]
    pub ca: String,

    /// Common name of the certificate subject.
    #[serde(default)]
    pub subject: String,

    /// DNS names the certificate is valid for.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,

    /// Certificate is used for client authentication.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub client: bool,

    /// Certificate is used for server authentication.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub server: bool,

    /// Certificate is itself a signing authority.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub signing: bool,

    /// Free-form settings; selects the delegate certificate controller.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: BTreeMap<String, String>,
}

impl CertificateSpec {
    /// Whether the request names this controller as its delegate.
    #[must_use]
    pub fn is_delegated(&self) -> bool {
        self.settings
            .get(CONTROLLER_SETTINGS_KEY)
            .is_some_and(|name| name == CONTROLLER_NAME)
    }
}

/// Skupper `Certificate` status
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificateStatus {
    /// Summary of the `Ready` condition (`Ready` or `Pending`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Message of the `Ready` condition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default)]
    pub conditions: Vec<Condition>,
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;
