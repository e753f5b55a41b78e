// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Issuer resolution policy.
//!
//! The policy decides which cert-manager issuer signs the certificate provisioned for
//! a Skupper `Certificate`, and whether a namespace already has a root issuer or needs
//! the controller's own self-signed one.
//!
//! # Precedence
//!
//! 1. namespace `issuerMap[request.ca]`
//! 2. namespace `issuer`
//! 3. global `issuerMap[request.ca]`
//! 4. global `issuer`
//! 5. nothing (the caller falls back to the root issuer or `request.ca`)
//!
//! A resolved name starting with `/` refers to a `ClusterIssuer`; the marker is
//! stripped. A lone `/` is taken literally as a namespaced issuer name.
//!
//! # File Format
//!
//! ```yaml
//! global:
//!   rootIssuer: /corp-root
//!   issuer: default-issuer
//! namespaces:
//!   sk1:
//!     issuerMap:
//!       skupper-site-ca: /site-issuer
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::SCOPE_MARKER;
use crate::errors::{Error, Result};

/// Issuer settings for one scope (global or a single namespace).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IssuerConfig {
    /// Issuer that signs CA certificates when no other issuer applies.
    pub root_issuer: Option<String>,

    /// Issuer used when `issuer_map` has no entry for the request's `ca`.
    pub issuer: Option<String>,

    /// Maps a request's `ca` to the issuer that should sign it.
    pub issuer_map: BTreeMap<String, String>,
}

impl IssuerConfig {
    /// The `issuer_map` entry for `ca` when there is one, even if empty, else the
    /// scope's default issuer.
    fn issuer_for(&self, ca: &str) -> &str {
        match self.issuer_map.get(ca) {
            Some(name) => name,
            None => self.issuer.as_deref().unwrap_or_default(),
        }
    }

    fn root_issuer(&self) -> Option<&str> {
        self.root_issuer.as_deref().filter(|name| !name.is_empty())
    }
}

/// Immutable issuer policy loaded once at startup.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IssuerPolicy {
    pub global: IssuerConfig,
    pub namespaces: BTreeMap<String, IssuerConfig>,
}

/// An issuer name together with its scope.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IssuerSelection {
    pub name: String,
    pub cluster_scoped: bool,
}

impl IssuerSelection {
    /// Parse a configured issuer name, honouring the leading scope marker.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix(SCOPE_MARKER) {
            Some(stripped) if raw.len() > 1 => Self {
                name: stripped.to_string(),
                cluster_scoped: true,
            },
            _ => Self {
                name: raw.to_string(),
                cluster_scoped: false,
            },
        }
    }

    /// No issuer was configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

impl IssuerPolicy {
    /// Load a policy from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PolicyIo`] if the file cannot be read and
    /// [`Error::PolicyYaml`] if it does not match the policy schema.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| Error::PolicyIo {
            path: path.to_path_buf(),
            source,
        })?;
        let policy = Self::from_yaml(&raw).map_err(|source| Error::PolicyYaml {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            path = %path.display(),
            namespaces = policy.namespaces.len(),
            "Loaded issuer policy"
        );
        Ok(policy)
    }

    /// Parse a policy from YAML text. An empty document yields the empty policy.
    ///
    /// # Errors
    ///
    /// Returns the YAML error if the document does not match the policy schema.
    pub fn from_yaml(raw: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    /// Resolve the issuer that should sign a certificate for `ca` in `namespace`.
    ///
    /// An empty result from the namespace scope falls back to the global scope.
    /// Returns an empty selection when nothing is configured.
    #[must_use]
    pub fn resolve_issuer(&self, namespace: &str, ca: &str) -> IssuerSelection {
        let name = self
            .namespaces
            .get(namespace)
            .map(|config| config.issuer_for(ca))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.global.issuer_for(ca));
        if name.is_empty() {
            return IssuerSelection::default();
        }
        IssuerSelection::parse(name)
    }

    /// Resolve the root issuer configured for `namespace`.
    ///
    /// An empty selection means the controller provisions its own self-signed root
    /// issuer in that namespace.
    #[must_use]
    pub fn resolve_root_issuer(&self, namespace: &str) -> IssuerSelection {
        self.namespaces
            .get(namespace)
            .and_then(IssuerConfig::root_issuer)
            .or_else(|| self.global.root_issuer())
            .map(IssuerSelection::parse)
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod policy_tests;
