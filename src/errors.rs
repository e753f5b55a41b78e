// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the Skupper cert-manager controller.
//!
//! Handlers return [`Error`]; the event processor counts a failed attempt, logs it
//! and re-queues the event with rate-limited backoff. [`Error::is_transient`] only
//! feeds metrics and log levels, it never changes the retry decision.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while reconciling certificates or loading configuration.
#[derive(Error, Debug)]
pub enum Error {
    /// Kubernetes API call failed
    ///
    /// Covers network errors, conflicts, permission errors and validation failures
    /// reported by the API server.
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    /// A namespaced object arrived without a namespace
    #[error("{kind} '{name}' has no namespace")]
    MissingNamespace {
        /// Kind of the offending object
        kind: &'static str,
        /// Name of the offending object
        name: String,
    },

    /// An object arrived without a name
    #[error("{kind} has no name")]
    MissingName {
        /// Kind of the offending object
        kind: &'static str,
    },

    /// A Skupper `Certificate` could not be turned into an owner reference
    #[error("Cannot build owner reference for certificate '{0}'")]
    MissingOwnerReference(String),

    /// The issuer policy file could not be read
    #[error("Failed to read issuer policy {path}: {source}")]
    PolicyIo {
        /// Path of the policy file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The issuer policy file is not valid YAML for the policy schema
    #[error("Failed to parse issuer policy {path}: {source}")]
    PolicyYaml {
        /// Path of the policy file
        path: PathBuf,
        /// Underlying YAML error
        #[source]
        source: serde_yaml::Error,
    },
}

impl Error {
    /// Returns true if a later attempt may succeed without any change to the
    /// cluster state or the configuration.
    ///
    /// Rate limiting (429), server errors (5xx), conflicts (409) and transport
    /// failures are transient. Everything else is a permanent error.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Kube(kube::Error::Api(api_err)) => {
                api_err.code == 409 || api_err.code == 429 || (500..600).contains(&api_err.code)
            }
            Self::Kube(kube::Error::Service(_)) => true,
            Self::Kube(_)
            | Self::MissingNamespace { .. }
            | Self::MissingName { .. }
            | Self::MissingOwnerReference(_)
            | Self::PolicyIo { .. }
            | Self::PolicyYaml { .. } => false,
        }
    }

    /// Short label used for the `error_type` metric dimension.
    #[must_use]
    pub fn metric_label(&self) -> &'static str {
        match self {
            Self::Kube(_) => "kube",
            Self::MissingNamespace { .. } | Self::MissingName { .. } => "invalid_object",
            Self::MissingOwnerReference(_) => "owner_reference",
            Self::PolicyIo { .. } | Self::PolicyYaml { .. } => "policy",
        }
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
