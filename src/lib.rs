// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # skupper-cert-manager - cert-manager delegate for Skupper certificates
//!
//! A Kubernetes controller that provisions cert-manager issuers and certificates for
//! Skupper `Certificate` requests delegated to it, and reports cert-manager's
//! readiness back onto those requests.
//!
//! ## Overview
//!
//! Informers for both resource families feed one rate-limited work queue. A single
//! consumer dispatches each queued key to the handler of its kind:
//!
//! - the request side keeps a root issuer per namespace, a CA certificate and CA
//!   issuer per signing request, and a leaf certificate per other request
//! - the authority side copies cert-manager's `Ready` condition onto the owning
//!   request
//!
//! ## Modules
//!
//! - [`crd`] - Skupper `Certificate` custom resource
//! - [`cert_manager`] - the subset of cert-manager resources the controller manages
//! - [`queue`] - deduplicating, rate-limited work queue
//! - [`informer`] - watch adaptor feeding the queue and the live cache
//! - [`handler`] - per-kind handler contract and generic dispatch
//! - [`processor`] - wires informers, queue and handlers together
//! - [`policy`] - issuer selection policy
//! - [`reconcilers`] - the request-side and authority-side handlers
//! - [`client`] - cluster API seam used by the handlers
//! - [`metrics`] / [`server`] - Prometheus metrics and probe endpoints
//!
//! ## Example
//!
//! ```rust,no_run
//! use skupper_cert_manager::policy::IssuerPolicy;
//!
//! let policy = IssuerPolicy::from_yaml(
//!     "{global: {issuer: /letsencrypt}, \
//!       namespaces: {west: {issuerMap: {skupper-site-ca: west-ca}}}}",
//! )
//! .unwrap();
//!
//! let selected = policy.resolve_issuer("west", "skupper-site-ca");
//! assert_eq!(selected.name, "west-ca");
//! assert!(!selected.cluster_scoped);
//! ```

pub mod cert_manager;
pub mod client;
pub mod constants;
pub mod crd;
pub mod errors;
pub mod handler;
pub mod informer;
pub mod metrics;
pub mod policy;
pub mod processor;
pub mod queue;
pub mod reconcilers;
pub mod server;
pub mod status_reasons;

#[cfg(test)]
pub mod testing;
