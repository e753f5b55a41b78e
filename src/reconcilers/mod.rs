// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation handlers for Skupper and cert-manager certificates.
//!
//! # Available Handlers
//!
//! - [`SkupperCertificateHandler`] - provisions root issuer, CA certificate, CA
//!   issuer or leaf certificate for each delegated Skupper `Certificate`
//! - [`CertManagerCertificateHandler`] - copies cert-manager readiness back onto the
//!   owning Skupper `Certificate`
//!
//! Both implement [`crate::handler::ResourceHandler`] and are driven by the
//! [`crate::processor::EventProcessor`].
//!
//! # Example
//!
//! ```rust,no_run
//! use skupper_cert_manager::client::KubeCertificateClient;
//! use skupper_cert_manager::policy::IssuerPolicy;
//! use skupper_cert_manager::reconcilers::SkupperCertificateHandler;
//! use std::sync::Arc;
//!
//! async fn build(client: kube::Client) -> SkupperCertificateHandler {
//!     SkupperCertificateHandler::new(
//!         Arc::new(KubeCertificateClient::new(client)),
//!         Arc::new(IssuerPolicy::default()),
//!     )
//! }
//! ```

pub mod cert_manager_certificate;
pub mod resources;
pub mod skupper_certificate;
pub mod status;

pub use cert_manager_certificate::CertManagerCertificateHandler;
pub use skupper_certificate::SkupperCertificateHandler;
