// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the Skupper cert-manager controller.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

use std::time::Duration;

// ============================================================================
// Skupper API Constants
// ============================================================================

/// API group of the Skupper CRDs
pub const SKUPPER_API_GROUP: &str = "skupper.io";

/// API version of the Skupper `Certificate` CRD
pub const SKUPPER_API_VERSION: &str = "v2alpha1";

/// Fully qualified API version (group/version) of the Skupper CRDs
pub const SKUPPER_API_GROUP_VERSION: &str = "skupper.io/v2alpha1";

/// Kind name for the Skupper `Certificate` resource
pub const KIND_SKUPPER_CERTIFICATE: &str = "Certificate";

/// Settings key a Skupper `Certificate` uses to name its delegate controller
pub const CONTROLLER_SETTINGS_KEY: &str = "certificate-controller";

/// Settings value selecting this controller as the delegate
pub const CONTROLLER_NAME: &str = "cert-manager";

// ============================================================================
// cert-manager API Constants
// ============================================================================

/// API group of the cert-manager CRDs
pub const CERT_MANAGER_API_GROUP: &str = "cert-manager.io";

/// Kind name for the namespaced cert-manager issuer
pub const KIND_ISSUER: &str = "Issuer";

/// Kind name for the cluster-scoped cert-manager issuer
pub const KIND_CLUSTER_ISSUER: &str = "ClusterIssuer";

/// Kind name for the cert-manager `Certificate` resource
pub const KIND_CERT_MANAGER_CERTIFICATE: &str = "Certificate";

/// Name of the self-signed root issuer provisioned per namespace
pub const DEFAULT_ROOT_ISSUER_NAME: &str = "skupper-issuer";

/// Requested lifetime of every certificate (5 years, Go duration syntax)
pub const DEFAULT_CERTIFICATE_DURATION: &str = "43800h0m0s";

// ============================================================================
// Issuer Policy Constants
// ============================================================================

/// Leading character marking an issuer name as a `ClusterIssuer`
pub const SCOPE_MARKER: char = '/';

// ============================================================================
// Event Processing Constants
// ============================================================================

/// Handler kind for Skupper certificate requests
pub const HANDLER_SKUPPER_CERTIFICATE: &str = "skupper.io/Certificate";

/// Handler kind for cert-manager certificates
pub const HANDLER_CERT_MANAGER_CERTIFICATE: &str = "cert-manager.io/Certificate";

/// Number of rate-limited requeues allowed after the first failed attempt
pub const MAX_REQUEUES: u32 = 5;

/// Interval at which every cached object is re-delivered to its handler
pub const RESYNC_PERIOD: Duration = Duration::from_secs(30);

/// Base delay of the per-item exponential backoff (5 milliseconds)
pub const ITEM_BACKOFF_BASE_DELAY: Duration = Duration::from_millis(5);

/// Ceiling of the per-item exponential backoff (1000 seconds)
pub const ITEM_BACKOFF_MAX_DELAY: Duration = Duration::from_secs(1000);

/// Sustained rate of the overall token bucket (events per second)
pub const BUCKET_RATE_PER_SEC: f64 = 10.0;

/// Burst size of the overall token bucket
pub const BUCKET_BURST: u32 = 100;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

/// Field manager used for status writes
pub const FIELD_MANAGER: &str = "skupper-cert-manager";

// ============================================================================
// Metrics Server Constants
// ============================================================================

/// Port for Prometheus metrics HTTP server
pub const METRICS_SERVER_PORT: u16 = 8080;

/// Path for Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Bind address for metrics HTTP server
pub const METRICS_SERVER_BIND_ADDRESS: &str = "0.0.0.0";
