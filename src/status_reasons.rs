// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Standard Kubernetes status condition values for Skupper certificate requests.
//!
//! Reasons are programmatic identifiers in CamelCase that explain why a condition has
//! a particular status.
//!
//! # Condition Types
//!
//! A Skupper `Certificate` handled by this controller carries a single `type: Ready`
//! condition. It mirrors the readiness of the cert-manager `Certificate` provisioned
//! for the request.
//!
//! # Example Status
//!
//! ```yaml
//! status:
//!   status: Pending
//!   message: IssuerNotReady
//!   conditions:
//!     - type: Ready
//!       status: "False"
//!       reason: Pending
//!       message: IssuerNotReady
//!       observedGeneration: 1
//! ```

// ============================================================================
// Condition Types
// ============================================================================

/// The single encompassing readiness condition.
pub const CONDITION_TYPE_READY: &str = "Ready";

// ============================================================================
// Condition Status Values
// ============================================================================

pub const CONDITION_STATUS_TRUE: &str = "True";

pub const CONDITION_STATUS_FALSE: &str = "False";

pub const CONDITION_STATUS_UNKNOWN: &str = "Unknown";

// ============================================================================
// Reasons
// ============================================================================

/// The provisioned certificate is issued and valid.
pub const REASON_READY: &str = "Ready";

/// The provisioned certificate is not (yet) ready.
///
/// Also used as the message when the provisioned certificate has been deleted or
/// was just created.
pub const REASON_PENDING: &str = "Pending";

/// cert-manager has not reported a `Ready` condition yet.
pub const REASON_UNKNOWN: &str = "Unknown";

// ============================================================================
// Messages
// ============================================================================

/// Message written alongside a `Ready=True` condition.
pub const MESSAGE_OK: &str = "OK";
