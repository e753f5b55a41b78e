// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Status condition helpers for Skupper certificate requests.
//!
//! A request carries a single `Ready` condition. It is `True` once cert-manager
//! reports the provisioned certificate ready, and `False` with reason `Pending`
//! otherwise; the condition message carries cert-manager's reason.
//!
//! # Example
//!
//! ```rust,no_run
//! use skupper_cert_manager::reconcilers::status::{pending_condition, set_condition};
//!
//! let mut conditions = Vec::new();
//! let changed = set_condition(&mut conditions, pending_condition("IssuerNotReady", Some(2)));
//! assert!(changed);
//! ```

use chrono::Utc;
use kube::ResourceExt;
use tracing::debug;

use crate::cert_manager::Certificate as CmCertificate;
use crate::client::CertificateClient;
use crate::constants::KIND_SKUPPER_CERTIFICATE;
use crate::crd::{Certificate, Condition};
use crate::errors::{Error, Result};
use crate::status_reasons::{
    CONDITION_STATUS_FALSE, CONDITION_STATUS_TRUE, CONDITION_TYPE_READY, MESSAGE_OK,
    REASON_PENDING, REASON_READY, REASON_UNKNOWN,
};

/// Create a new condition stamped with the current time.
#[must_use]
pub fn create_condition(
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
    observed_generation: Option<i64>,
) -> Condition {
    Condition {
        r#type: condition_type.to_string(),
        status: status.to_string(),
        reason: Some(reason.to_string()),
        message: Some(message.to_string()),
        last_transition_time: Some(Utc::now().to_rfc3339()),
        observed_generation,
    }
}

/// `Ready=True`, reason `Ready`, message `OK`.
#[must_use]
pub fn ready_condition(observed_generation: Option<i64>) -> Condition {
    create_condition(
        CONDITION_TYPE_READY,
        CONDITION_STATUS_TRUE,
        REASON_READY,
        MESSAGE_OK,
        observed_generation,
    )
}

/// `Ready=False`, reason `Pending`, message `message`.
#[must_use]
pub fn pending_condition(message: &str, observed_generation: Option<i64>) -> Condition {
    create_condition(
        CONDITION_TYPE_READY,
        CONDITION_STATUS_FALSE,
        REASON_PENDING,
        message,
        observed_generation,
    )
}

/// Find a condition by type.
#[must_use]
pub fn find_condition<'a>(
    conditions: &'a [Condition],
    condition_type: &str,
) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.r#type == condition_type)
}

/// Insert or replace the condition of the same type.
///
/// `lastTransitionTime` is kept when the status value does not change. Returns
/// whether anything other than the timestamp changed.
pub fn set_condition(conditions: &mut Vec<Condition>, mut condition: Condition) -> bool {
    let Some(existing) = conditions
        .iter_mut()
        .find(|c| c.r#type == condition.r#type)
    else {
        conditions.push(condition);
        return true;
    };

    if existing.status == condition.status {
        condition
            .last_transition_time
            .clone_from(&existing.last_transition_time);
    }
    if *existing == condition {
        return false;
    }
    *existing = condition;
    true
}

/// Readiness of a cert-manager certificate: whether its `Ready` condition is
/// `True`, and that condition's reason (`Unknown` when it has none yet).
#[must_use]
pub fn certificate_ready_reason(certificate: &CmCertificate) -> (bool, String) {
    certificate
        .status
        .as_ref()
        .and_then(|status| find_condition(&status.conditions, CONDITION_TYPE_READY))
        .map_or_else(
            || (false, REASON_UNKNOWN.to_string()),
            |condition| {
                (
                    condition.status == CONDITION_STATUS_TRUE,
                    condition.reason.clone().unwrap_or_default(),
                )
            },
        )
}

/// Write `Ready` or `Pending(reason)` onto `request`, versioned by its generation.
///
/// Returns `false` without calling the API when the status would not change.
///
/// # Errors
///
/// Returns an error if the request has no namespace or the status patch fails.
pub async fn set_request_ready_or_pending(
    client: &dyn CertificateClient,
    request: &Certificate,
    ready: bool,
    reason: &str,
) -> Result<bool> {
    let name = request.name_any();
    let namespace = request.namespace().ok_or_else(|| Error::MissingNamespace {
        kind: KIND_SKUPPER_CERTIFICATE,
        name: name.clone(),
    })?;
    let generation = request.metadata.generation;
    let condition = if ready {
        ready_condition(generation)
    } else {
        pending_condition(reason, generation)
    };

    let mut status = request.status.clone().unwrap_or_default();
    let summary = if ready { REASON_READY } else { REASON_PENDING };
    let message = condition.message.clone();
    let mut changed = set_condition(&mut status.conditions, condition);
    if status.status.as_deref() != Some(summary) || status.message != message {
        status.status = Some(summary.to_string());
        status.message = message;
        changed = true;
    }

    if !changed {
        debug!(namespace = %namespace, name = %name, ready, "Certificate request status unchanged");
        return Ok(false);
    }

    client
        .update_request_status(&namespace, &name, &status)
        .await?;
    debug!(
        namespace = %namespace,
        name = %name,
        ready,
        reason,
        "Updated certificate request status"
    );
    Ok(true)
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod status_tests;
