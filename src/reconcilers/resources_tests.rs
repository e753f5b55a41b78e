// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `resources.rs`

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::policy::IssuerSelection;
    use crate::testing::{leaf_request, signing_request};

    fn selection(name: &str, cluster_scoped: bool) -> IssuerSelection {
        IssuerSelection {
            name: name.to_string(),
            cluster_scoped,
        }
    }

    #[test]
    fn test_root_issuer_is_self_signed_and_unowned() {
        let issuer = new_root_issuer("sk1");

        assert_eq!(issuer.metadata.name.as_deref(), Some("skupper-issuer"));
        assert_eq!(issuer.metadata.namespace.as_deref(), Some("sk1"));
        assert!(issuer.metadata.owner_references.is_none());
        assert!(issuer.spec.self_signed.is_some());
        assert!(issuer.spec.ca.is_none());
    }

    #[test]
    fn test_ca_certificate_defaults_to_skupper_issuer() {
        let request = signing_request("ns1", "ca1");
        let cert = new_ca_certificate(
            &request,
            "ns1",
            &IssuerSelection::default(),
            &IssuerSelection::default(),
        )
        .unwrap();

        assert!(cert.spec.is_ca);
        assert_eq!(cert.spec.common_name, "ca1");
        assert_eq!(cert.spec.secret_name, "ca1");
        assert_eq!(cert.spec.issuer_ref.name, "skupper-issuer");
        assert_eq!(cert.spec.issuer_ref.kind.as_deref(), Some("Issuer"));
        assert_eq!(cert.spec.issuer_ref.group.as_deref(), Some("cert-manager.io"));
        assert_eq!(cert.spec.duration.as_deref(), Some("43800h0m0s"));
        assert!(is_owned_by(&cert, &request));
    }

    #[test]
    fn test_ca_certificate_prefers_policy_then_root() {
        let request = signing_request("ns1", "ca1");

        let cert = new_ca_certificate(
            &request,
            "ns1",
            &selection("mapped", false),
            &selection("corp-root", true),
        )
        .unwrap();
        assert_eq!(cert.spec.issuer_ref, crate::cert_manager::IssuerRef::new("mapped", false));

        let cert = new_ca_certificate(
            &request,
            "ns1",
            &IssuerSelection::default(),
            &selection("corp-root", true),
        )
        .unwrap();
        assert_eq!(cert.spec.issuer_ref.name, "corp-root");
        assert!(cert.spec.issuer_ref.is_cluster_scoped());
    }

    #[test]
    fn test_leaf_certificate_falls_back_to_request_ca() {
        let request = leaf_request("ns1", "server1", "ca1", &["s1.example"]);
        let cert = new_certificate(&request, "ns1", &IssuerSelection::default()).unwrap();

        assert!(!cert.spec.is_ca);
        assert_eq!(cert.spec.issuer_ref.name, "ca1");
        assert!(!cert.spec.issuer_ref.is_cluster_scoped());
        assert_eq!(cert.spec.dns_names, ["s1.example"]);
    }

    #[test]
    fn test_leaf_certificate_uses_cluster_issuer() {
        let request = leaf_request("ns1", "server1", "ca1", &[]);
        let cert = new_certificate(&request, "ns1", &selection("corp", true)).unwrap();

        assert_eq!(cert.spec.issuer_ref.name, "corp");
        assert_eq!(cert.spec.issuer_ref.kind.as_deref(), Some("ClusterIssuer"));
    }

    #[test]
    fn test_issuer_references_ca_secret() {
        let request = signing_request("ns1", "ca1");
        let issuer = new_issuer(&request, "ns1").unwrap();

        assert_eq!(issuer.spec.ca.as_ref().unwrap().secret_name, "ca1");
        assert!(issuer.spec.self_signed.is_none());
        assert!(is_owned_by(&issuer, &request));
    }

    #[test]
    fn test_owner_reference_requires_uid() {
        let mut request = signing_request("ns1", "ca1");
        request.metadata.uid = None;
        assert!(owner_reference(&request).is_err());
        assert!(new_issuer(&request, "ns1").is_err());
    }

    #[test]
    fn test_owner_reference_fields() {
        let reference = owner_reference(&signing_request("ns1", "ca1")).unwrap();

        assert_eq!(reference.api_version, "skupper.io/v2alpha1");
        assert_eq!(reference.kind, "Certificate");
        assert_eq!(reference.name, "ca1");
        assert_eq!(reference.uid, "uid-ns1-ca1");
        assert_eq!(reference.controller, Some(true));
        assert_eq!(reference.block_owner_deletion, Some(true));
    }

    #[test]
    fn test_is_owned_by_requires_exact_match() {
        let request = signing_request("ns1", "ca1");
        let issuer = new_issuer(&request, "ns1").unwrap();

        // Same name, different uid: a recreated request does not own the old issuer
        let mut recreated = request.clone();
        recreated.metadata.uid = Some("other-uid".to_string());
        assert!(!is_owned_by(&issuer, &recreated));

        assert!(!is_owned_by(&new_root_issuer("ns1"), &request));
    }

    #[test]
    fn test_is_owned_by_skupper() {
        let request = leaf_request("ns1", "server1", "ca1", &[]);
        let cert = new_certificate(&request, "ns1", &IssuerSelection::default()).unwrap();
        assert!(is_owned_by_skupper(&cert));
        assert_eq!(owning_request_name(&cert), "server1");

        let mut foreign = cert.clone();
        foreign.metadata.owner_references = None;
        assert!(!is_owned_by_skupper(&foreign));
        assert_eq!(owning_request_name(&foreign), "server1");
    }
}
