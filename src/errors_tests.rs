// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod tests {
    use crate::errors::Error;
    use std::path::PathBuf;

    #[test]
    fn test_missing_namespace_display() {
        let err = Error::MissingNamespace {
            kind: "Certificate",
            name: "skupper-site-ca".into(),
        };
        assert_eq!(err.to_string(), "Certificate 'skupper-site-ca' has no namespace");
        assert!(!err.is_transient());
        assert_eq!(err.metric_label(), "invalid_object");
    }

    #[test]
    fn test_missing_name_is_permanent() {
        let err = Error::MissingName { kind: "Certificate" };
        assert!(!err.is_transient());
        assert_eq!(err.to_string(), "Certificate has no name");
        assert_eq!(err.metric_label(), "invalid_object");
    }

    #[test]
    fn test_policy_errors_carry_path() {
        let source = serde_yaml::from_str::<u32>("not-a-number").unwrap_err();
        let err = Error::PolicyYaml {
            path: PathBuf::from("/etc/skupper/policy.yaml"),
            source,
        };
        assert!(err.to_string().contains("/etc/skupper/policy.yaml"));
        assert_eq!(err.metric_label(), "policy");
        assert!(!err.is_transient());
    }

    #[test]
    fn test_io_error_has_source() {
        let err = Error::PolicyIo {
            path: PathBuf::from("missing.yaml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(std::error::Error::source(&err).is_some());
    }
}
