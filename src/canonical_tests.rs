// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `canonical.rs`

#[cfg(test)]
mod tests {
    use crate::canonical::{
        hostname_variants, is_uuid, machine_name_candidates, normalize_hostname, normalize_id,
        normalize_ip, normalize_machine_name, normalized_ids, normalized_ips,
        select_machine_name, trim_hex_suffix,
    };
    use std::collections::BTreeMap;

    fn map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_normalize_id() {
        assert_eq!(normalize_id("  MID-1 "), Some("mid-1".to_string()));
        assert_eq!(normalize_id("   "), None);
        assert_eq!(normalize_id(""), None);
    }

    #[test]
    fn test_normalized_ids_sorted_unique() {
        assert_eq!(
            normalized_ids(["B", "a", "b", ""]),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_normalize_hostname_strips_single_trailing_dot() {
        assert_eq!(
            normalize_hostname(" Node-1.Example.COM. "),
            Some("node-1.example.com".to_string())
        );
        assert_eq!(normalize_hostname("node.."), Some("node.".to_string()));
        assert_eq!(normalize_hostname(""), None);
    }

    #[test]
    fn test_hostname_variants_plain() {
        assert_eq!(hostname_variants("node-1"), vec!["node-1".to_string()]);
        assert!(hostname_variants("  ").is_empty());
    }

    #[test]
    fn test_hostname_variants_fqdn() {
        assert_eq!(
            hostname_variants("node-1.example.com"),
            vec!["node-1".to_string(), "node-1.example.com".to_string()]
        );
    }

    #[test]
    fn test_hostname_variants_leading_dot_keeps_full() {
        assert_eq!(hostname_variants(".hidden"), vec![".hidden".to_string()]);
    }

    #[test]
    fn test_hostname_variants_hex_suffix() {
        let variants = hostname_variants("smtl001-w-asus-1c32d8c7-cd47-2da5-19b7-bcfce773e4da-62c86a9b");
        assert_eq!(
            variants,
            vec![
                "smtl001-w-asus-1c32d8c7-cd47-2da5-19b7-bcfce773e4da".to_string(),
                "smtl001-w-asus-1c32d8c7-cd47-2da5-19b7-bcfce773e4da-62c86a9b".to_string(),
            ]
        );
    }

    #[test]
    fn test_trim_hex_suffix() {
        assert_eq!(trim_hex_suffix("worker-0a1b2c3d"), "worker");
        assert_eq!(trim_hex_suffix("worker-0A1B2C3D"), "worker-0A1B2C3D");
        assert_eq!(trim_hex_suffix("worker-0a1b2c3"), "worker-0a1b2c3");
        assert_eq!(trim_hex_suffix("worker-0a1b2c3g"), "worker-0a1b2c3g");
        assert_eq!(trim_hex_suffix("-0a1b2c3d"), "-0a1b2c3d");
        assert_eq!(trim_hex_suffix("worker"), "worker");
    }

    #[test]
    fn test_normalize_ip() {
        assert_eq!(normalize_ip(" 10.0.0.1 "), Some("10.0.0.1".to_string()));
        assert_eq!(normalize_ip("::ffff:10.0.0.1"), Some("10.0.0.1".to_string()));
        assert_eq!(
            normalize_ip("2001:0db8:0000:0000:0000:0000:0000:0001"),
            Some("2001:db8::1".to_string())
        );
        assert_eq!(normalize_ip("not-an-ip"), None);
        assert_eq!(normalize_ip(""), None);
    }

    #[test]
    fn test_normalized_ips_discards_garbage() {
        assert_eq!(
            normalized_ips(&["10.0.0.2", "bogus", "10.0.0.1", "::ffff:10.0.0.2"]),
            vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()]
        );
    }

    #[test]
    fn test_normalize_machine_name() {
        assert_eq!(normalize_machine_name(" fleet-default/m-abc "), "m-abc");
        assert_eq!(normalize_machine_name("machine:m-abc"), "m-abc");
        assert_eq!(normalize_machine_name("a/b:c"), "b:c", "slash wins over colon");
        assert_eq!(normalize_machine_name("trailing/"), "trailing/");
        assert_eq!(normalize_machine_name("plain"), "plain");
    }

    #[test]
    fn test_is_uuid() {
        assert!(is_uuid("1c32d8c7-cd47-2da5-19b7-bcfce773e4da"));
        assert!(is_uuid("1C32D8C7-CD47-2DA5-19B7-BCFCE773E4DA"));
        assert!(!is_uuid("1c32d8c7cd472da519b7bcfce773e4da"));
        assert!(!is_uuid("1c32d8c7-cd47-2da5-19b7-bcfce773e4dz"));
        assert!(!is_uuid("worker-1"));
    }

    #[test]
    fn test_machine_name_candidates_labels_before_annotations() {
        let labels = map(&[("elemental.cattle.io/machine", "fleet-default/m-label")]);
        let annotations = map(&[
            ("cluster.x-k8s.io/machine", "m-annotation"),
            ("machine.cattle.io/name", "m-label"),
        ]);
        assert_eq!(
            machine_name_candidates(&labels, &annotations),
            vec!["m-label".to_string(), "m-annotation".to_string()]
        );
    }

    #[test]
    fn test_machine_name_candidates_ignores_unknown_and_blank() {
        let labels = map(&[("kubernetes.io/hostname", "node-1"), ("cattle.io/machine", "  ")]);
        assert!(machine_name_candidates(&labels, &BTreeMap::new()).is_empty());
    }

    #[test]
    fn test_select_machine_name_prefers_non_uuid() {
        let candidates = vec![
            "1c32d8c7-cd47-2da5-19b7-bcfce773e4da".to_string(),
            "pool-a-worker-x7k2p".to_string(),
        ];
        assert_eq!(
            select_machine_name(&candidates),
            Some("pool-a-worker-x7k2p".to_string())
        );
    }

    #[test]
    fn test_select_machine_name_uuid_fallback() {
        let candidates = vec![
            "1c32d8c7-cd47-2da5-19b7-bcfce773e4da".to_string(),
            "2c32d8c7-cd47-2da5-19b7-bcfce773e4da".to_string(),
        ];
        assert_eq!(
            select_machine_name(&candidates),
            Some("1c32d8c7-cd47-2da5-19b7-bcfce773e4da".to_string())
        );
        assert_eq!(select_machine_name(&[]), None);
    }
}
