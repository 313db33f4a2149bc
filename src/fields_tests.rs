// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `fields.rs`

#[cfg(test)]
mod tests {
    use crate::fields::*;
    use std::collections::HashSet;

    const ALL_TABLES: &[(&str, &[&str])] = &[
        ("HOST_ID", HOST_ID),
        ("HOST_UID", HOST_UID),
        ("HOST_NAMESPACE", HOST_NAMESPACE),
        ("HOST_LABEL_MAPS", HOST_LABEL_MAPS),
        ("HOST_ANNOTATIONS", HOST_ANNOTATIONS),
        ("HOST_MACHINE_NAME", HOST_MACHINE_NAME),
        ("HOST_HOSTNAME", HOST_HOSTNAME),
        ("HOST_MACHINE_ID", HOST_MACHINE_ID),
        ("HOST_SYSTEM_UUID", HOST_SYSTEM_UUID),
        ("HOST_PROVIDER_ID", HOST_PROVIDER_ID),
        ("HOST_IPS", HOST_IPS),
        ("HOST_SELF_LINKS", HOST_SELF_LINKS),
        ("MACHINE_ID", MACHINE_ID),
        ("MACHINE_NAME", MACHINE_NAME),
        ("MACHINE_CLUSTER_NAME", MACHINE_CLUSTER_NAME),
        ("MACHINE_NODE_NAME", MACHINE_NODE_NAME),
        ("MACHINE_PROVIDER_ID", MACHINE_PROVIDER_ID),
        ("MACHINE_LABELS", MACHINE_LABELS),
        ("MACHINE_ANNOTATIONS", MACHINE_ANNOTATIONS),
        ("CLUSTER_ID", CLUSTER_ID),
        ("CLUSTER_NAME", CLUSTER_NAME),
        ("GENERATED_KUBECONFIG", GENERATED_KUBECONFIG),
        ("ADDRESS_OBJECT_KEYS", ADDRESS_OBJECT_KEYS),
    ];

    #[test]
    fn test_tables_are_non_empty() {
        for (name, table) in ALL_TABLES {
            assert!(!table.is_empty(), "{name} must list at least one path");
        }
    }

    #[test]
    fn test_tables_have_no_duplicates() {
        for (name, table) in ALL_TABLES {
            let unique: HashSet<_> = table.iter().collect();
            assert_eq!(unique.len(), table.len(), "{name} contains a duplicate path");
        }
    }

    #[test]
    fn test_paths_are_well_formed() {
        for (name, table) in ALL_TABLES {
            for path in *table {
                assert!(!path.is_empty(), "{name} has an empty path");
                assert!(
                    !path.starts_with('.') && !path.ends_with('.'),
                    "{name} path {path:?} has a stray dot"
                );
            }
        }
    }

    #[test]
    fn test_spec_fields_take_precedence_over_status() {
        for table in [HOST_MACHINE_ID, HOST_SYSTEM_UUID, HOST_PROVIDER_ID, HOST_IPS] {
            let spec = table.iter().position(|p| p.starts_with("spec."));
            let status = table.iter().position(|p| p.starts_with("status."));
            assert!(spec < status);
        }
    }

    #[test]
    fn test_hostname_prefers_node_name() {
        assert_eq!(HOST_HOSTNAME.first(), Some(&"spec.nodeName"));
        assert_eq!(HOST_HOSTNAME.last(), Some(&"metadata.name"));
    }

    #[test]
    fn test_generated_kubeconfig_keys() {
        assert_eq!(GENERATED_KUBECONFIG, &["config", "kubeconfig"]);
    }
}
