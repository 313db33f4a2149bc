// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `normalize.rs`

#[cfg(test)]
mod tests {
    use crate::normalize::{
        id_from_link, normalize_cluster, normalize_host, normalize_machine, normalize_node,
    };
    use crate::value::Field;
    use k8s_openapi::api::core::v1::{
        Node as KubeNode, NodeAddress, NodeSpec, NodeStatus, NodeSystemInfo,
    };
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn record(value: serde_json::Value) -> Field {
        Field::from(value)
    }

    fn kube_node(name: &str) -> KubeNode {
        KubeNode {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                uid: Some(format!("uid-{name}")),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn address(kind: &str, ip: &str) -> NodeAddress {
        NodeAddress {
            type_: kind.to_string(),
            address: ip.to_string(),
        }
    }

    #[test]
    fn test_host_full_record() {
        let host = normalize_host(&record(json!({
            "id": "fleet-default/mi-1",
            "metadata": {
                "name": "mi-1",
                "uid": "u-1",
                "namespace": "fleet-default",
                "labels": {"role": "worker", "zone": "a"},
                "annotations": {"note": "x"}
            },
            "spec": {
                "machineName": "fleet-default/m-1",
                "machineID": "MID-1",
                "systemUUID": "SU-1",
                "providerID": "elemental://m-1",
                "labels": {"zone": "b"},
                "ipAddresses": ["10.0.0.1"]
            },
            "status": {"hostname": "node-1"}
        })));

        assert_eq!(host.id, "fleet-default/mi-1");
        assert_eq!(host.uid, "u-1");
        assert_eq!(host.namespace, "fleet-default");
        assert_eq!(host.machine_name, "m-1");
        assert_eq!(host.hostname, "node-1");
        assert_eq!(host.machine_id, "MID-1");
        assert_eq!(host.system_uuid, "SU-1");
        assert_eq!(host.provider_id, "elemental://m-1");
        assert_eq!(host.ips, vec!["10.0.0.1".to_string()]);
        assert_eq!(host.labels.get("role").map(String::as_str), Some("worker"));
        assert_eq!(
            host.labels.get("zone").map(String::as_str),
            Some("b"),
            "spec.labels override metadata.labels"
        );
        assert_eq!(host.metadata.get("note").map(String::as_str), Some("x"));
    }

    #[test]
    fn test_host_machine_name_from_labels_then_annotations() {
        let from_labels = normalize_host(&record(json!({
            "metadata": {
                "labels": {"elemental.cattle.io/machine": "fleet-default/m-label"},
                "annotations": {"elemental.cattle.io/machine-name": "m-annotation"}
            }
        })));
        assert_eq!(from_labels.machine_name, "m-label");

        let from_annotations = normalize_host(&record(json!({
            "metadata": {"annotations": {"machine-name": "m-annotation"}}
        })));
        assert_eq!(from_annotations.machine_name, "m-annotation");
    }

    #[test]
    fn test_host_id_falls_back_to_self_link() {
        let host = normalize_host(&record(json!({
            "links": {"self": "https://rancher/v1/elemental.cattle.io.machineinventories/fleet-default/mi-9?x=1"},
            "status": {"hostname": "node-9"}
        })));
        assert_eq!(host.id, "mi-9");
    }

    #[test]
    fn test_host_id_falls_back_to_hostname() {
        let host = normalize_host(&record(json!({"spec": {"nodeName": "node-3"}})));
        assert_eq!(host.id, "node-3");
        assert_eq!(host.hostname, "node-3");
    }

    #[test]
    fn test_host_empty_record() {
        let host = normalize_host(&record(json!({})));
        assert!(host.has_no_identifiers());
        assert_eq!(host.display_name(), None);
    }

    #[test]
    fn test_host_ips_from_address_objects() {
        let host = normalize_host(&record(json!({
            "status": {"addresses": [{"type": "InternalIP", "address": "10.1.0.5"}]}
        })));
        assert_eq!(host.ips, vec!["10.1.0.5".to_string()]);
    }

    #[test]
    fn test_id_from_link() {
        assert_eq!(id_from_link("https://h/a/b/c#frag"), Some("c".to_string()));
        assert_eq!(id_from_link("plain"), Some("plain".to_string()));
        assert_eq!(id_from_link("https://h/a/b/"), Some("https://h/a/b/".to_string()));
        assert_eq!(id_from_link("  "), None);
    }

    #[test]
    fn test_machine_record() {
        let machine = normalize_machine(&record(json!({
            "id": "fleet-default/m-1",
            "metadata": {
                "name": "m-1",
                "labels": {"cluster.x-k8s.io/cluster-name": "edge-01"}
            },
            "spec": {"providerID": "elemental://m-1"},
            "status": {"nodeRef": {"name": "node-1"}}
        })));
        assert_eq!(machine.id, "fleet-default/m-1");
        assert_eq!(machine.name, "m-1");
        assert_eq!(machine.cluster_name, "edge-01");
        assert_eq!(machine.node_name, "node-1");
        assert_eq!(machine.provider_id, "elemental://m-1");
    }

    #[test]
    fn test_cluster_record() {
        let cluster = normalize_cluster(&record(json!({"id": "c-m-abc", "name": "edge"})));
        assert_eq!(cluster.id, "c-m-abc");
        assert_eq!(cluster.display_name(), "edge");

        let unnamed = normalize_cluster(&record(json!({"id": "c-m-def"})));
        assert_eq!(unnamed.display_name(), "c-m-def");
    }

    #[test]
    fn test_node_addresses_and_identity() {
        let mut node = kube_node("node-1");
        node.spec = Some(NodeSpec {
            provider_id: Some("elemental://m-1".to_string()),
            ..Default::default()
        });
        node.status = Some(NodeStatus {
            addresses: Some(vec![
                address("Hostname", "node-1"),
                address("InternalIP", "10.0.0.1"),
                address("ExternalIP", "203.0.113.1"),
                address("InternalIP", "10.0.0.2"),
            ]),
            node_info: Some(NodeSystemInfo {
                machine_id: "mid-1".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        });

        let normalized = normalize_node(&node);
        assert_eq!(normalized.name, "node-1");
        assert_eq!(normalized.uid, "uid-node-1");
        assert_eq!(normalized.provider_id, "elemental://m-1");
        assert_eq!(normalized.machine_id, "mid-1");
        assert_eq!(normalized.internal_ips, vec!["10.0.0.1", "10.0.0.2"]);
        assert_eq!(normalized.external_ips, vec!["203.0.113.1"]);
        assert_eq!(normalized.primary_internal_ip(), "10.0.0.1");
    }

    #[test]
    fn test_node_machine_name_skips_uuid() {
        let mut node = kube_node("node-2");
        node.metadata.labels = Some(BTreeMap::from([(
            "cluster.x-k8s.io/machine".to_string(),
            "1c32d8c7-cd47-2da5-19b7-bcfce773e4da".to_string(),
        )]));
        node.metadata.annotations = Some(BTreeMap::from([(
            "rke.cattle.io/machine".to_string(),
            "fleet-default/pool-a-x7k2p".to_string(),
        )]));
        assert_eq!(normalize_node(&node).machine_name, "pool-a-x7k2p");
    }

    #[test]
    fn test_node_without_status() {
        let normalized = normalize_node(&kube_node("bare"));
        assert!(normalized.internal_ips.is_empty());
        assert!(normalized.machine_id.is_empty());
        assert!(normalized.machine_name.is_empty());
    }
}
