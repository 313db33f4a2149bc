// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `matcher.rs`

#[cfg(test)]
mod tests {
    use crate::matcher::{match_fleet, MatchResult, Method};
    use crate::types::{Host, Node};
    use std::collections::HashSet;

    fn node(name: &str, uid: &str) -> Node {
        Node {
            name: name.to_string(),
            uid: uid.to_string(),
            ..Default::default()
        }
    }

    fn host(id: &str, hostname: &str) -> Host {
        Host {
            id: id.to_string(),
            hostname: hostname.to_string(),
            ..Default::default()
        }
    }

    fn fleet_nodes() -> Vec<Node> {
        vec![
            Node {
                machine_id: "MID-1".to_string(),
                provider_id: "prov-1".to_string(),
                internal_ips: vec!["10.0.0.1".to_string()],
                external_ips: vec!["1.1.1.1".to_string()],
                ..node("node-1", "1")
            },
            Node {
                machine_id: "mid-1".to_string(),
                provider_id: "prov-2".to_string(),
                internal_ips: vec!["10.0.0.2".to_string()],
                external_ips: vec!["1.1.1.2".to_string()],
                ..node("node-2", "2")
            },
            Node {
                provider_id: "prov-3".to_string(),
                internal_ips: vec!["10.0.0.3".to_string()],
                external_ips: vec!["1.1.1.3".to_string()],
                ..node("node-3", "3")
            },
            Node {
                internal_ips: vec!["10.0.0.4".to_string()],
                external_ips: vec!["1.1.1.4".to_string()],
                ..node("node-4", "4")
            },
            node("host-5", "5"),
            node("node-6", "6"),
        ]
    }

    fn fleet_hosts() -> Vec<Host> {
        vec![
            Host {
                machine_id: "MID-1".to_string(),
                provider_id: "prov-3".to_string(),
                ..host("host-a", "host-a")
            },
            Host {
                provider_id: "prov-3".to_string(),
                ..host("host-b", "host-b")
            },
            Host {
                ips: vec!["10.0.0.4".to_string()],
                ..host("host-c", "host-c")
            },
            Host {
                ips: vec!["1.1.1.4".to_string()],
                ..host("host-d", "host-d")
            },
            host("host-e", "host-5"),
            host("host-f", "host-f"),
        ]
    }

    fn assert_partitions(result: &MatchResult, hosts: &[Host], nodes: &[Node]) {
        let host_total =
            result.matches.len() + result.ambiguous.len() + result.unmatched_hosts.len();
        assert_eq!(host_total, hosts.len());

        let referenced: HashSet<&str> = result
            .matches
            .iter()
            .chain(&result.ambiguous)
            .flat_map(|entry| entry.candidates.iter().map(|c| c.node.key()))
            .collect();
        let unmatched: HashSet<&str> = result.unmatched_nodes.iter().map(Node::key).collect();
        for node in nodes {
            assert!(
                referenced.contains(node.key()) != unmatched.contains(node.key()),
                "node {} must be in exactly one partition",
                node.name
            );
        }
    }

    #[test]
    fn test_fleet_scenario() {
        let (hosts, nodes) = (fleet_hosts(), fleet_nodes());
        let result = match_fleet(&hosts, &nodes);

        assert_eq!(result.ambiguous.len(), 1);
        assert_eq!(result.ambiguous[0].method, Method::MachineId);
        assert_eq!(result.matches.len(), 4);
        assert_eq!(result.unmatched_hosts.len(), 1);
        assert_eq!(result.unmatched_hosts[0].id, "host-f");
        assert_eq!(result.unmatched_nodes.len(), 1);
        assert_eq!(result.unmatched_nodes[0].name, "node-6");

        let methods: Vec<(&str, Method)> = result
            .matches
            .iter()
            .map(|entry| (entry.host.id.as_str(), entry.method))
            .collect();
        assert_eq!(
            methods,
            vec![
                ("host-b", Method::ProviderId),
                ("host-c", Method::InternalIp),
                ("host-d", Method::ExternalIp),
                ("host-e", Method::Hostname),
            ]
        );
        assert_partitions(&result, &hosts, &nodes);
    }

    #[test]
    fn test_priority_machine_id_beats_ip() {
        let nodes = vec![
            Node {
                machine_id: "abc".to_string(),
                ..node("node-a", "a")
            },
            Node {
                internal_ips: vec!["10.1.1.1".to_string()],
                ..node("node-b", "b")
            },
        ];
        let hosts = vec![Host {
            machine_id: "ABC".to_string(),
            ips: vec!["10.1.1.1".to_string()],
            ..host("h", "h")
        }];

        let result = match_fleet(&hosts, &nodes);
        assert_eq!(result.matches.len(), 1);
        let entry = &result.matches[0];
        assert_eq!(entry.method, Method::MachineId);
        assert_eq!(entry.confidence, 0.98);
        assert_eq!(entry.candidates[0].node.name, "node-a");
        assert_eq!(entry.candidates[0].explanation, "machine-id=abc");
        assert_eq!(result.unmatched_nodes[0].name, "node-b");
    }

    #[test]
    fn test_system_uuid_counts_as_machine_id() {
        let nodes = vec![Node {
            machine_id: "4C4C4544-0042-3510-8052-B4C04F4E4E32".to_string(),
            ..node("node-a", "a")
        }];
        let hosts = vec![Host {
            system_uuid: "4c4c4544-0042-3510-8052-b4c04f4e4e32".to_string(),
            ..host("h", "")
        }];

        let result = match_fleet(&hosts, &nodes);
        assert_eq!(result.matches[0].method, Method::MachineId);
    }

    #[test]
    fn test_ambiguous_candidates_sorted_by_name() {
        let nodes = vec![
            Node {
                machine_id: "dup".to_string(),
                ..node("zeta", "z")
            },
            Node {
                machine_id: "DUP".to_string(),
                ..node("alpha", "a")
            },
        ];
        let hosts = vec![Host {
            machine_id: "Dup".to_string(),
            ..host("h", "")
        }];

        let result = match_fleet(&hosts, &nodes);
        assert!(result.matches.is_empty());
        let entry = &result.ambiguous[0];
        assert_eq!(entry.method, Method::MachineId);
        let names: Vec<&str> = entry
            .candidates
            .iter()
            .map(|c| c.node.name.as_str())
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert!(result.unmatched_nodes.is_empty());
    }

    #[test]
    fn test_node_deduplicated_across_keys() {
        let nodes = vec![Node {
            internal_ips: vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()],
            ..node("node-a", "a")
        }];
        let hosts = vec![Host {
            ips: vec!["10.0.0.2".to_string(), "10.0.0.1".to_string()],
            ..host("h", "")
        }];

        let result = match_fleet(&hosts, &nodes);
        assert_eq!(result.matches.len(), 1);
        assert_eq!(
            result.matches[0].candidates[0].explanation,
            "internal-ip=10.0.0.1"
        );
    }

    #[test]
    fn test_hostname_hex_suffix() {
        let nodes = vec![node(
            "smtl001-w-asus-1c32d8c7-cd47-2da5-19b7-bcfce773e4da-62c86a9b",
            "node-1",
        )];
        let hosts = vec![host(
            "host-1",
            "smtl001-w-asus-1c32d8c7-cd47-2da5-19b7-bcfce773e4da",
        )];

        let result = match_fleet(&hosts, &nodes);
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].method, Method::Hostname);
        assert_eq!(result.matches[0].confidence, 0.7);
    }

    #[test]
    fn test_machine_name_from_node_labels() {
        let mut labelled = node("node-1", "node-1");
        labelled.labels.insert(
            "cluster.x-k8s.io/machine".to_string(),
            "shared-mtl-001-a9070xt-b26pf-v24bp".to_string(),
        );
        let hosts = vec![Host {
            machine_name: "shared-mtl-001-a9070xt-b26pf-v24bp".to_string(),
            ..host("host-1", "")
        }];

        let result = match_fleet(&hosts, &[labelled]);
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].method, Method::MachineName);
    }

    #[test]
    fn test_machine_name_before_hostname() {
        let nodes = vec![
            Node {
                machine_name: "pool-1".to_string(),
                ..node("node-x", "x")
            },
            node("edge-1", "e"),
        ];
        let hosts = vec![Host {
            machine_name: "pool-1".to_string(),
            ..host("h", "edge-1")
        }];

        let result = match_fleet(&hosts, &nodes);
        assert_eq!(result.matches[0].method, Method::MachineName);
        assert_eq!(result.matches[0].candidates[0].node.name, "node-x");
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(match_fleet(&[], &[]), MatchResult::default());

        let result = match_fleet(&[host("h", "")], &[]);
        assert_eq!(result.unmatched_hosts.len(), 1);

        let result = match_fleet(&[], &fleet_nodes());
        assert_eq!(result.unmatched_nodes.len(), 6);
    }

    #[test]
    fn test_deterministic_serialization() {
        let (hosts, nodes) = (fleet_hosts(), fleet_nodes());
        let first = serde_json::to_string(&match_fleet(&hosts, &nodes)).unwrap();
        let second = serde_json::to_string(&match_fleet(&hosts, &nodes)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_method_names() {
        let names: Vec<String> = Method::PRIORITY
            .iter()
            .map(|method| serde_json::to_value(method).unwrap().as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "machine-id",
                "provider-id",
                "internal-ip",
                "external-ip",
                "machine-name",
                "hostname"
            ]
        );
        assert!(Method::PRIORITY
            .iter()
            .all(|method| method.to_string() == method.as_str()));
    }
}
