// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Identity matching of inventory hosts against Kubernetes nodes.
//!
//! Each host is tried against the node index with six strategies in fixed priority
//! order. The first strategy that yields any candidate decides the host:
//!
//! | Method         | Host keys                         | Confidence |
//! |----------------|-----------------------------------|------------|
//! | `machine-id`   | machine ID and system UUID        | 0.98       |
//! | `provider-id`  | provider ID                       | 0.95       |
//! | `internal-ip`  | reported IPs vs node internal IPs | 0.90       |
//! | `external-ip`  | reported IPs vs node external IPs | 0.85       |
//! | `machine-name` | hostname variants of machine name | 0.75       |
//! | `hostname`     | hostname variants of hostname     | 0.70       |
//!
//! One candidate is a match, several are ambiguous, none at all leaves the host
//! unmatched. Nodes never named as a candidate are reported as unmatched nodes.

use crate::canonical::{hostname_variants, normalized_ids, normalized_ips};
use crate::constants::{
    CONFIDENCE_EXTERNAL_IP, CONFIDENCE_HOSTNAME, CONFIDENCE_INTERNAL_IP, CONFIDENCE_MACHINE_ID,
    CONFIDENCE_MACHINE_NAME, CONFIDENCE_PROVIDER_ID,
};
use crate::index::{NodeIndex, NodeTable};
use crate::types::{Host, Node};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// Identity strategy that produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    /// Machine ID or system UUID
    MachineId,
    /// Provider ID
    ProviderId,
    /// Internal IP address
    InternalIp,
    /// External IP address
    ExternalIp,
    /// Machine name
    MachineName,
    /// Hostname
    Hostname,
}

impl Method {
    /// All methods, highest priority first.
    pub const PRIORITY: [Method; 6] = [
        Method::MachineId,
        Method::ProviderId,
        Method::InternalIp,
        Method::ExternalIp,
        Method::MachineName,
        Method::Hostname,
    ];

    /// Fixed confidence of a match found by this method.
    #[must_use]
    pub const fn confidence(self) -> f64 {
        match self {
            Method::MachineId => CONFIDENCE_MACHINE_ID,
            Method::ProviderId => CONFIDENCE_PROVIDER_ID,
            Method::InternalIp => CONFIDENCE_INTERNAL_IP,
            Method::ExternalIp => CONFIDENCE_EXTERNAL_IP,
            Method::MachineName => CONFIDENCE_MACHINE_NAME,
            Method::Hostname => CONFIDENCE_HOSTNAME,
        }
    }

    /// Wire name, e.g. `machine-id`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Method::MachineId => "machine-id",
            Method::ProviderId => "provider-id",
            Method::InternalIp => "internal-ip",
            Method::ExternalIp => "external-ip",
            Method::MachineName => "machine-name",
            Method::Hostname => "hostname",
        }
    }

    /// Canonical host keys looked up by this method.
    fn host_keys(self, host: &Host) -> Vec<String> {
        match self {
            Method::MachineId => {
                normalized_ids([host.machine_id.as_str(), host.system_uuid.as_str()])
            }
            Method::ProviderId => normalized_ids([host.provider_id.as_str()]),
            Method::InternalIp | Method::ExternalIp => normalized_ips(&host.ips),
            Method::MachineName => hostname_variants(&host.machine_name),
            Method::Hostname => hostname_variants(&host.hostname),
        }
    }

    fn table<'i, 'n>(self, index: &'i NodeIndex<'n>) -> &'i NodeTable<'n> {
        match self {
            Method::MachineId => &index.machine_id,
            Method::ProviderId => &index.provider_id,
            Method::InternalIp => &index.internal_ip,
            Method::ExternalIp => &index.external_ip,
            Method::MachineName => &index.machine_name,
            Method::Hostname => &index.hostname,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One candidate node for a host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeMatch {
    /// Candidate node
    pub node: Node,
    /// Strategy that found it
    pub method: Method,
    /// Confidence of the strategy
    pub confidence: f64,
    /// `<method>=<key>` for the first key that reached this node
    pub explanation: String,
}

/// A host with its candidates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostMatch {
    /// Inventory host
    pub host: Host,
    /// Candidates sorted by node name
    pub candidates: Vec<NodeMatch>,
    /// Method of the first candidate
    pub method: Method,
    /// Confidence of the first candidate
    pub confidence: f64,
}

/// Partitioned outcome of a matching run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    /// Hosts with exactly one candidate
    pub matches: Vec<HostMatch>,
    /// Hosts with several candidates
    pub ambiguous: Vec<HostMatch>,
    /// Hosts no strategy matched
    pub unmatched_hosts: Vec<Host>,
    /// Nodes not named by any candidate, in input order
    pub unmatched_nodes: Vec<Node>,
}

/// Match `hosts` against `nodes`.
///
/// Total over any input, including empty slices, and deterministic for a given input.
#[must_use]
pub fn match_fleet(hosts: &[Host], nodes: &[Node]) -> MatchResult {
    let index = NodeIndex::build(nodes);
    let mut result = MatchResult::default();
    let mut referenced: HashSet<String> = HashSet::new();

    for host in hosts {
        let Some(candidates) = Method::PRIORITY
            .into_iter()
            .map(|method| candidates_for(host, method, &index))
            .find(|candidates| !candidates.is_empty())
        else {
            result.unmatched_hosts.push(host.clone());
            continue;
        };

        referenced.extend(candidates.iter().map(|candidate| candidate.node.key().to_string()));
        let (method, confidence) = (candidates[0].method, candidates[0].confidence);
        let entry = HostMatch {
            host: host.clone(),
            candidates,
            method,
            confidence,
        };
        if entry.candidates.len() == 1 {
            result.matches.push(entry);
        } else {
            result.ambiguous.push(entry);
        }
    }

    result.unmatched_nodes = nodes
        .iter()
        .filter(|node| !referenced.contains(node.key()))
        .cloned()
        .collect();

    debug!(
        hosts = hosts.len(),
        nodes = nodes.len(),
        matched = result.matches.len(),
        ambiguous = result.ambiguous.len(),
        unmatched_hosts = result.unmatched_hosts.len(),
        unmatched_nodes = result.unmatched_nodes.len(),
        "Matched inventory against nodes"
    );
    result
}

/// Candidates of one strategy, de-duplicated by node key and sorted by node name.
fn candidates_for(host: &Host, method: Method, index: &NodeIndex<'_>) -> Vec<NodeMatch> {
    let table = method.table(index);
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for key in method.host_keys(host) {
        for node in table.get(&key).into_iter().flatten() {
            if seen.insert(node.key()) {
                candidates.push(NodeMatch {
                    node: (*node).clone(),
                    method,
                    confidence: method.confidence(),
                    explanation: format!("{method}={key}"),
                });
            }
        }
    }

    candidates.sort_by(|a, b| a.node.name.cmp(&b.node.name));
    candidates
}

#[cfg(test)]
#[path = "matcher_tests.rs"]
mod matcher_tests;
