// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Lookup tables over a node set, one per identity strategy.

use crate::canonical::{
    hostname_variants, machine_name_candidates, normalize_id, normalize_machine_name,
    normalized_ips,
};
use crate::types::Node;
use std::collections::{BTreeSet, HashMap};

/// Canonical key to the nodes carrying it, in node input order.
pub type NodeTable<'a> = HashMap<String, Vec<&'a Node>>;

/// Six key tables built from one node set.
///
/// A node appears once per distinct key it produces, so it can sit under several keys of
/// the same table (every hostname variant, every IP).
#[derive(Debug, Default)]
pub struct NodeIndex<'a> {
    /// `status.nodeInfo.machineID`
    pub machine_id: NodeTable<'a>,
    /// `spec.providerID`
    pub provider_id: NodeTable<'a>,
    /// `InternalIP` addresses
    pub internal_ip: NodeTable<'a>,
    /// `ExternalIP` addresses
    pub external_ip: NodeTable<'a>,
    /// Hostname variants of the derived machine name and every label/annotation candidate
    pub machine_name: NodeTable<'a>,
    /// Hostname variants of the node name
    pub hostname: NodeTable<'a>,
}

impl<'a> NodeIndex<'a> {
    /// Index `nodes`.
    #[must_use]
    pub fn build(nodes: &'a [Node]) -> Self {
        let mut index = Self::default();
        for node in nodes {
            if let Some(key) = normalize_id(&node.machine_id) {
                insert(&mut index.machine_id, key, node);
            }
            if let Some(key) = normalize_id(&node.provider_id) {
                insert(&mut index.provider_id, key, node);
            }
            for key in normalized_ips(&node.internal_ips) {
                insert(&mut index.internal_ip, key, node);
            }
            for key in normalized_ips(&node.external_ips) {
                insert(&mut index.external_ip, key, node);
            }
            for key in node_machine_name_keys(node) {
                insert(&mut index.machine_name, key, node);
            }
            for key in hostname_variants(&node.name) {
                insert(&mut index.hostname, key, node);
            }
        }
        index
    }
}

fn insert<'a>(table: &mut NodeTable<'a>, key: String, node: &'a Node) {
    table.entry(key).or_default().push(node);
}

/// Machine-name keys of a node: hostname variants of its derived machine name and of
/// every machine-name label or annotation it carries.
#[must_use]
pub fn node_machine_name_keys(node: &Node) -> Vec<String> {
    let derived = normalize_machine_name(&node.machine_name);
    std::iter::once(derived)
        .chain(machine_name_candidates(&node.labels, &node.annotations))
        .filter(|name| !name.is_empty())
        .flat_map(|name| hostname_variants(&name))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
#[path = "index_tests.rs"]
mod index_tests;
