// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Node enrichment from Cluster API machine records.

use crate::types::{Machine, Node};
use std::collections::HashMap;
use tracing::debug;

/// Map node names to machine names for the machines of one cluster.
///
/// A machine is skipped when it names a different cluster than `cluster_name`, or when
/// its node or machine name is empty. Machines without a cluster name are kept. A later
/// machine for the same node overrides an earlier one.
#[must_use]
pub fn machine_name_map(machines: &[Machine], cluster_name: &str) -> HashMap<String, String> {
    machines
        .iter()
        .filter(|machine| {
            cluster_name.is_empty()
                || machine.cluster_name.is_empty()
                || machine.cluster_name == cluster_name
        })
        .filter(|machine| !machine.node_name.is_empty() && !machine.name.is_empty())
        .map(|machine| (machine.node_name.clone(), machine.name.clone()))
        .collect()
}

/// Overwrite each node's machine name with the authoritative one from `names`.
///
/// Returns the number of nodes updated.
pub fn apply_machine_names(nodes: &mut [Node], names: &HashMap<String, String>) -> usize {
    let mut updated = 0;
    for node in nodes.iter_mut() {
        if let Some(name) = names.get(&node.name).filter(|name| !name.is_empty()) {
            node.machine_name.clone_from(name);
            updated += 1;
        }
    }
    debug!(
        nodes = nodes.len(),
        machines = names.len(),
        updated = updated,
        "Applied Rancher machine names to nodes"
    );
    updated
}

#[cfg(test)]
#[path = "machines_tests.rs"]
mod machines_tests;
