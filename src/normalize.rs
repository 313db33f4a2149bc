// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Build canonical records from raw API payloads.
//!
//! Rancher records arrive as [`Field`] trees and are read through the path tables in
//! [`crate::fields`]. Kubernetes nodes arrive typed from `k8s-openapi`.

use crate::canonical::{machine_name_candidates, normalize_machine_name, select_machine_name};
use crate::fields;
use crate::labels::{ADDRESS_TYPE_EXTERNAL_IP, ADDRESS_TYPE_INTERNAL_IP, HOST_MACHINE_NAME_KEYS};
use crate::types::{Cluster, Host, Machine, Node};
use crate::value::Field;
use k8s_openapi::api::core::v1::Node as KubeNode;
use std::collections::BTreeMap;

/// Build a [`Host`] from an Elemental inventory record.
///
/// The ID falls back to the last segment of a self link and then to the hostname, so
/// every record with some identity gets a stable label.
#[must_use]
pub fn normalize_host(raw: &Field) -> Host {
    let labels = merge_maps(
        fields::HOST_LABEL_MAPS
            .iter()
            .filter_map(|path| raw.lookup(path).and_then(Field::as_string_map)),
    );
    let metadata = raw
        .first_string_map(fields::HOST_ANNOTATIONS)
        .unwrap_or_default();

    let machine_name = raw
        .first_text(fields::HOST_MACHINE_NAME)
        .map(|name| normalize_machine_name(&name))
        .filter(|name| !name.is_empty())
        .or_else(|| first_map_value(&labels, HOST_MACHINE_NAME_KEYS))
        .or_else(|| first_map_value(&metadata, HOST_MACHINE_NAME_KEYS))
        .unwrap_or_default();

    let hostname = raw.first_text(fields::HOST_HOSTNAME).unwrap_or_default();

    let id = raw
        .first_text(fields::HOST_ID)
        .or_else(|| {
            raw.first_text(fields::HOST_SELF_LINKS)
                .and_then(|link| id_from_link(&link))
        })
        .unwrap_or_else(|| hostname.clone());

    Host {
        id,
        uid: raw.first_text(fields::HOST_UID).unwrap_or_default(),
        namespace: raw.first_text(fields::HOST_NAMESPACE).unwrap_or_default(),
        machine_name,
        hostname,
        machine_id: raw.first_text(fields::HOST_MACHINE_ID).unwrap_or_default(),
        system_uuid: raw.first_text(fields::HOST_SYSTEM_UUID).unwrap_or_default(),
        provider_id: raw.first_text(fields::HOST_PROVIDER_ID).unwrap_or_default(),
        ips: raw.first_ip_list(fields::HOST_IPS).unwrap_or_default(),
        labels,
        metadata,
    }
}

/// Build a [`Machine`] from a Cluster API machine record.
#[must_use]
pub fn normalize_machine(raw: &Field) -> Machine {
    let text = |paths: &[&str]| raw.first_text(paths).unwrap_or_default();
    Machine {
        id: text(fields::MACHINE_ID),
        name: normalize_machine_name(&text(fields::MACHINE_NAME)),
        cluster_name: text(fields::MACHINE_CLUSTER_NAME),
        node_name: normalize_machine_name(&text(fields::MACHINE_NODE_NAME)),
        provider_id: text(fields::MACHINE_PROVIDER_ID),
        labels: raw
            .first_string_map(fields::MACHINE_LABELS)
            .unwrap_or_default(),
        annotations: raw
            .first_string_map(fields::MACHINE_ANNOTATIONS)
            .unwrap_or_default(),
    }
}

/// Build a [`Cluster`] from a management cluster record.
#[must_use]
pub fn normalize_cluster(raw: &Field) -> Cluster {
    Cluster {
        id: raw.first_text(fields::CLUSTER_ID).unwrap_or_default(),
        name: raw.first_text(fields::CLUSTER_NAME).unwrap_or_default(),
    }
}

/// Build a [`Node`] from a Kubernetes node object.
#[must_use]
pub fn normalize_node(node: &KubeNode) -> Node {
    let labels = node.metadata.labels.clone().unwrap_or_default();
    let annotations = node.metadata.annotations.clone().unwrap_or_default();

    let mut internal_ips = Vec::new();
    let mut external_ips = Vec::new();
    let addresses = node
        .status
        .as_ref()
        .and_then(|status| status.addresses.as_deref())
        .unwrap_or_default();
    for address in addresses {
        match address.type_.as_str() {
            ADDRESS_TYPE_INTERNAL_IP => internal_ips.push(address.address.clone()),
            ADDRESS_TYPE_EXTERNAL_IP => external_ips.push(address.address.clone()),
            _ => {}
        }
    }

    let machine_id = node
        .status
        .as_ref()
        .and_then(|status| status.node_info.as_ref())
        .map(|info| info.machine_id.clone())
        .unwrap_or_default();

    let machine_name =
        select_machine_name(&machine_name_candidates(&labels, &annotations)).unwrap_or_default();

    Node {
        name: node.metadata.name.clone().unwrap_or_default(),
        uid: node.metadata.uid.clone().unwrap_or_default(),
        provider_id: node
            .spec
            .as_ref()
            .and_then(|spec| spec.provider_id.clone())
            .unwrap_or_default(),
        machine_id,
        machine_name,
        internal_ips,
        external_ips,
        labels,
        annotations,
    }
}

/// Last path segment of a link, ignoring query and fragment.
#[must_use]
pub fn id_from_link(link: &str) -> Option<String> {
    let link = link.trim();
    let link = link.split(['?', '#']).next().unwrap_or(link);
    let segment = match link.rfind('/') {
        Some(idx) if idx + 1 < link.len() => &link[idx + 1..],
        _ => link,
    };
    let segment = segment.trim();
    (!segment.is_empty()).then(|| segment.to_string())
}

fn merge_maps<I>(maps: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = BTreeMap<String, String>>,
{
    maps.into_iter().fold(BTreeMap::new(), |mut merged, map| {
        merged.extend(map);
        merged
    })
}

fn first_map_value(map: &BTreeMap<String, String>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .map(normalize_machine_name)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod normalize_tests;
