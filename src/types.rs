// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Canonical records shared by acquisition, matching and rendering.

use serde::Serialize;
use std::collections::BTreeMap;

/// Normalized view of a Kubernetes node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Node name (`metadata.name`)
    pub name: String,
    /// Node UID, may be empty
    pub uid: String,
    /// Node labels
    pub labels: BTreeMap<String, String>,
    /// Node annotations
    pub annotations: BTreeMap<String, String>,
    /// `spec.providerID`
    #[serde(rename = "providerID")]
    pub provider_id: String,
    /// `status.nodeInfo.machineID`
    #[serde(rename = "machineID")]
    pub machine_id: String,
    /// Machine name derived from labels/annotations or Rancher machine records
    pub machine_name: String,
    /// Addresses of type `InternalIP`
    #[serde(rename = "internalIPs")]
    pub internal_ips: Vec<String>,
    /// Addresses of type `ExternalIP`
    #[serde(rename = "externalIPs")]
    pub external_ips: Vec<String>,
}

impl Node {
    /// Identity of the node within one node set: the UID when present, else the name.
    #[must_use]
    pub fn key(&self) -> &str {
        if self.uid.is_empty() {
            &self.name
        } else {
            &self.uid
        }
    }

    /// First internal IP, empty when none.
    #[must_use]
    pub fn primary_internal_ip(&self) -> &str {
        self.internal_ips.first().map_or("", String::as_str)
    }

    /// First external IP, empty when none.
    #[must_use]
    pub fn primary_external_ip(&self) -> &str {
        self.external_ips.first().map_or("", String::as_str)
    }
}

/// Normalized view of a Rancher Elemental inventory record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Host {
    /// Inventory record ID
    pub id: String,
    /// Inventory record UID
    pub uid: String,
    /// Namespace of the inventory record
    pub namespace: String,
    /// Machine name assigned to the record
    pub machine_name: String,
    /// Reported hostname
    pub hostname: String,
    /// Machine ID
    #[serde(rename = "machineID")]
    pub machine_id: String,
    /// SMBIOS system UUID
    #[serde(rename = "systemUUID")]
    pub system_uuid: String,
    /// Provider ID
    #[serde(rename = "providerID")]
    pub provider_id: String,
    /// Reported IP addresses
    #[serde(rename = "ips")]
    pub ips: Vec<String>,
    /// Merged labels
    pub labels: BTreeMap<String, String>,
    /// Annotations
    pub metadata: BTreeMap<String, String>,
}

impl Host {
    /// Best human label for the host: machine name, hostname, ID, then UID.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        [&self.machine_name, &self.hostname, &self.id, &self.uid]
            .into_iter()
            .find(|value| !value.is_empty())
            .map(String::as_str)
    }

    /// Whether the record carries no identifier at all.
    #[must_use]
    pub fn has_no_identifiers(&self) -> bool {
        self.display_name().is_none()
            && self.ips.is_empty()
            && self.machine_id.is_empty()
            && self.system_uuid.is_empty()
            && self.provider_id.is_empty()
    }
}

/// Rancher management cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Cluster {
    /// Cluster ID (e.g. `c-m-abc123`)
    pub id: String,
    /// Display name
    pub name: String,
}

impl Cluster {
    /// Name when set, otherwise the ID.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// Cluster API machine as exposed by Rancher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    /// Machine ID
    pub id: String,
    /// Machine name
    pub name: String,
    /// Downstream cluster owning the machine
    pub cluster_name: String,
    /// Kubernetes node backed by the machine
    pub node_name: String,
    /// Provider ID
    #[serde(rename = "providerID")]
    pub provider_id: String,
    /// Labels
    pub labels: BTreeMap<String, String>,
    /// Annotations
    pub annotations: BTreeMap<String, String>,
}
