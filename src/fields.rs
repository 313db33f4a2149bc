// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Field-path compatibility tables for Rancher payloads.
//!
//! Every logical field of an inventory, machine or cluster record has been exposed under
//! several paths as the Elemental and Cluster API schemas evolved. Each table lists the
//! dotted paths in preference order; the first path that resolves to a non-empty value
//! wins. Add new vendor variants here rather than at the call sites.

// ============================================================================
// Inventory host fields
// ============================================================================

/// Inventory record identifier
pub const HOST_ID: &[&str] = &["id", "metadata.name", "name", "metadata.generateName"];

/// Inventory record UID
pub const HOST_UID: &[&str] = &["metadata.uid", "uid"];

/// Inventory record namespace
pub const HOST_NAMESPACE: &[&str] = &["metadata.namespace", "namespace"];

/// Label maps merged into the host label set, later entries overriding earlier ones
pub const HOST_LABEL_MAPS: &[&str] = &["metadata.labels", "spec.labels", "labels"];

/// Annotation map exposed as host metadata
pub const HOST_ANNOTATIONS: &[&str] = &["metadata.annotations"];

/// Machine name assigned to the inventory record
pub const HOST_MACHINE_NAME: &[&str] = &[
    "spec.machineName",
    "status.machineName",
    "machineName",
    "spec.machine.name",
    "status.machine.name",
    "spec.machineRef.name",
    "status.machineRef.name",
    "spec.machine",
    "status.machine",
    "spec.inventory.machineName",
    "status.inventory.machineName",
    "spec.machineInventory.machineName",
    "status.machineInventory.machineName",
];

/// Hostname reported for the inventory record
pub const HOST_HOSTNAME: &[&str] = &[
    "spec.nodeName",
    "status.nodeName",
    "status.hostname",
    "status.hostName",
    "status.nodeRef.name",
    "spec.nodeRef.name",
    "spec.hostname",
    "spec.inventory.hostname",
    "status.inventory.hostname",
    "spec.machineInventory.hostname",
    "status.machineInventory.hostname",
    "hostname",
    "name",
    "metadata.name",
];

/// Machine ID (`/etc/machine-id`) of the inventory record
pub const HOST_MACHINE_ID: &[&str] = &[
    "spec.machineID",
    "spec.machineId",
    "machineID",
    "machineId",
    "status.machineID",
    "status.machineId",
    "spec.inventory.machineID",
    "spec.inventory.machineId",
    "status.inventory.machineID",
    "status.inventory.machineId",
    "spec.machineInventory.machineID",
    "spec.machineInventory.machineId",
    "status.machineInventory.machineID",
    "status.machineInventory.machineId",
];

/// SMBIOS system UUID of the inventory record
pub const HOST_SYSTEM_UUID: &[&str] = &[
    "spec.systemUUID",
    "spec.systemUuid",
    "systemUUID",
    "systemUuid",
    "status.systemUUID",
    "status.systemUuid",
    "spec.inventory.systemUUID",
    "spec.inventory.systemUuid",
    "status.inventory.systemUUID",
    "status.inventory.systemUuid",
    "spec.machineInventory.systemUUID",
    "spec.machineInventory.systemUuid",
    "status.machineInventory.systemUUID",
    "status.machineInventory.systemUuid",
];

/// Cloud/provider ID of the inventory record
pub const HOST_PROVIDER_ID: &[&str] = &[
    "spec.providerID",
    "spec.providerId",
    "providerID",
    "providerId",
    "status.providerID",
    "status.providerId",
    "spec.inventory.providerID",
    "spec.inventory.providerId",
    "status.inventory.providerID",
    "status.inventory.providerId",
    "spec.machineInventory.providerID",
    "spec.machineInventory.providerId",
    "status.machineInventory.providerID",
    "status.machineInventory.providerId",
];

/// IP addresses of the inventory record (plain strings or address objects)
pub const HOST_IPS: &[&str] = &[
    "spec.ipAddresses",
    "spec.ipAddress",
    "spec.addresses",
    "ipAddresses",
    "ipAddress",
    "status.ipAddresses",
    "status.ipAddress",
    "status.addresses",
    "status.nodeAddresses",
    "status.node.addresses",
    "spec.inventory.ipAddresses",
    "spec.inventory.ipAddress",
    "status.inventory.ipAddresses",
    "status.inventory.ipAddress",
    "spec.machineInventory.ipAddresses",
    "spec.machineInventory.ipAddress",
    "status.machineInventory.ipAddresses",
    "status.machineInventory.ipAddress",
];

/// Links whose last path segment identifies the record when no ID field is present
pub const HOST_SELF_LINKS: &[&str] = &["links.self", "links.selfLink", "links.view", "links.update"];

// ============================================================================
// Cluster API machine fields
// ============================================================================

/// Machine identifier
pub const MACHINE_ID: &[&str] = &["id", "metadata.name"];

/// Machine name
pub const MACHINE_NAME: &[&str] = &[
    "metadata.name",
    "name",
    "id",
    "spec.machineName",
    "spec.machine.name",
];

/// Downstream cluster owning the machine
pub const MACHINE_CLUSTER_NAME: &[&str] = &[
    "spec.clusterName",
    "status.clusterName",
    "metadata.labels.cluster.x-k8s.io/cluster-name",
    "metadata.labels.provisioning.cattle.io/cluster-name",
    "metadata.labels.cluster-name",
    "metadata.labels.cluster",
];

/// Kubernetes node backed by the machine
pub const MACHINE_NODE_NAME: &[&str] = &[
    "status.nodeRef.name",
    "status.nodeName",
    "spec.nodeRef.name",
    "spec.nodeName",
    "status.node",
];

/// Provider ID of the machine
pub const MACHINE_PROVIDER_ID: &[&str] = &["spec.providerID", "status.providerID"];

/// Machine labels
pub const MACHINE_LABELS: &[&str] = &["metadata.labels"];

/// Machine annotations
pub const MACHINE_ANNOTATIONS: &[&str] = &["metadata.annotations"];

// ============================================================================
// Management cluster fields
// ============================================================================

/// Management cluster ID (e.g. `c-m-abc123`)
pub const CLUSTER_ID: &[&str] = &["id"];

/// Management cluster display name
pub const CLUSTER_NAME: &[&str] = &["name"];

// ============================================================================
// Action responses
// ============================================================================

/// Kubeconfig text returned by the `generateKubeconfig` action
pub const GENERATED_KUBECONFIG: &[&str] = &["config", "kubeconfig"];

/// Keys holding the address of a Kubernetes-style address object
pub const ADDRESS_OBJECT_KEYS: &[&str] = &["address", "ip", "ipAddress", "value"];

#[cfg(test)]
#[path = "fields_tests.rs"]
mod fields_tests;
