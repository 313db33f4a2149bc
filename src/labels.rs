// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Label and annotation keys that carry machine names.
//!
//! Rancher, Cluster API, RKE, Fleet and Elemental have each stamped machine names onto
//! nodes and inventory records under their own keys over the years. The tables below are
//! ordered by preference and are the single place to extend when a new vendor key shows up.

// ============================================================================
// Cluster API / Rancher machine keys
// ============================================================================

/// Cluster API machine owning a node
pub const CAPI_MACHINE: &str = "cluster.x-k8s.io/machine";

/// Rancher machine name
pub const CATTLE_MACHINE_NAME_SHORT: &str = "machine.cattle.io/name";

/// Rancher machine reference
pub const CATTLE_MACHINE_MACHINE: &str = "machine.cattle.io/machine";

/// Rancher machine name (long form)
pub const CATTLE_MACHINE_MACHINE_NAME: &str = "machine.cattle.io/machine-name";

/// Legacy cattle machine key
pub const CATTLE_MACHINE: &str = "cattle.io/machine";

/// Legacy cattle machine name key
pub const CATTLE_MACHINE_NAME: &str = "cattle.io/machine-name";

/// RKE machine key
pub const RKE_MACHINE: &str = "rke.cattle.io/machine";

/// RKE machine name key
pub const RKE_MACHINE_NAME: &str = "rke.cattle.io/machine-name";

/// Rancher management machine key
pub const MANAGEMENT_MACHINE: &str = "management.cattle.io/machine";

/// Rancher provisioning machine key
pub const PROVISIONING_MACHINE: &str = "provisioning.cattle.io/machine";

/// Fleet machine key
pub const FLEET_MACHINE: &str = "fleet.cattle.io/machine";

/// Elemental machine name key
pub const ELEMENTAL_MACHINE_NAME: &str = "elemental.cattle.io/machine-name";

/// Elemental machine key
pub const ELEMENTAL_MACHINE: &str = "elemental.cattle.io/machine";

/// Bare `machine-name` key used by hand-labelled inventories
pub const PLAIN_MACHINE_NAME: &str = "machine-name";

/// Bare `machine` key used by hand-labelled inventories
pub const PLAIN_MACHINE: &str = "machine";

// ============================================================================
// Lookup tables
// ============================================================================

/// Keys checked on node labels, then on node annotations, for a machine name.
pub const NODE_MACHINE_NAME_KEYS: &[&str] = &[
    CAPI_MACHINE,
    CATTLE_MACHINE_NAME_SHORT,
    CATTLE_MACHINE_MACHINE,
    CATTLE_MACHINE,
    CATTLE_MACHINE_NAME,
    RKE_MACHINE,
    RKE_MACHINE_NAME,
    MANAGEMENT_MACHINE,
    PROVISIONING_MACHINE,
    FLEET_MACHINE,
    ELEMENTAL_MACHINE_NAME,
    ELEMENTAL_MACHINE,
];

/// Keys checked on inventory labels, then on inventory annotations, when no machine
/// name field is present on the record itself.
pub const HOST_MACHINE_NAME_KEYS: &[&str] = &[
    ELEMENTAL_MACHINE_NAME,
    ELEMENTAL_MACHINE,
    CATTLE_MACHINE_NAME_SHORT,
    CATTLE_MACHINE_MACHINE,
    CATTLE_MACHINE_MACHINE_NAME,
    CAPI_MACHINE,
    CATTLE_MACHINE,
    CATTLE_MACHINE_NAME,
    RKE_MACHINE,
    MANAGEMENT_MACHINE,
    PROVISIONING_MACHINE,
    FLEET_MACHINE,
    PLAIN_MACHINE_NAME,
    PLAIN_MACHINE,
];

// ============================================================================
// Node address types
// ============================================================================

/// Kubernetes node address type for cluster-internal addresses
pub const ADDRESS_TYPE_INTERNAL_IP: &str = "InternalIP";

/// Kubernetes node address type for externally routable addresses
pub const ADDRESS_TYPE_EXTERNAL_IP: &str = "ExternalIP";
