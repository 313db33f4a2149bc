// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for elemental-node-map.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

use std::time::Duration;

// ============================================================================
// Application Constants
// ============================================================================

/// Application namespace used for the user cache directory
pub const APP_NAMESPACE: &str = "elemental-node-map";

/// User agent sent with every Rancher API request
pub const USER_AGENT: &str = "elemental-node-map/1.0";

// ============================================================================
// Rancher API Constants
// ============================================================================

/// Default page size injected as the `limit` query parameter when absent
pub const RANCHER_LIST_PAGE_SIZE: u32 = 200;

/// Query parameter carrying the page size
pub const RANCHER_LIMIT_PARAM: &str = "limit";

/// Overall timeout for a single Rancher HTTP request (20 seconds)
pub const RANCHER_REQUEST_TIMEOUT_SECS: u64 = 20;

/// Maximum number of attempts per Rancher request (initial try included)
pub const RANCHER_MAX_ATTEMPTS: u32 = 3;

/// Fixed backoff after the first failed attempt (250ms)
pub const RANCHER_BACKOFF_FIRST_MILLIS: u64 = 250;

/// Fixed backoff after the second failed attempt (600ms)
pub const RANCHER_BACKOFF_SECOND_MILLIS: u64 = 600;

/// Fixed backoff after the third and later failed attempts (1.2 seconds)
pub const RANCHER_BACKOFF_LATER_MILLIS: u64 = 1200;

/// Path of the Elemental machine inventory collection on the Rancher server
pub const ELEMENTAL_INVENTORY_PATH: &str = "/v1/elemental.cattle.io.machineinventories";

/// Path of the Cluster API machine collection on the Rancher server
pub const CAPI_MACHINES_PATH: &str = "/v1/cluster.x-k8s.io.machine";

/// Path of the management cluster collection on the Rancher server
pub const MANAGEMENT_CLUSTERS_PATH: &str = "/v3/clusters";

/// Action name used to request a downstream kubeconfig
pub const GENERATE_KUBECONFIG_ACTION: &str = "generateKubeconfig";

// ============================================================================
// Kubeconfig Cache Constants
// ============================================================================

/// Default freshness window for cached kubeconfigs (10 minutes)
pub const KUBECONFIG_CACHE_TTL_SECS: u64 = 600;

/// File name prefix of cached kubeconfigs
pub const KUBECONFIG_CACHE_PREFIX: &str = "kubeconfig-";

/// File name suffix of cached kubeconfigs
pub const KUBECONFIG_CACHE_SUFFIX: &str = ".yaml";

/// Number of SHA-256 digest bytes used in the cache file name
pub const KUBECONFIG_CACHE_DIGEST_BYTES: usize = 16;

// ============================================================================
// Kubernetes API Constants
// ============================================================================

/// Timeout applied to the Kubernetes client connection and reads (15 seconds)
pub const KUBE_CLIENT_TIMEOUT_SECS: u64 = 15;

/// Upper bound for a node listing call (20 seconds)
pub const KUBE_LIST_NODES_TIMEOUT_SECS: u64 = 20;

/// Upper bound for a server version query (10 seconds)
pub const KUBE_SERVER_VERSION_TIMEOUT_SECS: u64 = 10;

/// Default kubeconfig location relative to the home directory
pub const DEFAULT_KUBECONFIG_PATH: &str = ".kube/config";

/// Environment variable listing kubeconfig files
pub const KUBECONFIG_ENV: &str = "KUBECONFIG";

/// Kubeconfig source label for an explicit `--kubeconfig` path
pub const KUBECONFIG_SOURCE_FLAG: &str = "flag";

/// Kubeconfig source label for paths taken from `KUBECONFIG`
pub const KUBECONFIG_SOURCE_ENV: &str = "env";

/// Kubeconfig source label for the home directory default
pub const KUBECONFIG_SOURCE_DEFAULT: &str = "default";

/// Kubeconfig source label for kubeconfigs generated through Rancher
pub const KUBECONFIG_SOURCE_RANCHER: &str = "rancher";

/// Page size for Kubernetes list operations
pub const KUBE_LIST_PAGE_SIZE: u32 = 500;

// ============================================================================
// Matching Constants
// ============================================================================

/// Confidence of a machine-id match
pub const CONFIDENCE_MACHINE_ID: f64 = 0.98;

/// Confidence of a provider-id match
pub const CONFIDENCE_PROVIDER_ID: f64 = 0.95;

/// Confidence of an internal-ip match
pub const CONFIDENCE_INTERNAL_IP: f64 = 0.9;

/// Confidence of an external-ip match
pub const CONFIDENCE_EXTERNAL_IP: f64 = 0.85;

/// Confidence of a machine-name match
pub const CONFIDENCE_MACHINE_NAME: f64 = 0.75;

/// Confidence of a hostname match
pub const CONFIDENCE_HOSTNAME: f64 = 0.7;

/// Length of the random hex suffix appended to generated hostnames
pub const HOSTNAME_HEX_SUFFIX_LEN: usize = 8;

// ============================================================================
// Exit Codes
// ============================================================================

/// Configuration or usage error
pub const EXIT_CONFIG_ERROR: i32 = 1;

/// Remote API error (Rancher or Kubernetes)
pub const EXIT_REMOTE_ERROR: i32 = 2;

/// Matching completed but ambiguous matches are present
pub const EXIT_AMBIGUOUS: i32 = 3;

/// Interrupted by SIGINT (128 + 2)
pub const EXIT_INTERRUPTED: i32 = 130;

// ============================================================================
// Helper Functions
// ============================================================================

/// Request timeout for the Rancher HTTP client.
#[must_use]
pub const fn rancher_request_timeout() -> Duration {
    Duration::from_secs(RANCHER_REQUEST_TIMEOUT_SECS)
}

/// Default kubeconfig cache TTL.
#[must_use]
pub const fn kubeconfig_cache_ttl() -> Duration {
    Duration::from_secs(KUBECONFIG_CACHE_TTL_SECS)
}
