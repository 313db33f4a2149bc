// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for elemental-node-map.
//!
//! This module provides specialized error types for:
//! - Kubeconfig discovery and credential derivation (configuration errors)
//! - Rancher API operations (inventory, machines, clusters, kubeconfig generation)
//! - Kubernetes API operations (node listing, server version)
//! - Local kubeconfig cache I/O
//! - Result rendering
//!
//! [`AppError`] wraps all of them at the command boundary and maps each to a process
//! exit code. Matching itself is infallible and has no error type.

use crate::constants::{EXIT_AMBIGUOUS, EXIT_CONFIG_ERROR, EXIT_INTERRUPTED, EXIT_REMOTE_ERROR};
use std::path::PathBuf;
use thiserror::Error;

fn paths_suffix(paths: &[String]) -> String {
    if paths.is_empty() {
        String::new()
    } else {
        format!(" ({})", paths.join(", "))
    }
}

/// Errors caused by local configuration: kubeconfig files, flags and environment.
///
/// None of these are retried; they abort the invocation with exit code 1.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No kubeconfig file exists at any searched location
    #[error("kubeconfig not found{}", paths_suffix(.paths))]
    KubeconfigNotFound {
        /// Locations that were searched
        paths: Vec<String>,
    },

    /// A kubeconfig exists but cannot be parsed or used
    ///
    /// Also returned when the kubeconfig names no current context and none was requested.
    #[error("invalid kubeconfig{}: {reason}", paths_suffix(.paths))]
    KubeconfigInvalid {
        /// Locations the kubeconfig was loaded from
        paths: Vec<String>,
        /// Parser or client construction failure
        reason: String,
    },

    /// The requested context does not exist in the kubeconfig
    #[error("kubeconfig context not found{}: context \"{context}\" not found", paths_suffix(.paths))]
    ContextNotFound {
        /// Locations the kubeconfig was loaded from
        paths: Vec<String>,
        /// Context that was requested
        context: String,
    },

    /// Server or bearer token could not be derived from the kubeconfig
    #[error("{reason}")]
    KubeconfigCredentials {
        /// What is missing
        reason: String,
    },

    /// A required credential was supplied neither by flag, environment nor kubeconfig
    #[error("{what} is required (use {flag} or {env})")]
    MissingCredential {
        /// Human name of the credential
        what: &'static str,
        /// Command-line flag supplying it
        flag: &'static str,
        /// Environment variable supplying it
        env: &'static str,
    },

    /// Rancher URL or token missing and no kubeconfig to derive them from
    #[error("rancher URL or token missing and kubeconfig unavailable")]
    RancherCredentialsUnavailable,

    /// Nodes must be listed from a local kubeconfig but none was loaded
    #[error("kubeconfig is required to list nodes")]
    KubeconfigRequired,

    /// A URL could not be parsed or lacks scheme/host
    #[error("invalid {what} URL {url:?}: {reason}")]
    InvalidUrl {
        /// Which URL (e.g. "rancher", "kubeconfig server")
        what: &'static str,
        /// The offending value
        url: String,
        /// Parse failure
        reason: String,
    },

    /// The HTTP client could not be constructed (TLS backend initialisation)
    #[error("failed to build HTTP client: {reason}")]
    HttpClient {
        /// Builder error
        reason: String,
    },

    /// Output mode is not one of table, json, yaml
    #[error("invalid output mode: {mode}")]
    InvalidOutputMode {
        /// Value given on the command line
        mode: String,
    },

    /// A `re:`/`regex:`/`/…/` label pattern is not a valid regular expression
    #[error("invalid label regex {pattern:?}: {reason}")]
    InvalidLabelRegex {
        /// Pattern as given
        pattern: String,
        /// Compiler error
        reason: String,
    },

    /// A wildcard label pattern could not be compiled
    #[error("invalid label pattern {pattern:?}: {reason}")]
    InvalidLabelPattern {
        /// Pattern as given
        pattern: String,
        /// Compiler error
        reason: String,
    },
}

/// Errors returned by Rancher API operations.
#[derive(Error, Debug)]
pub enum RancherError {
    /// HTTP 401 from Rancher
    #[error("rancher authentication failed")]
    AuthenticationFailed,

    /// HTTP 403 from Rancher
    #[error("rancher authorization failed")]
    AuthorizationFailed,

    /// Any other non-success HTTP status
    #[error("rancher API error (status {status})")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// Connection, TLS or timeout failure before a status was received
    #[error("rancher request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A success response whose body could not be decoded
    #[error("rancher API error (status {status}): invalid response body: {reason}")]
    Decode {
        /// HTTP status code of the response
        status: u16,
        /// Decoder error
        reason: String,
    },

    /// `generateKubeconfig` answered without `config` or `kubeconfig`
    #[error("rancher kubeconfig response missing config")]
    MissingKubeconfig,

    /// No cluster identifier was given
    #[error("rancher cluster is required")]
    MissingClusterIdentifier,

    /// `generateKubeconfig` called with an empty cluster ID
    #[error("cluster ID is required")]
    MissingClusterId,

    /// No cluster has the given ID or name
    #[error("cluster {identifier:?} not found")]
    ClusterNotFound {
        /// ID or name that was looked up
        identifier: String,
    },

    /// Several clusters share the given name
    #[error("multiple clusters named {identifier:?}: {}", .ids.join(", "))]
    AmbiguousCluster {
        /// Name that was looked up
        identifier: String,
        /// IDs of every cluster with that name
        ids: Vec<String>,
    },
}

impl RancherError {
    /// Returns true if the request should be attempted again.
    ///
    /// Transport failures and 5xx responses are retried. Authentication, authorization,
    /// other 4xx statuses and undecodable bodies are not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status } => *status >= 500,
            Self::AuthenticationFailed
            | Self::AuthorizationFailed
            | Self::Decode { .. }
            | Self::MissingKubeconfig
            | Self::MissingClusterIdentifier
            | Self::MissingClusterId
            | Self::ClusterNotFound { .. }
            | Self::AmbiguousCluster { .. } => false,
        }
    }

    /// Returns true if the error comes from the caller's input rather than the server.
    #[must_use]
    pub fn is_lookup_error(&self) -> bool {
        matches!(
            self,
            Self::MissingClusterIdentifier
                | Self::MissingClusterId
                | Self::ClusterNotFound { .. }
                | Self::AmbiguousCluster { .. }
        )
    }
}

/// Classification of a Kubernetes API failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KubeErrorKind {
    /// HTTP 401
    AuthFailed,
    /// HTTP 403
    Forbidden,
    /// Network failure, DNS failure or timeout
    ClusterUnreachable,
    /// Anything else
    Unknown,
}

/// Errors returned by Kubernetes API operations.
#[derive(Error, Debug)]
pub enum KubeError {
    /// Credentials were rejected
    #[error("kubernetes authentication failed")]
    AuthFailed {
        /// Underlying client error
        #[source]
        source: kube::Error,
    },

    /// Credentials lack permission to list nodes
    #[error("kubernetes authorization failed")]
    Forbidden {
        /// Underlying client error
        #[source]
        source: kube::Error,
    },

    /// The API server could not be reached in time
    #[error("kubernetes cluster unreachable: {reason}")]
    ClusterUnreachable {
        /// Transport error or timeout description
        reason: String,
    },

    /// Any other API failure
    #[error("kubernetes API error: {source}")]
    Unknown {
        /// Underlying client error
        #[source]
        source: kube::Error,
    },
}

impl KubeError {
    /// Kind of this error.
    #[must_use]
    pub fn kind(&self) -> KubeErrorKind {
        match self {
            Self::AuthFailed { .. } => KubeErrorKind::AuthFailed,
            Self::Forbidden { .. } => KubeErrorKind::Forbidden,
            Self::ClusterUnreachable { .. } => KubeErrorKind::ClusterUnreachable,
            Self::Unknown { .. } => KubeErrorKind::Unknown,
        }
    }
}

/// Message fragments of transport failures that surface as plain errors.
const UNREACHABLE_MARKERS: &[&str] = &[
    "connection refused",
    "no such host",
    "i/o timeout",
    "context deadline exceeded",
    "dns error",
    "timed out",
];

impl From<kube::Error> for KubeError {
    fn from(err: kube::Error) -> Self {
        let status = match &err {
            kube::Error::Api(response) => Some(response.code),
            _ => None,
        };
        match status {
            Some(401) => Self::AuthFailed { source: err },
            Some(403) => Self::Forbidden { source: err },
            Some(_) => Self::Unknown { source: err },
            None if matches!(err, kube::Error::Service(_))
                || has_io_source(&err)
                || looks_unreachable(&error_chain(&err)) =>
            {
                Self::ClusterUnreachable {
                    reason: error_chain(&err),
                }
            }
            None => Self::Unknown { source: err },
        }
    }
}

/// Display of `err` followed by each of its sources, joined with `": "`.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}

/// Whether an I/O error sits anywhere in the source chain of `err`.
fn has_io_source(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        if cause.is::<std::io::Error>() {
            return true;
        }
        source = cause.source();
    }
    false
}

/// Whether an error message describes a connectivity failure.
#[must_use]
pub fn looks_unreachable(message: &str) -> bool {
    let message = message.to_lowercase();
    UNREACHABLE_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}

/// Kubeconfig cache I/O failure.
///
/// Callers log these and carry on; the cache is an optimisation only.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Reading, writing or inspecting a cache entry failed
    #[error("kubeconfig cache I/O failed for {}: {source}", .path.display())]
    Io {
        /// Cache file or directory
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Failure writing rendered output.
#[derive(Error, Debug)]
pub enum RenderError {
    /// JSON serialization failed
    #[error("failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization failed
    #[error("failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Writing to stdout failed
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level error of a command invocation.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration or usage error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Rancher API error
    #[error(transparent)]
    Rancher(#[from] RancherError),

    /// Kubernetes API error
    #[error(transparent)]
    Kube(#[from] KubeError),

    /// Output could not be written
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Matching completed but at least one host is ambiguous
    #[error("ambiguous matches present ({count} hosts)")]
    AmbiguousMatches {
        /// Number of ambiguous hosts
        count: usize,
    },

    /// The user interrupted the command
    #[error("interrupted")]
    Interrupted,
}

impl AppError {
    /// Process exit code for this error.
    ///
    /// Configuration and usage problems exit with 1, remote API failures with 2 and
    /// ambiguous matches with 3. Cluster lookups that fail because of the given
    /// identifier count as configuration errors.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Render(_) => EXIT_CONFIG_ERROR,
            Self::Rancher(err) if err.is_lookup_error() => EXIT_CONFIG_ERROR,
            Self::Rancher(_) | Self::Kube(_) => EXIT_REMOTE_ERROR,
            Self::AmbiguousMatches { .. } => EXIT_AMBIGUOUS,
            Self::Interrupted => EXIT_INTERRUPTED,
        }
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
