// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # elemental-node-map - Elemental inventory to Kubernetes node matching
//!
//! elemental-node-map reconciles the machine inventory kept by Rancher Elemental with
//! the nodes a Kubernetes API server reports, producing one identity-matched view for
//! fleet audits.
//!
//! ## Overview
//!
//! This library provides:
//!
//! - Concurrent acquisition of inventory hosts, Cluster API machines and nodes, with
//!   retry, pagination and a kubeconfig cache for Rancher-managed clusters
//! - Normalization of schema-drifted inventory records into canonical [`types::Host`]s
//! - Cascading identity matching with fixed confidences and ambiguity detection
//! - Table, JSON and YAML rendering of the result
//!
//! ## Modules
//!
//! - [`value`] - Path lookups and scalar coercion over decoded JSON
//! - [`canonical`] - Canonical forms of IDs, hostnames, IPs and machine names
//! - [`normalize`] - Raw records to [`types::Host`], [`types::Node`] and friends
//! - [`rancher`] - Rancher API client, URL derivation and kubeconfig cache
//! - [`kube_client`] - Kubeconfig resolution and node listing
//! - [`fetch`] - Concurrent fleet acquisition
//! - [`index`] / [`matcher`] - Node lookup tables and the matching cascade
//! - [`output`] - Result rendering
//!
//! ## Example
//!
//! ```rust
//! use elemental_node_map::matcher::{match_fleet, Method};
//! use elemental_node_map::types::{Host, Node};
//!
//! let nodes = vec![Node {
//!     name: "worker-1".to_string(),
//!     machine_id: "4f3c0e".to_string(),
//!     ..Default::default()
//! }];
//! let hosts = vec![Host {
//!     id: "mi-1".to_string(),
//!     machine_id: "4F3C0E".to_string(),
//!     ..Default::default()
//! }];
//!
//! let result = match_fleet(&hosts, &nodes);
//! assert_eq!(result.matches.len(), 1);
//! assert_eq!(result.matches[0].method, Method::MachineId);
//! ```

pub mod canonical;
pub mod cli;
pub mod commands;
pub mod constants;
pub mod errors;
pub mod fetch;
pub mod fields;
pub mod index;
pub mod kube_client;
pub mod label_filter;
pub mod labels;
pub mod matcher;
pub mod normalize;
pub mod output;
pub mod rancher;
pub mod types;
pub mod value;
