// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Rancher API acquisition.
//!
//! This module fetches everything the matcher needs from a Rancher server:
//!
//! - Elemental machine inventory records (the hosts)
//! - Cluster API machine records (authoritative node → machine names)
//! - Management clusters, and kubeconfigs generated for them
//!
//! # Architecture
//!
//! A [`RancherClient`] is bound to one collection URL. Listing follows `limit`-based
//! pagination, and every request goes through the fixed retry schedule in [`retry`].
//! The machine and cluster collections are derived from the inventory URL with the
//! helpers in [`urls`]. Generated kubeconfigs are cached on disk by [`KubeconfigCache`].
//!
//! # Example
//!
//! ```rust,no_run
//! use elemental_node_map::rancher::RancherClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = RancherClient::new(
//!     "https://rancher.example.com/v1/elemental.cattle.io.machineinventories",
//!     "token-abc:secret",
//!     false,
//! )?;
//! let hosts = client.list_hosts().await?;
//! println!("{} inventory records", hosts.len());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod machines;
pub mod management;
pub mod retry;
pub mod urls;

pub use cache::{CacheLookup, KubeconfigCache};
pub use client::{ListPage, RancherClient};
pub use machines::{apply_machine_names, machine_name_map};
pub use management::select_cluster;
pub use urls::{
    base_url_from_server, clusters_url, inventory_url_from_server, machines_url, resolve_next,
    with_limit,
};
