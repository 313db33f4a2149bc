// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Concurrent acquisition of hosts, nodes and machine enrichment.
//!
//! Inventory hosts, the optional Cluster API machine listing and the node listing are
//! polled concurrently on the calling task. A host or node failure aborts the fetch and
//! drops the sibling futures, cancelling their in-flight requests. A machine failure
//! only skips enrichment. Enrichment is applied after the node listing completed.

use crate::constants::KUBECONFIG_SOURCE_RANCHER;
use crate::errors::{AppError, KubeError, RancherError};
use crate::kube_client::{KubeClient, LoadedKubeconfig};
use crate::rancher::{apply_machine_names, machine_name_map, KubeconfigCache, RancherClient};
use crate::types::{Cluster, Host, Machine, Node};
use async_trait::async_trait;
use std::future::Future;
use tracing::{debug, info};

/// Lists Elemental inventory hosts.
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// All inventory hosts, normalized.
    async fn list_hosts(&self) -> Result<Vec<Host>, RancherError>;
}

/// Lists Cluster API machines.
#[async_trait]
pub trait MachineSource: Send + Sync {
    /// All machines, normalized.
    async fn list_machines(&self) -> Result<Vec<Machine>, RancherError>;
}

/// Lists Kubernetes nodes.
#[async_trait]
pub trait NodeSource: Send + Sync {
    /// Nodes matching `selector` (empty for all), normalized.
    async fn list_nodes(&self, selector: &str) -> Result<Vec<Node>, KubeError>;
}

#[async_trait]
impl InventorySource for RancherClient {
    async fn list_hosts(&self) -> Result<Vec<Host>, RancherError> {
        RancherClient::list_hosts(self).await
    }
}

#[async_trait]
impl MachineSource for RancherClient {
    async fn list_machines(&self) -> Result<Vec<Machine>, RancherError> {
        RancherClient::list_machines(self).await
    }
}

#[async_trait]
impl NodeSource for KubeClient {
    async fn list_nodes(&self, selector: &str) -> Result<Vec<Node>, KubeError> {
        KubeClient::list_nodes(self, selector).await
    }
}

/// Nodes of one cluster, with the Rancher cluster they were listed from.
#[derive(Debug, Clone, Default)]
pub struct NodeListing {
    /// Listed nodes
    pub nodes: Vec<Node>,
    /// Rancher cluster, when the kubeconfig was generated through Rancher
    pub cluster: Option<Cluster>,
}

/// Everything the matcher needs.
#[derive(Debug, Clone, Default)]
pub struct Fleet {
    /// Inventory hosts
    pub hosts: Vec<Host>,
    /// Kubernetes nodes, enriched with machine names when available
    pub nodes: Vec<Node>,
    /// Rancher cluster the nodes belong to
    pub cluster: Option<Cluster>,
}

/// List nodes from `source` without a Rancher cluster.
///
/// # Errors
///
/// Returns the node listing error.
pub async fn list_source_nodes(
    source: &dyn NodeSource,
    selector: &str,
) -> Result<NodeListing, AppError> {
    let nodes = source.list_nodes(selector).await?;
    Ok(NodeListing {
        nodes,
        cluster: None,
    })
}

/// List the nodes of the downstream cluster `identifier` through a Rancher-generated
/// kubeconfig.
///
/// The cluster is resolved through `management` (bound to `/v3/clusters`), its kubeconfig
/// taken from `cache` or generated, and the selected `context` (default: the generated
/// file's current context) is used to list nodes.
///
/// # Errors
///
/// Returns cluster lookup, kubeconfig generation, kubeconfig parsing and node listing
/// errors.
pub async fn list_cluster_nodes(
    management: &RancherClient,
    cache: &KubeconfigCache,
    identifier: &str,
    context: Option<&str>,
    selector: &str,
) -> Result<NodeListing, AppError> {
    let cluster = management.resolve_cluster(identifier).await?;
    let key = KubeconfigCache::key(management.base_url().as_str(), &cluster.id);
    let bytes = cache
        .get_or_generate(&key, || management.generate_kubeconfig(&cluster.id))
        .await?;

    let kubeconfig = LoadedKubeconfig::from_bytes(
        &bytes,
        KUBECONFIG_SOURCE_RANCHER,
        vec![format!("cluster:{}", cluster.id)],
        context,
    )?;
    info!(
        cluster = %cluster.name,
        "{}",
        kubeconfig.info().describe()
    );

    let client = KubeClient::connect(&kubeconfig).await?;
    let nodes = NodeSource::list_nodes(&client, selector).await?;
    Ok(NodeListing {
        nodes,
        cluster: Some(cluster),
    })
}

/// Fetch hosts, nodes and (optionally) machines concurrently.
///
/// `machines` enables enrichment: machine names of the listing's cluster overwrite the
/// nodes' derived machine names.
///
/// # Errors
///
/// Returns the first host or node error; machine errors are logged and ignored.
pub async fn fetch_fleet<F>(
    inventory: &dyn InventorySource,
    machines: Option<&dyn MachineSource>,
    nodes: F,
) -> Result<Fleet, AppError>
where
    F: Future<Output = Result<NodeListing, AppError>>,
{
    let hosts = async { inventory.list_hosts().await.map_err(AppError::from) };
    let machines = async {
        let Some(source) = machines else {
            return Ok::<_, AppError>(None);
        };
        match source.list_machines().await {
            Ok(machines) => Ok(Some(machines)),
            Err(e) => {
                info!(error = %e, "Rancher machine lookup skipped");
                Ok(None)
            }
        }
    };

    let (hosts, listing, machines) = futures::try_join!(hosts, nodes, machines)?;
    let NodeListing { mut nodes, cluster } = listing;

    if let Some(machines) = machines {
        let cluster_name = cluster.as_ref().map_or("", |cluster| cluster.name.as_str());
        let names = machine_name_map(&machines, cluster_name);
        if !names.is_empty() {
            apply_machine_names(&mut nodes, &names);
        }
    }

    debug!(hosts = hosts.len(), nodes = nodes.len(), "Fetched fleet");
    Ok(Fleet {
        hosts,
        nodes,
        cluster,
    })
}

#[cfg(test)]
#[path = "fetch_tests.rs"]
mod fetch_tests;
