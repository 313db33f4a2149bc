// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Management cluster lookup and downstream kubeconfig generation.

use super::client::RancherClient;
use super::retry::retry_request;
use crate::constants::GENERATE_KUBECONFIG_ACTION;
use crate::errors::RancherError;
use crate::fields::GENERATED_KUBECONFIG;
use crate::normalize::normalize_cluster;
use crate::types::Cluster;
use crate::value::Field;
use reqwest::Method;
use tracing::{debug, info};
use url::Url;

/// Query parameter naming a Norman API action.
const ACTION_PARAM: &str = "action";

impl RancherClient {
    /// List all management clusters. The client must be bound to `/v3/clusters`.
    ///
    /// # Errors
    ///
    /// See [`RancherClient::list_all`].
    pub async fn list_clusters(&self) -> Result<Vec<Cluster>, RancherError> {
        let records = self.list_all("list clusters").await?;
        Ok(records.iter().map(normalize_cluster).collect())
    }

    /// Find the cluster named or identified by `identifier`.
    ///
    /// # Errors
    ///
    /// Returns a lookup error when the identifier is empty, unknown or names several
    /// clusters, or the listing error.
    pub async fn resolve_cluster(&self, identifier: &str) -> Result<Cluster, RancherError> {
        if identifier.is_empty() {
            return Err(RancherError::MissingClusterIdentifier);
        }
        let clusters = self.list_clusters().await?;
        let cluster = select_cluster(&clusters, identifier)?;
        info!(
            identifier = identifier,
            cluster_id = %cluster.id,
            cluster_name = %cluster.name,
            "Resolved Rancher cluster"
        );
        Ok(cluster)
    }

    /// Ask Rancher for a kubeconfig of the downstream cluster `cluster_id`.
    ///
    /// Issues `POST <clusters>/<id>?action=generateKubeconfig` with the usual retry
    /// policy and returns the kubeconfig text.
    ///
    /// # Errors
    ///
    /// Returns [`RancherError::MissingClusterId`] for an empty ID,
    /// [`RancherError::MissingKubeconfig`] when the response has neither `config` nor
    /// `kubeconfig`, or the request error.
    pub async fn generate_kubeconfig(&self, cluster_id: &str) -> Result<Vec<u8>, RancherError> {
        if cluster_id.is_empty() {
            return Err(RancherError::MissingClusterId);
        }
        let target = action_url(self.base_url(), cluster_id, GENERATE_KUBECONFIG_ACTION);

        let (status, body) = retry_request(
            || self.send(Method::POST, &target),
            "generate kubeconfig",
            target.as_str(),
        )
        .await?;

        let payload: Field = serde_json::from_str(&body).map_err(|e| RancherError::Decode {
            status: status.as_u16(),
            reason: e.to_string(),
        })?;
        let config = payload
            .first_text(GENERATED_KUBECONFIG)
            .ok_or(RancherError::MissingKubeconfig)?;

        debug!(cluster_id = cluster_id, bytes = config.len(), "Generated kubeconfig");
        Ok(config.into_bytes())
    }
}

/// Pick a cluster by exact ID, else by unique name.
///
/// # Errors
///
/// Returns [`RancherError::ClusterNotFound`] when nothing matches and
/// [`RancherError::AmbiguousCluster`] when several clusters share the name.
pub fn select_cluster(clusters: &[Cluster], identifier: &str) -> Result<Cluster, RancherError> {
    if let Some(cluster) = clusters.iter().find(|cluster| cluster.id == identifier) {
        return Ok(cluster.clone());
    }

    let named: Vec<&Cluster> = clusters
        .iter()
        .filter(|cluster| cluster.name == identifier)
        .collect();
    match named.as_slice() {
        [] => Err(RancherError::ClusterNotFound {
            identifier: identifier.to_string(),
        }),
        [only] => Ok((*only).clone()),
        several => Err(RancherError::AmbiguousCluster {
            identifier: identifier.to_string(),
            ids: several
                .iter()
                .filter(|cluster| !cluster.id.is_empty())
                .map(|cluster| cluster.id.clone())
                .collect(),
        }),
    }
}

/// `<base>/<resource>?action=<action>`, keeping any other query parameters.
fn action_url(base: &Url, resource: &str, action: &str) -> Url {
    let mut target = base.clone();
    let path = format!("{}/{resource}", base.path().trim_end_matches('/'));
    target.set_path(&path);

    let kept: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key != ACTION_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    target
        .query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(ACTION_PARAM, action);
    target
}

#[cfg(test)]
#[path = "management_tests.rs"]
mod management_tests;
