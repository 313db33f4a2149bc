// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes access: kubeconfig discovery, client construction and node listing.
//!
//! # Kubeconfig resolution
//!
//! The kubeconfig is taken from, in order:
//!
//! 1. the explicit `--kubeconfig` path (`~` expanded)
//! 2. the first existing entry of `KUBECONFIG`
//! 3. `~/.kube/config`
//!
//! Only one file is loaded; entries of `KUBECONFIG` are not merged. The context is the
//! requested one, else the file's `current-context`. A kubeconfig can also come from
//! memory, which is how kubeconfigs generated by Rancher are used.
//!
//! # Example
//!
//! ```rust,no_run
//! use elemental_node_map::kube_client::{KubeClient, LoadedKubeconfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let kubeconfig = LoadedKubeconfig::resolve(None, None)?;
//! let client = KubeClient::connect(&kubeconfig).await?;
//! let nodes = client.list_nodes("node-role.kubernetes.io/worker").await?;
//! println!("{} nodes", nodes.len());
//! # Ok(())
//! # }
//! ```

use crate::constants::{
    DEFAULT_KUBECONFIG_PATH, KUBECONFIG_ENV, KUBECONFIG_SOURCE_DEFAULT, KUBECONFIG_SOURCE_ENV,
    KUBECONFIG_SOURCE_FLAG, KUBE_CLIENT_TIMEOUT_SECS, KUBE_LIST_NODES_TIMEOUT_SECS,
    KUBE_LIST_PAGE_SIZE, KUBE_SERVER_VERSION_TIMEOUT_SECS,
};
use crate::errors::{ConfigError, KubeError};
use crate::normalize::normalize_node;
use crate::types::Node;
use k8s_openapi::api::core::v1::Node as KubeNode;
use kube::api::ListParams;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

#[cfg(windows)]
const PATH_LIST_SEPARATOR: &str = ";";
#[cfg(not(windows))]
const PATH_LIST_SEPARATOR: &str = ":";

/// Where a kubeconfig came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KubeconfigInfo {
    /// `flag`, `env`, `default` or `rancher`
    pub source: String,
    /// Searched locations, or a pseudo path such as `cluster:<id>`
    pub paths: Vec<String>,
    /// Selected context
    pub context: String,
}

impl KubeconfigInfo {
    /// One-line description for verbose diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        let paths = if self.paths.is_empty() {
            "(none)".to_string()
        } else {
            self.paths.join(PATH_LIST_SEPARATOR)
        };
        format!(
            "kubeconfig source={} paths={} context={}",
            self.source, paths, self.context
        )
    }
}

/// Expand a leading `~` or `~/` to the home directory. Other paths are only trimmed.
#[must_use]
pub fn expand_path(path: &str) -> String {
    let path = path.trim();
    if !path.starts_with('~') {
        return path.to_string();
    }
    let Some(home) = dirs::home_dir() else {
        return path.to_string();
    };
    if path == "~" {
        return home.display().to_string();
    }
    match path.strip_prefix("~/") {
        Some(rest) => home.join(rest).display().to_string(),
        None => path.to_string(),
    }
}

/// Source label and candidate paths for a kubeconfig lookup.
///
/// `explicit` wins over `env_value` (the raw `KUBECONFIG` value), which wins over
/// `~/.kube/config`. Empty values count as absent.
#[must_use]
pub fn kubeconfig_search_paths(
    explicit: Option<&str>,
    env_value: Option<&str>,
) -> (&'static str, Vec<String>) {
    if let Some(path) = explicit.filter(|path| !path.trim().is_empty()) {
        return (KUBECONFIG_SOURCE_FLAG, vec![expand_path(path)]);
    }
    if let Some(value) = env_value.filter(|value| !value.trim().is_empty()) {
        let paths = std::env::split_paths(value)
            .map(|path| expand_path(&path.to_string_lossy()))
            .collect();
        return (KUBECONFIG_SOURCE_ENV, paths);
    }
    let paths = dirs::home_dir()
        .map(|home| vec![home.join(DEFAULT_KUBECONFIG_PATH).display().to_string()])
        .unwrap_or_default();
    (KUBECONFIG_SOURCE_DEFAULT, paths)
}

// ============================================================================
// Kubeconfig document
// ============================================================================

/// Subset of the kubeconfig format needed to validate contexts and derive credentials.
#[derive(Debug, Default, Deserialize)]
struct KubeconfigDocument {
    #[serde(default)]
    clusters: Option<Vec<NamedCluster>>,
    #[serde(default)]
    contexts: Option<Vec<NamedContext>>,
    #[serde(default)]
    users: Option<Vec<NamedUser>>,
    #[serde(default, rename = "current-context")]
    current_context: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NamedCluster {
    name: String,
    #[serde(default)]
    cluster: Option<ClusterEntry>,
}

#[derive(Debug, Deserialize)]
struct ClusterEntry {
    #[serde(default)]
    server: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NamedContext {
    name: String,
    #[serde(default)]
    context: Option<ContextEntry>,
}

#[derive(Debug, Deserialize)]
struct ContextEntry {
    #[serde(default)]
    cluster: Option<String>,
    #[serde(default)]
    user: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NamedUser {
    name: String,
    #[serde(default)]
    user: Option<UserEntry>,
}

#[derive(Debug, Deserialize)]
struct UserEntry {
    #[serde(default)]
    token: Option<String>,
    #[serde(default, rename = "tokenFile")]
    token_file: Option<String>,
}

impl KubeconfigDocument {
    fn context(&self, name: &str) -> Option<&NamedContext> {
        self.contexts.iter().flatten().find(|ctx| ctx.name == name)
    }

    fn cluster(&self, name: &str) -> Option<&ClusterEntry> {
        self.clusters
            .iter()
            .flatten()
            .find(|cluster| cluster.name == name)
            .and_then(|cluster| cluster.cluster.as_ref())
    }

    fn user(&self, name: &str) -> Option<&UserEntry> {
        self.users
            .iter()
            .flatten()
            .find(|user| user.name == name)
            .and_then(|user| user.user.as_ref())
    }
}

/// A parsed kubeconfig with its selected context validated.
#[derive(Debug)]
pub struct LoadedKubeconfig {
    info: KubeconfigInfo,
    yaml: String,
    document: KubeconfigDocument,
}

impl LoadedKubeconfig {
    /// Resolve from the explicit path, `KUBECONFIG` or the home default.
    ///
    /// # Errors
    ///
    /// See [`LoadedKubeconfig::resolve_from`].
    pub fn resolve(explicit: Option<&str>, context: Option<&str>) -> Result<Self, ConfigError> {
        let env_value = std::env::var(KUBECONFIG_ENV).ok();
        Self::resolve_from(explicit, env_value.as_deref(), context)
    }

    /// Resolve with an explicit `KUBECONFIG` value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::KubeconfigNotFound`] when no candidate file exists, and the
    /// errors of [`LoadedKubeconfig::from_bytes`] for the first existing file.
    pub fn resolve_from(
        explicit: Option<&str>,
        env_value: Option<&str>,
        context: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let (source, paths) = kubeconfig_search_paths(explicit, env_value);
        let existing = paths
            .iter()
            .filter(|path| !path.is_empty())
            .find(|path| Path::new(path.as_str()).exists())
            .cloned();
        let Some(existing) = existing else {
            return Err(ConfigError::KubeconfigNotFound { paths });
        };

        let bytes = std::fs::read(&existing).map_err(|e| ConfigError::KubeconfigInvalid {
            paths: paths.clone(),
            reason: e.to_string(),
        })?;
        debug!(source = source, path = %existing, "Loading kubeconfig");
        Self::from_bytes(&bytes, source, paths, context)
    }

    /// Parse kubeconfig content held in memory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::KubeconfigInvalid`] when the content does not parse or no
    /// context is selected, and [`ConfigError::ContextNotFound`] when the selected
    /// context does not exist.
    pub fn from_bytes(
        bytes: &[u8],
        source: &str,
        paths: Vec<String>,
        context: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let invalid = |reason: String, paths: &[String]| ConfigError::KubeconfigInvalid {
            paths: paths.to_vec(),
            reason,
        };

        let yaml = String::from_utf8(bytes.to_vec()).map_err(|e| invalid(e.to_string(), &paths))?;
        let document: KubeconfigDocument =
            serde_yaml::from_str(&yaml).map_err(|e| invalid(e.to_string(), &paths))?;

        let context_name = context
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .or_else(|| document.current_context.clone())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| invalid("missing current context".to_string(), &paths))?;

        if document.context(&context_name).is_none() {
            return Err(ConfigError::ContextNotFound {
                paths,
                context: context_name,
            });
        }

        Ok(Self {
            info: KubeconfigInfo {
                source: source.to_string(),
                paths,
                context: context_name,
            },
            yaml,
            document,
        })
    }

    /// Source, paths and context of this kubeconfig.
    #[must_use]
    pub fn info(&self) -> &KubeconfigInfo {
        &self.info
    }

    /// Cluster server URL and bearer token of the selected context.
    ///
    /// The token comes from `token`, else from the file named by `tokenFile`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::KubeconfigCredentials`] when the server or token is missing
    /// or the token file cannot be read.
    pub fn server_and_token(&self) -> Result<(String, String), ConfigError> {
        let context_name = &self.info.context;
        let entry = self
            .document
            .context(context_name)
            .and_then(|ctx| ctx.context.as_ref());

        let server = entry
            .and_then(|ctx| ctx.cluster.as_deref())
            .and_then(|name| self.document.cluster(name))
            .and_then(|cluster| cluster.server.as_deref())
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        if server.is_empty() {
            return Err(ConfigError::KubeconfigCredentials {
                reason: format!("kubeconfig missing cluster server for context {context_name:?}"),
            });
        }

        let user = entry
            .and_then(|ctx| ctx.user.as_deref())
            .and_then(|name| self.document.user(name));
        let mut token = user
            .and_then(|user| user.token.as_deref())
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        if token.is_empty() {
            if let Some(token_file) = user
                .and_then(|user| user.token_file.as_deref())
                .filter(|file| !file.trim().is_empty())
            {
                token = read_token_file(token_file)?;
            }
        }
        if token.is_empty() {
            return Err(ConfigError::KubeconfigCredentials {
                reason: format!("kubeconfig missing bearer token for context {context_name:?}"),
            });
        }

        Ok((server, token))
    }
}

fn read_token_file(path: &str) -> Result<String, ConfigError> {
    let path = PathBuf::from(expand_path(path));
    std::fs::read_to_string(&path)
        .map(|content| content.trim().to_string())
        .map_err(|e| ConfigError::KubeconfigCredentials {
            reason: format!("failed to read kubeconfig token file: {e}"),
        })
}

// ============================================================================
// Client
// ============================================================================

/// Kubernetes API client for one cluster.
#[derive(Clone)]
pub struct KubeClient {
    client: Client,
}

impl KubeClient {
    /// Wrap an existing client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client for the selected context of `kubeconfig`.
    ///
    /// Connect and read timeouts are 15 seconds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::KubeconfigInvalid`] when the kubeconfig cannot be turned into
    /// a client configuration (bad certificates, unsupported auth, malformed server).
    pub async fn connect(kubeconfig: &LoadedKubeconfig) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::KubeconfigInvalid {
            paths: kubeconfig.info.paths.clone(),
            reason,
        };

        let raw = Kubeconfig::from_yaml(&kubeconfig.yaml).map_err(|e| invalid(e.to_string()))?;
        let options = KubeConfigOptions {
            context: Some(kubeconfig.info.context.clone()),
            ..KubeConfigOptions::default()
        };
        let mut config = Config::from_custom_kubeconfig(raw, &options)
            .await
            .map_err(|e| invalid(e.to_string()))?;
        let timeout = Duration::from_secs(KUBE_CLIENT_TIMEOUT_SECS);
        config.connect_timeout = Some(timeout);
        config.read_timeout = Some(timeout);

        let client = Client::try_from(config).map_err(|e| invalid(e.to_string()))?;
        debug!(context = %kubeconfig.info.context, "Kubernetes client initialized");
        Ok(Self { client })
    }

    /// List nodes matching `selector` (empty for all), normalized.
    ///
    /// The whole listing, all pages included, is bounded by 20 seconds. The selector is
    /// passed to the API server unparsed.
    ///
    /// # Errors
    ///
    /// Returns the classified [`KubeError`]; a timeout is
    /// [`KubeError::ClusterUnreachable`].
    pub async fn list_nodes(&self, selector: &str) -> Result<Vec<Node>, KubeError> {
        let limit = Duration::from_secs(KUBE_LIST_NODES_TIMEOUT_SECS);
        let items = tokio::time::timeout(limit, self.list_node_objects(selector.trim()))
            .await
            .map_err(|_| KubeError::ClusterUnreachable {
                reason: format!("node listing timed out after {}s", limit.as_secs()),
            })??;
        Ok(items.iter().map(normalize_node).collect())
    }

    async fn list_node_objects(&self, selector: &str) -> Result<Vec<KubeNode>, KubeError> {
        let api: Api<KubeNode> = Api::all(self.client.clone());
        let mut params = ListParams::default().limit(KUBE_LIST_PAGE_SIZE);
        if !selector.is_empty() {
            params = params.labels(selector);
        }

        let mut nodes = Vec::new();
        let mut page_count = 0;
        loop {
            page_count += 1;
            let page = api.list(&params).await?;
            let item_count = page.items.len();
            nodes.extend(page.items);

            debug!(
                page = page_count,
                items_in_page = item_count,
                total_items = nodes.len(),
                "Fetched node page from Kubernetes API"
            );

            match page.metadata.continue_.filter(|token| !token.is_empty()) {
                Some(token) => params.continue_token = Some(token),
                None => break,
            }
        }
        Ok(nodes)
    }

    /// API server version as `major.minor`, bounded by 10 seconds.
    ///
    /// # Errors
    ///
    /// Returns the classified [`KubeError`].
    pub async fn server_version(&self) -> Result<String, KubeError> {
        let limit = Duration::from_secs(KUBE_SERVER_VERSION_TIMEOUT_SECS);
        let info = tokio::time::timeout(limit, self.client.apiserver_version())
            .await
            .map_err(|_| KubeError::ClusterUnreachable {
                reason: format!("server version query timed out after {}s", limit.as_secs()),
            })??;
        Ok(format!("{}.{}", info.major, info.minor))
    }
}

#[cfg(test)]
#[path = "kube_client_tests.rs"]
mod kube_client_tests;
