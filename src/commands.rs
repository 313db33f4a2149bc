// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Subcommand implementations.
//!
//! Each command resolves its inputs, fetches what it needs and renders to the given
//! writer. Remote work finishes before anything is written, so an interrupted command
//! leaves no partial output behind.

use crate::cli::{
    Cli, Command, GlobalArgs, LabelsCommand, MatchArgs, NodesArgs, INSECURE_TLS_ENV,
};
use crate::errors::{AppError, ConfigError};
use crate::fetch::{fetch_fleet, list_cluster_nodes, list_source_nodes, Fleet, NodeListing};
use crate::kube_client::{KubeClient, LoadedKubeconfig};
use crate::label_filter::{
    count_label_keys, count_label_values, expand_label_keys, filter_nodes, parse_label_patterns,
};
use crate::matcher::match_fleet;
use crate::output::{
    render_label_keys, render_label_values, render_match, render_nodes, MatchOptions, Mode,
    NodesOptions,
};
use crate::rancher::{
    clusters_url, inventory_url_from_server, machines_url, KubeconfigCache, RancherClient,
};
use crate::types::Node;
use std::io::Write;
use tracing::{debug, info};

/// Run the parsed command line.
///
/// # Errors
///
/// Returns the command's [`AppError`]; its exit code is the process exit code.
pub async fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<(), AppError> {
    match &cli.command {
        Command::Match(args) => run_match(&cli.global, args, out).await,
        Command::Nodes(args) => run_nodes(&cli.global, args, out).await,
        Command::Labels { command } => run_labels(&cli.global, command, out).await,
    }
}

/// Load the local kubeconfig selected by the global flags.
fn load_kubeconfig(global: &GlobalArgs) -> Result<LoadedKubeconfig, ConfigError> {
    let loaded = LoadedKubeconfig::resolve(global.kubeconfig.as_deref(), global.context.as_deref())?;
    info!("{}", loaded.info().describe());
    Ok(loaded)
}

/// Connect with the local kubeconfig, logging the server version when verbose.
async fn connect_local(global: &GlobalArgs) -> Result<KubeClient, AppError> {
    let kubeconfig = load_kubeconfig(global)?;
    let client = KubeClient::connect(&kubeconfig).await?;
    if global.verbose {
        match client.server_version().await {
            Ok(version) => info!(version = %version, "Kubernetes server version"),
            Err(e) => debug!(error = %e, "Kubernetes server version unavailable"),
        }
    }
    Ok(client)
}

/// Nodes listed with a local kubeconfig.
async fn list_local_nodes(
    kubeconfig: &LoadedKubeconfig,
    selector: &str,
) -> Result<NodeListing, AppError> {
    let client = KubeClient::connect(kubeconfig).await?;
    list_source_nodes(&client, selector).await
}

/// Rancher URL and token from flags/environment, falling back to the kubeconfig.
fn rancher_credentials(
    args: &MatchArgs,
    kubeconfig: Option<&LoadedKubeconfig>,
) -> Result<(String, String), ConfigError> {
    let mut url = args.rancher_url().map(str::to_string);
    let mut token = args.rancher_token().map(str::to_string);

    if url.is_none() || token.is_none() {
        let kubeconfig = kubeconfig.ok_or(ConfigError::RancherCredentialsUnavailable)?;
        let (server, kube_token) = kubeconfig.server_and_token()?;
        if url.is_none() {
            let derived = inventory_url_from_server(&server)?;
            info!(url = %derived, "Rancher URL derived from kubeconfig");
            url = Some(derived);
        }
        if token.is_none() {
            info!("Rancher token taken from kubeconfig");
            token = Some(kube_token);
        }
    }

    let url = url
        .filter(|url| !url.is_empty())
        .ok_or(ConfigError::MissingCredential {
            what: "rancher URL",
            flag: "--rancher-url",
            env: "RANCHER_URL",
        })?;
    let token = token
        .filter(|token| !token.is_empty())
        .ok_or(ConfigError::MissingCredential {
            what: "rancher token",
            flag: "--rancher-token",
            env: "RANCHER_TOKEN",
        })?;
    Ok((url, token))
}

/// `match`: fetch inventory and nodes, match them and render the result.
///
/// # Errors
///
/// Returns configuration, remote and render errors, and
/// [`AppError::AmbiguousMatches`] after rendering when any host is ambiguous.
pub async fn run_match<W: Write>(
    global: &GlobalArgs,
    args: &MatchArgs,
    out: &mut W,
) -> Result<(), AppError> {
    let mode = Mode::parse(&args.output)?;
    let patterns = parse_label_patterns(&args.labels);
    let cluster = args.rancher_cluster();

    let needs_kubeconfig =
        cluster.is_none() || args.rancher_url().is_none() || args.rancher_token().is_none();
    let kubeconfig = if needs_kubeconfig {
        Some(load_kubeconfig(global)?)
    } else {
        None
    };
    let (url, token) = rancher_credentials(args, kubeconfig.as_ref())?;
    let insecure = args.insecure_tls(std::env::var(INSECURE_TLS_ENV).ok().as_deref());
    let inventory = RancherClient::new(&url, &token, insecure)?;
    let selector = args.selector.trim();

    let fleet: Fleet = match cluster {
        Some(identifier) => {
            let machines = inventory.with_base_url(machines_url(&url)?);
            let management = inventory.with_base_url(clusters_url(&url)?);
            let cache = KubeconfigCache::user_default();
            let nodes = list_cluster_nodes(
                &management,
                &cache,
                identifier,
                global.context.as_deref(),
                selector,
            );
            fetch_fleet(&inventory, Some(&machines), nodes).await?
        }
        None => {
            let kubeconfig = kubeconfig.as_ref().ok_or(ConfigError::KubeconfigRequired)?;
            fetch_fleet(&inventory, None, list_local_nodes(kubeconfig, selector)).await?
        }
    };

    let nodes = filter_nodes(fleet.nodes, &patterns)?;
    let result = match_fleet(&fleet.hosts, &nodes);

    let opts = MatchOptions {
        show_unmatched: args.show_unmatched,
        explain: args.explain,
        wide: args.wide,
        mode,
        cluster_name: fleet
            .cluster
            .as_ref()
            .map(|cluster| cluster.display_name().to_string())
            .unwrap_or_default(),
    };
    render_match(out, &result, &opts)?;

    if result.ambiguous.is_empty() {
        Ok(())
    } else {
        Err(AppError::AmbiguousMatches {
            count: result.ambiguous.len(),
        })
    }
}

/// `nodes`: list nodes of the local kubeconfig's cluster.
///
/// # Errors
///
/// Returns configuration, remote and render errors.
pub async fn run_nodes<W: Write>(
    global: &GlobalArgs,
    args: &NodesArgs,
    out: &mut W,
) -> Result<(), AppError> {
    let mode = Mode::parse(&args.output)?;
    let client = connect_local(global).await?;
    let nodes = client.list_nodes(args.selector.trim()).await?;

    let patterns = parse_label_patterns(&args.label_keys);
    let label_keys = if patterns.is_empty() {
        patterns
    } else {
        expand_label_keys(&nodes, &patterns)?
    };

    let opts = NodesOptions {
        show_labels: args.labels,
        label_keys,
        wide: args.wide,
        mode,
    };
    render_nodes(out, &nodes, &opts)?;
    Ok(())
}

/// `labels keys` and `labels values <key>`: label usage across all nodes.
///
/// # Errors
///
/// Returns configuration, remote and render errors.
pub async fn run_labels<W: Write>(
    global: &GlobalArgs,
    command: &LabelsCommand,
    out: &mut W,
) -> Result<(), AppError> {
    let output = match command {
        LabelsCommand::Keys { output } | LabelsCommand::Values { output, .. } => output,
    };
    let mode = Mode::parse(output)?;
    let client = connect_local(global).await?;
    let nodes: Vec<Node> = client.list_nodes("").await?;

    match command {
        LabelsCommand::Keys { .. } => render_label_keys(out, &count_label_keys(&nodes), mode)?,
        LabelsCommand::Values { key, .. } => {
            render_label_values(out, key, &count_label_values(&nodes, key), mode)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod commands_tests;
