// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Command-line interface definition.

use crate::constants::EXIT_CONFIG_ERROR;
use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};

/// Environment variable enabling insecure TLS towards Rancher when set to `true` or `1`.
pub const INSECURE_TLS_ENV: &str = "RANCHER_INSECURE_SKIP_TLS_VERIFY";

/// Process exit code for a failed command-line parse.
///
/// `--help` and `--version` exit 0; every usage error is a configuration error.
#[must_use]
pub fn parse_error_exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => EXIT_CONFIG_ERROR,
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "elemental-node-map",
    version,
    about = "Match Elemental inventory hosts with Kubernetes nodes"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags accepted by every subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Path to kubeconfig file
    #[arg(long, global = true)]
    pub kubeconfig: Option<String>,

    /// Kubeconfig context to use
    #[arg(long, global = true)]
    pub context: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Match inventory hosts with Kubernetes nodes
    Match(MatchArgs),

    /// List Kubernetes nodes
    Nodes(NodesArgs),

    /// Explore node label usage
    Labels {
        #[command(subcommand)]
        command: LabelsCommand,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct MatchArgs {
    /// Rancher inventory API URL
    #[arg(long, env = "RANCHER_URL")]
    pub rancher_url: Option<String>,

    /// Rancher API bearer token
    #[arg(long, env = "RANCHER_TOKEN", hide_env_values = true)]
    pub rancher_token: Option<String>,

    /// Downstream cluster name or ID (resolved via Rancher)
    #[arg(long, env = "RANCHER_CLUSTER")]
    pub rancher_cluster: Option<String>,

    /// Label selector to filter nodes
    #[arg(long, default_value = "")]
    pub selector: String,

    /// Filter nodes by label key/value (comma-separated, supports * or /regex/)
    #[arg(long, default_value = "")]
    pub labels: String,

    /// Show unmatched hosts and nodes
    #[arg(long)]
    pub show_unmatched: bool,

    /// Include match explanations
    #[arg(long)]
    pub explain: bool,

    /// Show wide output
    #[arg(long)]
    pub wide: bool,

    /// Output format: table|json|yaml
    #[arg(long, default_value = "table")]
    pub output: String,

    /// Skip TLS verification for Rancher
    #[arg(long)]
    pub insecure_skip_tls_verify: bool,
}

impl MatchArgs {
    /// Rancher URL, `None` when unset or blank.
    #[must_use]
    pub fn rancher_url(&self) -> Option<&str> {
        non_empty(self.rancher_url.as_deref())
    }

    /// Rancher token, `None` when unset or blank.
    #[must_use]
    pub fn rancher_token(&self) -> Option<&str> {
        non_empty(self.rancher_token.as_deref())
    }

    /// Rancher cluster identifier, `None` when unset or blank.
    #[must_use]
    pub fn rancher_cluster(&self) -> Option<&str> {
        non_empty(self.rancher_cluster.as_deref())
    }

    /// Whether to skip TLS verification: the flag, or `env_value` of `true`/`1`.
    #[must_use]
    pub fn insecure_tls(&self, env_value: Option<&str>) -> bool {
        self.insecure_skip_tls_verify || matches!(env_value, Some("true" | "1"))
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct NodesArgs {
    /// Label selector to filter nodes
    #[arg(long, default_value = "")]
    pub selector: String,

    /// Show all labels in output
    #[arg(long)]
    pub labels: bool,

    /// Comma-separated label keys or patterns (exact key, * wildcard, or /regex/)
    #[arg(long, default_value = "")]
    pub label_keys: String,

    /// Show wide output
    #[arg(long)]
    pub wide: bool,

    /// Output format: table|json|yaml
    #[arg(long, default_value = "table")]
    pub output: String,
}

#[derive(Debug, Subcommand)]
pub enum LabelsCommand {
    /// List node label keys
    Keys {
        /// Output format: table|json|yaml
        #[arg(long, default_value = "table")]
        output: String,
    },

    /// List values for a label key
    Values {
        /// Label key
        key: String,

        /// Output format: table|json|yaml
        #[arg(long, default_value = "table")]
        output: String,
    },
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod cli_tests;
