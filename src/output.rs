// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Rendering of match results, node listings and label counts.
//!
//! Every renderer writes to a caller-supplied [`Write`] so commands print to stdout
//! and tests capture into a buffer. Tables are padded by hand and coloured with
//! `colored`; setting `NO_COLOR` to any non-empty value turns colours off.

use crate::errors::{ConfigError, RenderError};
use crate::matcher::{HostMatch, MatchResult, Method};
use crate::types::{Host, Node};
use colored::{Color, ColoredString, Colorize};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{IsTerminal, Write};

/// Placeholder shown for empty cells.
const DASH: &str = "-";

/// Gap between table columns.
const COLUMN_GAP: &str = "  ";

/// Output format selected with `--output`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Human-readable tables
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
}

impl Mode {
    /// Parse an `--output` value; the empty string selects the table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOutputMode`] for anything other than `table`,
    /// `json`, `yaml` or empty.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw {
            "" | "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "yaml" => Ok(Self::Yaml),
            other => Err(ConfigError::InvalidOutputMode {
                mode: other.to_string(),
            }),
        }
    }
}

/// Whether tables may be coloured: stdout is a terminal and `NO_COLOR` is unset or empty.
#[must_use]
pub fn colors_enabled(no_color: Option<&str>, stdout_is_terminal: bool) -> bool {
    stdout_is_terminal && no_color.is_none_or(str::is_empty)
}

/// Disable colours for piped output or when `NO_COLOR` is set to a non-empty value.
pub fn init_styles() {
    let no_color = std::env::var("NO_COLOR").ok();
    if !colors_enabled(no_color.as_deref(), std::io::stdout().is_terminal()) {
        colored::control::set_override(false);
    }
}

/// Write `value` as indented JSON followed by a newline.
///
/// # Errors
///
/// Returns [`RenderError`] if serialization or writing fails.
pub fn emit_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<(), RenderError> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Write `value` as a YAML document.
///
/// # Errors
///
/// Returns [`RenderError`] if serialization or writing fails.
pub fn emit_yaml<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<(), RenderError> {
    serde_yaml::to_writer(out, value)?;
    Ok(())
}

fn emit<W: Write, T: Serialize + ?Sized>(
    out: &mut W,
    mode: Mode,
    value: &T,
    table: impl FnOnce(&mut W) -> Result<(), RenderError>,
) -> Result<(), RenderError> {
    match mode {
        Mode::Json => emit_json(out, value),
        Mode::Yaml => emit_yaml(out, value),
        Mode::Table => {
            init_styles();
            table(out)
        }
    }
}

fn value_or_dash(value: &str) -> &str {
    if value.is_empty() {
        DASH
    } else {
        value
    }
}

fn width(text: &str) -> usize {
    text.chars().count()
}

fn pad(text: &str, target: usize) -> String {
    format!("{text}{}", " ".repeat(target.saturating_sub(width(text))))
}

// ============================================================================
// Tables
// ============================================================================

/// Status badge in the first column of a match row.
#[derive(Debug, Clone, Copy)]
enum Badge {
    Matched,
    Ambiguous,
}

impl Badge {
    fn label(self) -> &'static str {
        match self {
            Self::Matched => " MATCHED ",
            Self::Ambiguous => " AMBIG ",
        }
    }

    fn paint(self) -> ColoredString {
        match self {
            Self::Matched => self.label().black().on_green().bold(),
            Self::Ambiguous => self.label().black().on_yellow().bold(),
        }
    }
}

#[derive(Debug, Default)]
struct Row {
    badge: Option<Badge>,
    cells: Vec<String>,
}

/// Left-aligned text table.
#[derive(Debug, Default)]
struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, cells: Vec<String>) {
        self.rows.push(Row { badge: None, cells });
    }

    fn push_badged(&mut self, badge: Badge, cells: Vec<String>) {
        let mut row = vec![badge.label().to_string()];
        row.extend(cells);
        self.rows.push(Row {
            badge: Some(badge),
            cells: row,
        });
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| width(c)).collect();
        for row in &self.rows {
            for (i, cell) in row.cells.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(width(cell));
                }
            }
        }
        widths
    }

    fn render<W: Write>(&self, out: &mut W) -> Result<(), RenderError> {
        let widths = self.widths();

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(column, w)| pad(column, *w).bold().cyan().to_string())
            .collect();
        writeln!(out, "{}", header.join(COLUMN_GAP).trim_end())?;

        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(out, "{}", rule.join(COLUMN_GAP).dimmed())?;

        for row in &self.rows {
            let cells: Vec<String> = row
                .cells
                .iter()
                .zip(&widths)
                .enumerate()
                .map(|(i, (cell, w))| match row.badge {
                    Some(badge) if i == 0 => {
                        let fill = " ".repeat(w.saturating_sub(width(cell)));
                        format!("{}{fill}", badge.paint())
                    }
                    _ => pad(cell, *w),
                })
                .collect();
            writeln!(out, "{}", cells.join(COLUMN_GAP).trim_end())?;
        }
        Ok(())
    }
}

fn section_title<W: Write>(out: &mut W, title: &str) -> Result<(), RenderError> {
    writeln!(out)?;
    writeln!(out, "{}", title.bold().bright_cyan())?;
    Ok(())
}

// ============================================================================
// Match results
// ============================================================================

/// Options of the `match` renderer.
#[derive(Debug, Clone, Default)]
pub struct MatchOptions {
    /// Also list unmatched hosts and nodes (table only)
    pub show_unmatched: bool,
    /// Include candidate explanations
    pub explain: bool,
    /// Add identifier columns (table only)
    pub wide: bool,
    /// Output format
    pub mode: Mode,
    /// Downstream cluster name, empty when nodes came from a local kubeconfig
    pub cluster_name: String,
}

/// Partition sizes of a match result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    /// Hosts with one candidate
    pub matched: usize,
    /// Hosts with several candidates
    pub ambiguous: usize,
    /// Hosts without candidates
    pub unmatched_hosts: usize,
    /// Nodes no host points at
    pub unmatched_nodes: usize,
}

impl MatchSummary {
    /// Counts of `result`.
    #[must_use]
    pub fn of(result: &MatchResult) -> Self {
        Self {
            matched: result.matches.len(),
            ambiguous: result.ambiguous.len(),
            unmatched_hosts: result.unmatched_hosts.len(),
            unmatched_nodes: result.unmatched_nodes.len(),
        }
    }
}

/// JSON/YAML document of a match run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOutput<'a> {
    /// Cluster name, omitted when empty
    #[serde(skip_serializing_if = "str::is_empty")]
    pub cluster: &'a str,
    /// Partition sizes
    pub summary: MatchSummary,
    /// Unique matches
    pub matches: Vec<MatchPayload<'a>>,
    /// Ambiguous matches
    pub ambiguous: Vec<MatchPayload<'a>>,
    /// Hosts without candidates
    pub unmatched_hosts: &'a [Host],
    /// Nodes no host points at
    pub unmatched_nodes: &'a [Node],
}

/// One host entry of [`MatchOutput`].
#[derive(Debug, Serialize)]
pub struct MatchPayload<'a> {
    /// Inventory host
    pub host: &'a Host,
    /// Candidate nodes
    pub candidates: Vec<CandidatePayload<'a>>,
    /// Method of the first candidate
    pub method: Method,
    /// Confidence of the first candidate
    pub confidence: f64,
}

/// One candidate of a [`MatchPayload`].
#[derive(Debug, Serialize)]
pub struct CandidatePayload<'a> {
    /// Candidate node
    pub node: &'a Node,
    /// Method that found it
    pub method: Method,
    /// Confidence of the method
    pub confidence: f64,
    /// Present only when explanations were requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<&'a str>,
}

impl<'a> MatchOutput<'a> {
    /// Build the serializable document for `result`.
    #[must_use]
    pub fn new(result: &'a MatchResult, explain: bool, cluster: &'a str) -> Self {
        Self {
            cluster,
            summary: MatchSummary::of(result),
            matches: payloads(&result.matches, explain),
            ambiguous: payloads(&result.ambiguous, explain),
            unmatched_hosts: &result.unmatched_hosts,
            unmatched_nodes: &result.unmatched_nodes,
        }
    }
}

fn payloads(entries: &[HostMatch], explain: bool) -> Vec<MatchPayload<'_>> {
    entries
        .iter()
        .map(|entry| MatchPayload {
            host: &entry.host,
            candidates: entry
                .candidates
                .iter()
                .map(|candidate| CandidatePayload {
                    node: &candidate.node,
                    method: candidate.method,
                    confidence: candidate.confidence,
                    explanation: (explain && !candidate.explanation.is_empty())
                        .then_some(candidate.explanation.as_str()),
                })
                .collect(),
            method: entry.method,
            confidence: entry.confidence,
        })
        .collect()
}

/// Render a match result.
///
/// # Errors
///
/// Returns [`RenderError`] if serialization or writing fails.
pub fn render_match<W: Write>(
    out: &mut W,
    result: &MatchResult,
    opts: &MatchOptions,
) -> Result<(), RenderError> {
    let document = MatchOutput::new(result, opts.explain, &opts.cluster_name);
    emit(out, opts.mode, &document, |out| {
        render_match_table(out, result, opts)
    })
}

fn render_match_table<W: Write>(
    out: &mut W,
    result: &MatchResult,
    opts: &MatchOptions,
) -> Result<(), RenderError> {
    render_summary_box(out, &MatchSummary::of(result), &opts.cluster_name)?;
    writeln!(
        out,
        "{}",
        "Legend: Elemental Host = inventory record from Rancher Elemental.".dimmed()
    )?;
    writeln!(
        out,
        "{}",
        "        Rancher Machine = machine resource name; K8s Node = downstream Kubernetes node."
            .dimmed()
    )?;

    if result.matches.is_empty() && result.ambiguous.is_empty() {
        writeln!(out)?;
        writeln!(
            out,
            "No matches found between Elemental inventory and Kubernetes nodes."
        )?;
    } else {
        section_title(out, "Matches")?;
        matches_table(result, opts).render(out)?;
    }

    if !opts.show_unmatched {
        return Ok(());
    }
    if !result.unmatched_hosts.is_empty() {
        section_title(out, "Unmatched Hosts")?;
        unmatched_hosts_table(&result.unmatched_hosts, opts).render(out)?;
    }
    if !result.unmatched_nodes.is_empty() {
        section_title(out, "Unmatched Nodes")?;
        unmatched_nodes_table(&result.unmatched_nodes, opts).render(out)?;
    }
    Ok(())
}

fn render_summary_box<W: Write>(
    out: &mut W,
    summary: &MatchSummary,
    cluster_name: &str,
) -> Result<(), RenderError> {
    // (plain text, styled text) per line; plain text drives the padding
    let mut lines: Vec<(String, String)> = Vec::new();
    if !cluster_name.is_empty() {
        lines.push((
            format!("Cluster: {cluster_name}"),
            format!("{}{}", "Cluster: ".dimmed(), cluster_name.bright_cyan()),
        ));
    }

    let stats = [
        ("Matched", summary.matched, Color::BrightGreen),
        ("Ambiguous", summary.ambiguous, Color::BrightYellow),
        ("Unmatched Hosts", summary.unmatched_hosts, Color::BrightRed),
        ("Unmatched Nodes", summary.unmatched_nodes, Color::BrightRed),
    ];
    let plain: Vec<String> = stats
        .iter()
        .map(|(label, count, _)| format!("{label}: {count}"))
        .collect();
    let styled: Vec<String> = stats
        .iter()
        .zip(&plain)
        .map(|((_, _, color), text)| text.color(*color).bold().to_string())
        .collect();
    lines.push((plain.join(COLUMN_GAP), styled.join(COLUMN_GAP)));

    let title = " elemental-node-map match ";
    let inner = lines
        .iter()
        .map(|(plain, _)| width(plain) + 2)
        .max()
        .unwrap_or(0)
        .max(width(title) + 2);
    let left = (inner - width(title)) / 2;
    let right = inner - width(title) - left;

    writeln!(
        out,
        "{}{}{}",
        format!("+{}", "-".repeat(left)).bright_cyan(),
        title.bright_cyan().bold(),
        format!("{}+", "-".repeat(right)).bright_cyan()
    )?;
    for (plain, styled) in &lines {
        let fill = " ".repeat(inner - 1 - width(plain));
        writeln!(out, "{} {styled}{fill}{}", "|".bright_cyan(), "|".bright_cyan())?;
    }
    writeln!(out, "{}", format!("+{}+", "-".repeat(inner)).bright_cyan())?;
    Ok(())
}

/// Label of a host in tables: machine name, hostname, ID, UID, else `(unknown)`.
#[must_use]
pub fn host_label(host: &Host) -> &str {
    host.display_name().unwrap_or("(unknown)")
}

fn node_identity_cells(node: &Node) -> [String; 3] {
    [
        value_or_dash(node.primary_external_ip()).to_string(),
        value_or_dash(&node.provider_id).to_string(),
        value_or_dash(&node.machine_id).to_string(),
    ]
}

fn matches_table(result: &MatchResult, opts: &MatchOptions) -> Table {
    let mut columns = vec![
        "Status",
        "Elemental Host",
        "Rancher Machine",
        "K8s Node",
        "Match Method",
        "Confidence",
        "K8s InternalIP",
    ];
    if opts.wide {
        columns.extend(["K8s ExternalIP", "K8s ProviderID", "K8s MachineID"]);
    }
    if opts.explain {
        columns.push("Why");
    }
    let mut table = Table::new(columns);

    let sections = [
        (Badge::Matched, &result.matches),
        (Badge::Ambiguous, &result.ambiguous),
    ];
    for (badge, entries) in sections {
        for entry in entries {
            let label = host_label(&entry.host);
            for candidate in &entry.candidates {
                let node = &candidate.node;
                let machine: &str = if node.machine_name.is_empty() {
                    label
                } else {
                    &node.machine_name
                };
                let mut cells = vec![
                    label.to_string(),
                    value_or_dash(machine).to_string(),
                    node.name.clone(),
                    candidate.method.to_string(),
                    format!("{:.0}%", candidate.confidence * 100.0),
                    node.primary_internal_ip().to_string(),
                ];
                if opts.wide {
                    cells.extend(node_identity_cells(node));
                }
                if opts.explain {
                    cells.push(value_or_dash(&candidate.explanation).to_string());
                }
                table.push_badged(badge, cells);
            }
        }
    }
    table
}

fn unmatched_hosts_table(hosts: &[Host], opts: &MatchOptions) -> Table {
    let mut columns = vec!["Elemental Host", "Inventory ID", "Hostname", "IPs"];
    if opts.wide {
        columns.extend([
            "Namespace",
            "Inventory UID",
            "Host MachineID",
            "Host SystemUUID",
            "Host ProviderID",
        ]);
    }
    if opts.explain {
        columns.push("Why");
    }
    let mut table = Table::new(columns);

    for (i, host) in hosts.iter().enumerate() {
        let label = host
            .display_name()
            .map_or_else(|| format!("(empty record #{})", i + 1), str::to_string);
        let mut cells = vec![
            label,
            value_or_dash(&host.id).to_string(),
            value_or_dash(&host.hostname).to_string(),
            value_or_dash(&host.ips.join(",")).to_string(),
        ];
        if opts.wide {
            cells.extend(
                [
                    &host.namespace,
                    &host.uid,
                    &host.machine_id,
                    &host.system_uuid,
                    &host.provider_id,
                ]
                .map(|value| value_or_dash(value).to_string()),
            );
        }
        if opts.explain {
            let reason = if host.has_no_identifiers() {
                "inventory record missing identifiers"
            } else {
                "no Kubernetes node match"
            };
            cells.push(reason.to_string());
        }
        table.push(cells);
    }
    table
}

fn unmatched_nodes_table(nodes: &[Node], opts: &MatchOptions) -> Table {
    let mut columns = vec!["Rancher Machine", "K8s Node", "K8s InternalIP"];
    if opts.wide {
        columns.extend(["K8s ExternalIP", "K8s ProviderID", "K8s MachineID"]);
    }
    if opts.explain {
        columns.push("Why");
    }
    let mut table = Table::new(columns);

    for node in nodes {
        let mut cells = vec![
            value_or_dash(&node.machine_name).to_string(),
            node.name.clone(),
            value_or_dash(node.primary_internal_ip()).to_string(),
        ];
        if opts.wide {
            cells.extend(node_identity_cells(node));
        }
        if opts.explain {
            cells.push("no Elemental inventory match".to_string());
        }
        table.push(cells);
    }
    table
}

// ============================================================================
// Nodes
// ============================================================================

/// Options of the `nodes` renderer.
#[derive(Debug, Clone, Default)]
pub struct NodesOptions {
    /// Add a column with every label
    pub show_labels: bool,
    /// One extra column per label key
    pub label_keys: Vec<String>,
    /// Add identifier columns
    pub wide: bool,
    /// Output format
    pub mode: Mode,
}

/// Render a node listing.
///
/// # Errors
///
/// Returns [`RenderError`] if serialization or writing fails.
pub fn render_nodes<W: Write>(
    out: &mut W,
    nodes: &[Node],
    opts: &NodesOptions,
) -> Result<(), RenderError> {
    emit(out, opts.mode, nodes, |out| nodes_table(nodes, opts).render(out))
}

fn nodes_table(nodes: &[Node], opts: &NodesOptions) -> Table {
    let mut columns: Vec<String> = vec!["Node Name".to_string(), "InternalIP".to_string()];
    if opts.wide {
        columns.extend(["ExternalIP", "ProviderID", "MachineID"].map(str::to_string));
    }
    columns.extend(opts.label_keys.iter().cloned());
    if opts.show_labels {
        columns.push("Labels".to_string());
    }
    let mut table = Table::new(columns);

    for node in nodes {
        let mut cells = vec![node.name.clone(), node.primary_internal_ip().to_string()];
        if opts.wide {
            cells.extend([
                node.primary_external_ip().to_string(),
                node.provider_id.clone(),
                node.machine_id.clone(),
            ]);
        }
        for key in &opts.label_keys {
            let value = node.labels.get(key).map_or("", String::as_str);
            cells.push(value_or_dash(value).to_string());
        }
        if opts.show_labels {
            cells.push(format_labels(&node.labels));
        }
        table.push(cells);
    }
    table
}

/// `k=v` pairs sorted by key and joined with commas.
#[must_use]
pub fn format_labels(labels: &BTreeMap<String, String>) -> String {
    labels
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(",")
}

// ============================================================================
// Label counts
// ============================================================================

/// One row of `labels keys`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelKeySummary {
    /// Label key
    pub key: String,
    /// Nodes carrying it
    pub count: usize,
}

/// One row of `labels values`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelValueSummary {
    /// Label value
    pub value: String,
    /// Nodes carrying it
    pub count: usize,
}

/// Render label key counts sorted by key.
///
/// # Errors
///
/// Returns [`RenderError`] if serialization or writing fails.
pub fn render_label_keys<W: Write>(
    out: &mut W,
    counts: &BTreeMap<String, usize>,
    mode: Mode,
) -> Result<(), RenderError> {
    let list: Vec<LabelKeySummary> = counts
        .iter()
        .map(|(key, count)| LabelKeySummary {
            key: key.clone(),
            count: *count,
        })
        .collect();
    emit(out, mode, &list, |out| {
        let mut table = Table::new(["Label Key", "Count"]);
        for item in &list {
            table.push(vec![item.key.clone(), item.count.to_string()]);
        }
        table.render(out)
    })
}

/// Render the value counts of label `key` sorted by value.
///
/// # Errors
///
/// Returns [`RenderError`] if serialization or writing fails.
pub fn render_label_values<W: Write>(
    out: &mut W,
    key: &str,
    counts: &BTreeMap<String, usize>,
    mode: Mode,
) -> Result<(), RenderError> {
    let list: Vec<LabelValueSummary> = counts
        .iter()
        .map(|(value, count)| LabelValueSummary {
            value: value.clone(),
            count: *count,
        })
        .collect();
    emit(out, mode, &list, |out| {
        writeln!(out, "Label values for {key}")?;
        let mut table = Table::new(["Value", "Count"]);
        for item in &list {
            table.push(vec![item.value.clone(), item.count.to_string()]);
        }
        table.render(out)
    })
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod output_tests;
