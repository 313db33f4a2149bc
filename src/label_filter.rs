// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Label pattern tools for node listings.
//!
//! Patterns come from comma-separated command-line values and take three forms:
//!
//! - `re:<expr>`, `regex:<expr>` or `/<expr>/` is a regular expression
//! - anything containing `*` or `?` is a shell-style wildcard anchored at both ends
//! - everything else is a plain substring
//!
//! Node filtering matches case-insensitively against any label key or value.
//! Key expansion for table columns matches case-sensitively against known keys.

use crate::errors::ConfigError;
use crate::types::Node;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::debug;

/// A compiled label pattern.
#[derive(Debug, Clone)]
pub enum LabelMatcher {
    /// Regular expression or translated wildcard
    Pattern(Regex),
    /// Lowercased substring
    Substring(String),
}

impl LabelMatcher {
    /// Whether `text` satisfies the pattern.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Self::Pattern(rx) => rx.is_match(text),
            Self::Substring(needle) => text.to_lowercase().contains(needle.as_str()),
        }
    }
}

/// Split a comma-separated flag value into trimmed, non-empty patterns.
#[must_use]
pub fn parse_label_patterns(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Expression of a regex pattern, or `None` when `raw` is not written as one.
#[must_use]
pub fn regex_pattern(raw: &str) -> Option<&str> {
    let raw = raw.trim();
    if let Some(expr) = raw.strip_prefix("re:") {
        return Some(expr.trim());
    }
    if let Some(expr) = raw.strip_prefix("regex:") {
        return Some(expr.trim());
    }
    if raw.len() >= 2 && raw.starts_with('/') && raw.ends_with('/') {
        return Some(&raw[1..raw.len() - 1]);
    }
    None
}

/// Whether `pattern` uses wildcard syntax.
#[must_use]
pub fn is_wildcard(pattern: &str) -> bool {
    pattern.contains(['*', '?'])
}

/// Anchored regex equivalent of a wildcard: `*` is any run, `?` any one character.
#[must_use]
pub fn wildcard_to_regex(pattern: &str) -> String {
    let quoted = regex::escape(pattern)
        .replace(r"\*", ".*")
        .replace(r"\?", ".");
    format!("^{quoted}$")
}

fn compile_regex(pattern: &str, expr: &str) -> Result<Regex, ConfigError> {
    Regex::new(expr).map_err(|e| ConfigError::InvalidLabelRegex {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

fn compile_wildcard(pattern: &str, expr: &str) -> Result<Regex, ConfigError> {
    Regex::new(expr).map_err(|e| ConfigError::InvalidLabelPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

/// Compile patterns into case-insensitive matchers.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidLabelRegex`] or [`ConfigError::InvalidLabelPattern`]
/// for the first pattern that fails to compile.
pub fn build_label_matchers(patterns: &[String]) -> Result<Vec<LabelMatcher>, ConfigError> {
    let mut matchers = Vec::new();
    for raw in patterns {
        let pattern = raw.trim();
        if pattern.is_empty() {
            continue;
        }
        let matcher = if let Some(expr) = regex_pattern(pattern) {
            LabelMatcher::Pattern(compile_regex(pattern, &format!("(?i){expr}"))?)
        } else if is_wildcard(pattern) {
            let expr = format!("(?i){}", wildcard_to_regex(pattern));
            LabelMatcher::Pattern(compile_wildcard(pattern, &expr)?)
        } else {
            LabelMatcher::Substring(pattern.to_lowercase())
        };
        matchers.push(matcher);
    }
    Ok(matchers)
}

/// Whether any label key or value satisfies any matcher.
///
/// A node without labels never matches.
#[must_use]
pub fn labels_match_any(labels: &BTreeMap<String, String>, matchers: &[LabelMatcher]) -> bool {
    labels.iter().any(|(key, value)| {
        matchers
            .iter()
            .any(|matcher| matcher.is_match(key) || matcher.is_match(value))
    })
}

/// Keep the nodes whose labels match at least one pattern.
///
/// Without any usable pattern the nodes are returned unchanged.
///
/// # Errors
///
/// Returns a [`ConfigError`] when a pattern does not compile.
pub fn filter_nodes(nodes: Vec<Node>, patterns: &[String]) -> Result<Vec<Node>, ConfigError> {
    let matchers = build_label_matchers(patterns)?;
    if matchers.is_empty() {
        return Ok(nodes);
    }
    let total = nodes.len();
    let kept: Vec<Node> = nodes
        .into_iter()
        .filter(|node| labels_match_any(&node.labels, &matchers))
        .collect();
    debug!(matched = kept.len(), total = total, "Applied label filter");
    Ok(kept)
}

/// Every label key used by any node, sorted.
#[must_use]
pub fn collect_label_keys(nodes: &[Node]) -> Vec<String> {
    nodes
        .iter()
        .flat_map(|node| node.labels.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Resolve column patterns to concrete label keys.
///
/// Regex and wildcard patterns expand to every matching known key in sorted order.
/// Plain patterns are kept as given even when no node carries them. Output follows
/// pattern order with duplicates removed. When no node has labels at all the patterns
/// are returned as they are.
///
/// # Errors
///
/// Returns a [`ConfigError`] when a pattern does not compile.
pub fn expand_label_keys(nodes: &[Node], patterns: &[String]) -> Result<Vec<String>, ConfigError> {
    let known = collect_label_keys(nodes);
    if known.is_empty() {
        return Ok(patterns.to_vec());
    }

    let mut out = Vec::new();
    let mut seen = HashSet::new();
    let mut push = |key: &str, out: &mut Vec<String>| {
        if seen.insert(key.to_string()) {
            out.push(key.to_string());
        }
    };

    for raw in patterns {
        let pattern = raw.trim();
        if pattern.is_empty() {
            continue;
        }
        let rx = if let Some(expr) = regex_pattern(pattern) {
            compile_regex(pattern, expr)?
        } else if is_wildcard(pattern) {
            compile_wildcard(pattern, &wildcard_to_regex(pattern))?
        } else {
            push(pattern, &mut out);
            continue;
        };
        for key in known.iter().filter(|key| rx.is_match(key)) {
            push(key, &mut out);
        }
    }
    Ok(out)
}

/// Number of nodes carrying each label key.
#[must_use]
pub fn count_label_keys(nodes: &[Node]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for key in nodes.iter().flat_map(|node| node.labels.keys()) {
        *counts.entry(key.clone()).or_insert(0) += 1;
    }
    counts
}

/// Number of nodes carrying each value of label `key`.
#[must_use]
pub fn count_label_values(nodes: &[Node], key: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for value in nodes.iter().filter_map(|node| node.labels.get(key)) {
        *counts.entry(value.clone()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
#[path = "label_filter_tests.rs"]
mod label_filter_tests;
