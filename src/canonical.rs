// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Canonical forms of identifiers, hostnames, IP addresses and machine names.
//!
//! Every function here is pure. Key sets are returned as sorted, de-duplicated vectors so
//! that lookups and explanations are deterministic.

use crate::constants::HOSTNAME_HEX_SUFFIX_LEN;
use crate::labels::NODE_MACHINE_NAME_KEYS;
use std::collections::{BTreeMap, BTreeSet};
use std::net::IpAddr;

/// Canonical identifier: trimmed and lowercased, `None` when empty.
#[must_use]
pub fn normalize_id(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

/// Canonical identifiers of several raw values as a sorted set.
#[must_use]
pub fn normalized_ids<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    values
        .into_iter()
        .filter_map(normalize_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Canonical hostname: trimmed, one trailing dot removed, lowercased.
#[must_use]
pub fn normalize_hostname(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
    Some(trimmed.to_lowercase())
}

/// All equally valid lookup keys for a hostname.
///
/// The set holds the full name, the short name (up to the first dot), and both of those
/// with a trailing 8-hex-character `-xxxxxxxx` segment removed. Generated node names
/// often carry such a random suffix that the inventory side never sees.
///
/// ```rust
/// use elemental_node_map::canonical::hostname_variants;
///
/// assert_eq!(
///     hostname_variants("Worker-1-62c86a9b.example.com."),
///     vec![
///         "worker-1".to_string(),
///         "worker-1-62c86a9b".to_string(),
///         "worker-1-62c86a9b.example.com".to_string(),
///     ]
/// );
/// ```
#[must_use]
pub fn hostname_variants(value: &str) -> Vec<String> {
    let Some(full) = normalize_hostname(value) else {
        return Vec::new();
    };
    let short = match full.find('.') {
        Some(idx) if idx > 0 => full[..idx].to_string(),
        _ => full.clone(),
    };

    let mut variants = BTreeSet::new();
    variants.insert(trim_hex_suffix(&full).to_string());
    variants.insert(trim_hex_suffix(&short).to_string());
    variants.insert(full);
    variants.insert(short);
    variants.into_iter().collect()
}

/// Drop a final `-` segment made of exactly eight lowercase hex characters.
#[must_use]
pub fn trim_hex_suffix(value: &str) -> &str {
    match value.rfind('-') {
        Some(idx) if idx > 0 => {
            let suffix = &value[idx + 1..];
            let is_hex = suffix.len() == HOSTNAME_HEX_SUFFIX_LEN
                && suffix
                    .bytes()
                    .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
            if is_hex {
                &value[..idx]
            } else {
                value
            }
        }
        _ => value,
    }
}

/// Canonical text of an IP address, `None` when the value does not parse.
///
/// IPv4-mapped IPv6 addresses collapse to their dotted-quad form.
#[must_use]
pub fn normalize_ip(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<IpAddr>()
        .ok()
        .map(|ip| ip.to_canonical().to_string())
}

/// Canonical IP addresses of several raw values as a sorted set.
#[must_use]
pub fn normalized_ips<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    values
        .iter()
        .filter_map(|value| normalize_ip(value.as_ref()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Strip namespace or slug prefixes from a machine name.
///
/// `fleet-default/m-abc` and `machine:m-abc` both become `m-abc`. A separator in last
/// position is ignored.
#[must_use]
pub fn normalize_machine_name(value: &str) -> String {
    let trimmed = value.trim();
    for separator in ['/', ':'] {
        if let Some(idx) = trimmed.rfind(separator) {
            if idx + separator.len_utf8() < trimmed.len() {
                return trimmed[idx + separator.len_utf8()..].trim().to_string();
            }
        }
    }
    trimmed.to_string()
}

/// Whether `value` looks like an 8-4-4-4-12 hex UUID.
#[must_use]
pub fn is_uuid(value: &str) -> bool {
    value.len() == 36
        && value.bytes().enumerate().all(|(i, b)| match i {
            8 | 13 | 18 | 23 => b == b'-',
            _ => b.is_ascii_hexdigit(),
        })
}

/// Machine-name candidates found on a node's labels, then its annotations.
///
/// Values are normalized with [`normalize_machine_name`]; empty values and repeats are
/// dropped, first occurrence wins.
#[must_use]
pub fn machine_name_candidates(
    labels: &BTreeMap<String, String>,
    annotations: &BTreeMap<String, String>,
) -> Vec<String> {
    let mut seen = BTreeSet::new();
    [labels, annotations]
        .into_iter()
        .flat_map(|source| {
            NODE_MACHINE_NAME_KEYS
                .iter()
                .filter_map(move |key| source.get(*key))
        })
        .filter(|value| !value.trim().is_empty())
        .map(|value| normalize_machine_name(value))
        .filter(|value| !value.is_empty() && seen.insert(value.clone()))
        .collect()
}

/// Pick the machine name of a node from its candidates.
///
/// The first candidate that is not UUID-shaped wins. When every candidate is a UUID the
/// first one is returned; this is best effort and may not be the intended name.
#[must_use]
pub fn select_machine_name(candidates: &[String]) -> Option<String> {
    candidates
        .iter()
        .find(|candidate| !is_uuid(candidate))
        .or_else(|| candidates.first())
        .cloned()
}

#[cfg(test)]
#[path = "canonical_tests.rs"]
mod canonical_tests;
