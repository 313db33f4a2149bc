// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! URL arithmetic for the Rancher API.
//!
//! Covers page-size injection, continuation link resolution and derivation of the
//! inventory, machine and cluster collection URLs from a kubeconfig server address or
//! from the inventory URL itself.

use crate::constants::{
    CAPI_MACHINES_PATH, ELEMENTAL_INVENTORY_PATH, MANAGEMENT_CLUSTERS_PATH, RANCHER_LIMIT_PARAM,
    RANCHER_LIST_PAGE_SIZE,
};
use crate::errors::ConfigError;
use url::Url;

/// Copy of `url` with `limit=200` added when no non-empty `limit` is present.
#[must_use]
pub fn with_limit(url: &Url) -> Url {
    let has_limit = url
        .query_pairs()
        .any(|(key, value)| key == RANCHER_LIMIT_PARAM && !value.is_empty());
    if has_limit {
        return url.clone();
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != RANCHER_LIMIT_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    let mut limited = url.clone();
    limited
        .query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(RANCHER_LIMIT_PARAM, &RANCHER_LIST_PAGE_SIZE.to_string());
    limited
}

/// Resolve a continuation link against the collection URL.
///
/// - absolute links are used as given
/// - `?query` links keep the base path and replace its query
/// - `/path?query` links replace path and query
/// - bare relative links are appended to the base path
///
/// Returns `None` for an empty or unparseable link, which ends pagination.
#[must_use]
pub fn resolve_next(base: &Url, next: &str) -> Option<Url> {
    if next.is_empty() {
        return None;
    }
    match Url::parse(next) {
        Ok(absolute) => return Some(absolute),
        Err(url::ParseError::RelativeUrlWithoutBase) => {}
        Err(_) => return None,
    }

    let without_fragment = next.split('#').next().unwrap_or(next);
    let (path, query) = match without_fragment.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (without_fragment, None),
    };

    let mut resolved = base.clone();
    if path.is_empty() {
        let query = query.filter(|query| !query.is_empty())?;
        resolved.set_query(Some(query));
        return Some(resolved);
    }

    if path.starts_with('/') {
        resolved.set_path(path);
    } else {
        let joined = format!("{}/{path}", base.path().trim_end_matches('/'));
        resolved.set_path(&joined);
    }
    resolved.set_query(query);
    Some(resolved)
}

fn parse_server(server: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        what: "kubeconfig server",
        url: server.to_string(),
        reason,
    };
    let parsed = Url::parse(server).map_err(|e| invalid(e.to_string()))?;
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing scheme or host".to_string()));
    }
    Ok(parsed)
}

/// Rancher base URL of a kubeconfig server address.
///
/// Rancher-proxied kubeconfigs point at `https://rancher/k8s/clusters/<id>`; everything
/// from `/k8s` on is dropped together with query and fragment.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidUrl`] when the server has no scheme or host.
pub fn base_url_from_server(server: &str) -> Result<String, ConfigError> {
    let mut parsed = parse_server(server)?;
    let path = parsed.path().to_string();
    let path = match path.find("/k8s/").or_else(|| path.find("/k8s")) {
        Some(idx) => &path[..idx],
        None => path.as_str(),
    };
    let path = path.trim_end_matches('/').to_string();
    parsed.set_path(&path);
    parsed.set_query(None);
    parsed.set_fragment(None);
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

/// Elemental inventory collection URL of a kubeconfig server address.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidUrl`] when the server has no scheme or host.
pub fn inventory_url_from_server(server: &str) -> Result<String, ConfigError> {
    let base = base_url_from_server(server)?;
    Ok(format!("{base}{ELEMENTAL_INVENTORY_PATH}"))
}

/// Cut a `/v1…` or `/v3…` API suffix off a path, case-insensitively.
#[must_use]
pub fn strip_api_suffix(path: &str) -> &str {
    let lower = path.to_ascii_lowercase();
    if let Some(idx) = lower.find("/v1/").or_else(|| lower.find("/v3/")) {
        return &path[..idx];
    }
    if lower.ends_with("/v1") || lower.ends_with("/v3") {
        return &path[..path.len() - 3];
    }
    path
}

fn sibling_collection(inventory_url: &str, collection: &str) -> Result<Url, ConfigError> {
    let mut parsed = Url::parse(inventory_url).map_err(|e| ConfigError::InvalidUrl {
        what: "rancher",
        url: inventory_url.to_string(),
        reason: e.to_string(),
    })?;
    let base_path = strip_api_suffix(parsed.path())
        .trim_end_matches('/')
        .to_string();
    parsed.set_path(&format!("{base_path}{collection}"));
    parsed.set_query(None);
    parsed.set_fragment(None);
    Ok(parsed)
}

/// Cluster API machine collection next to the inventory collection.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidUrl`] when the inventory URL does not parse.
pub fn machines_url(inventory_url: &str) -> Result<Url, ConfigError> {
    sibling_collection(inventory_url, CAPI_MACHINES_PATH)
}

/// Management cluster collection next to the inventory collection.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidUrl`] when the inventory URL does not parse.
pub fn clusters_url(inventory_url: &str) -> Result<Url, ConfigError> {
    sibling_collection(inventory_url, MANAGEMENT_CLUSTERS_PATH)
}

#[cfg(test)]
#[path = "urls_tests.rs"]
mod urls_tests;
