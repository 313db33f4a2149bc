// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `urls.rs`

#[cfg(test)]
mod tests {
    use crate::errors::ConfigError;
    use crate::rancher::urls::*;
    use url::Url;

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn test_with_limit_added_when_absent() {
        let limited = with_limit(&url("https://r.test/v1/things?filter=a"));
        assert_eq!(limited.as_str(), "https://r.test/v1/things?filter=a&limit=200");
    }

    #[test]
    fn test_with_limit_kept_when_present() {
        let limited = with_limit(&url("https://r.test/v1/things?limit=50"));
        assert_eq!(limited.as_str(), "https://r.test/v1/things?limit=50");
    }

    #[test]
    fn test_with_limit_replaces_empty_value() {
        let limited = with_limit(&url("https://r.test/v1/things?limit="));
        assert_eq!(limited.as_str(), "https://r.test/v1/things?limit=200");
    }

    #[test]
    fn test_resolve_absolute_link() {
        let base = url("https://r.test/v1/things");
        let next = resolve_next(&base, "https://other.test/v1/things?continue=abc").unwrap();
        assert_eq!(next.as_str(), "https://other.test/v1/things?continue=abc");
    }

    #[test]
    fn test_resolve_query_only_link() {
        let base = url("https://r.test/v1/things?limit=200");
        let next = resolve_next(&base, "?continue=abc").unwrap();
        assert_eq!(next.as_str(), "https://r.test/v1/things?continue=abc");
    }

    #[test]
    fn test_resolve_root_relative_link() {
        let base = url("https://r.test/rancher/v1/things?limit=200");
        let next = resolve_next(&base, "/v1/things?marker=2").unwrap();
        assert_eq!(next.as_str(), "https://r.test/v1/things?marker=2");
    }

    #[test]
    fn test_resolve_bare_relative_link() {
        let base = url("https://r.test/v1/things/?limit=200");
        let next = resolve_next(&base, "page2?marker=2").unwrap();
        assert_eq!(next.as_str(), "https://r.test/v1/things/page2?marker=2");
    }

    #[test]
    fn test_resolve_empty_link_ends_pagination() {
        let base = url("https://r.test/v1/things");
        assert!(resolve_next(&base, "").is_none());
        assert!(resolve_next(&base, "http://[bad").is_none());
    }

    #[test]
    fn test_inventory_url_from_server() {
        assert_eq!(
            inventory_url_from_server("https://rancher.example.com/k8s/clusters/local").unwrap(),
            "https://rancher.example.com/v1/elemental.cattle.io.machineinventories"
        );
    }

    #[test]
    fn test_base_url_keeps_subpath() {
        assert_eq!(
            base_url_from_server("https://rancher.example.com/rancher/k8s/clusters/c-123")
                .unwrap(),
            "https://rancher.example.com/rancher"
        );
        assert_eq!(
            base_url_from_server("https://rancher.example.com:8443/k8s?x=1#y").unwrap(),
            "https://rancher.example.com:8443"
        );
    }

    #[test]
    fn test_base_url_rejects_relative_server() {
        assert!(matches!(
            base_url_from_server("rancher.example.com"),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_strip_api_suffix() {
        assert_eq!(strip_api_suffix("/rancher/v1/elemental.cattle.io.machineinventories"), "/rancher");
        assert_eq!(strip_api_suffix("/V3/clusters"), "");
        assert_eq!(strip_api_suffix("/rancher/v1"), "/rancher");
        assert_eq!(strip_api_suffix("/rancher"), "/rancher");
    }

    #[test]
    fn test_sibling_collection_urls() {
        let inventory =
            "https://rancher.example.com/v1/elemental.cattle.io.machineinventories?limit=5";
        assert_eq!(
            machines_url(inventory).unwrap().as_str(),
            "https://rancher.example.com/v1/cluster.x-k8s.io.machine"
        );
        assert_eq!(
            clusters_url(inventory).unwrap().as_str(),
            "https://rancher.example.com/v3/clusters"
        );
    }
}
