// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! End-to-end tests for `commands.rs` against a mock Rancher/Kubernetes server.

#[cfg(test)]
mod tests {
    use crate::cli::{GlobalArgs, LabelsCommand, MatchArgs, NodesArgs};
    use crate::commands::{run_labels, run_match, run_nodes};
    use crate::errors::{AppError, ConfigError};
    use serde_json::{json, Value};
    use std::fs;
    use tempfile::TempDir;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const INVENTORY: &str = "/v1/elemental.cattle.io.machineinventories";

    struct Fixture {
        _server: MockServer,
        _dir: TempDir,
        global: GlobalArgs,
    }

    fn kube_node(name: &str, ip: &str, zone: &str) -> Value {
        json!({
            "apiVersion": "v1",
            "kind": "Node",
            "metadata": {"name": name, "uid": format!("uid-{name}"), "labels": {"zone": zone}},
            "status": {"addresses": [{"type": "InternalIP", "address": ip}]}
        })
    }

    async fn fixture(nodes: Vec<Value>, hosts: Value) -> Fixture {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/nodes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "apiVersion": "v1",
                "kind": "NodeList",
                "metadata": {"resourceVersion": "1"},
                "items": nodes
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(INVENTORY))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": hosts})))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let kubeconfig = dir.path().join("config");
        fs::write(
            &kubeconfig,
            format!(
                "apiVersion: v1\nkind: Config\ncurrent-context: edge\n\
                 clusters:\n- name: edge\n  cluster:\n    server: {uri}\n\
                 contexts:\n- name: edge\n  context:\n    cluster: edge\n    user: edge\n\
                 users:\n- name: edge\n  user:\n    token: secret\n",
                uri = server.uri()
            ),
        )
        .unwrap();

        let global = GlobalArgs {
            kubeconfig: Some(kubeconfig.display().to_string()),
            ..Default::default()
        };
        Fixture {
            _server: server,
            _dir: dir,
            global,
        }
    }

    fn json_args() -> MatchArgs {
        MatchArgs {
            output: "json".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_match_derives_rancher_from_kubeconfig() {
        let fx = fixture(
            vec![
                kube_node("node-1", "10.0.0.1", "a"),
                kube_node("node-2", "10.0.0.2", "b"),
            ],
            json!([{"id": "mi-1", "spec": {"ipAddresses": ["10.0.0.1"]}}]),
        )
        .await;

        let mut out = Vec::new();
        run_match(&fx.global, &json_args(), &mut out).await.unwrap();
        let doc: Value = serde_json::from_slice(&out).unwrap();

        assert!(doc.get("cluster").is_none());
        assert_eq!(doc["summary"]["matched"], 1);
        assert_eq!(doc["summary"]["unmatchedNodes"], 1);
        assert_eq!(doc["matches"][0]["candidates"][0]["node"]["name"], "node-1");
        assert_eq!(doc["unmatchedNodes"][0]["name"], "node-2");
    }

    #[tokio::test]
    async fn test_match_label_filter_drops_nodes() {
        let fx = fixture(
            vec![
                kube_node("node-1", "10.0.0.1", "a"),
                kube_node("node-2", "10.0.0.2", "mtl-b"),
            ],
            json!([]),
        )
        .await;
        let args = MatchArgs {
            labels: "MTL".to_string(),
            ..json_args()
        };

        let mut out = Vec::new();
        run_match(&fx.global, &args, &mut out).await.unwrap();
        let doc: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(doc["summary"]["unmatchedNodes"], 1);
        assert_eq!(doc["unmatchedNodes"][0]["name"], "node-2");
    }

    #[tokio::test]
    async fn test_match_ambiguous_renders_then_fails() {
        let fx = fixture(
            vec![
                kube_node("node-1", "10.0.0.1", "a"),
                kube_node("node-2", "10.0.0.1", "b"),
            ],
            json!([{"id": "mi-1", "spec": {"ipAddresses": ["10.0.0.1"]}}]),
        )
        .await;

        let mut out = Vec::new();
        let err = run_match(&fx.global, &json_args(), &mut out)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AmbiguousMatches { count: 1 }));
        assert_eq!(err.exit_code(), 3);

        let doc: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(doc["summary"]["ambiguous"], 1);
    }

    #[tokio::test]
    async fn test_match_inventory_failure_is_remote_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(INVENTORY))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;
        let fx = fixture(vec![], json!([])).await;
        let args = MatchArgs {
            rancher_url: Some(format!("{}{INVENTORY}", server.uri())),
            rancher_token: Some("t".to_string()),
            ..json_args()
        };

        let mut out = Vec::new();
        let err = run_match(&fx.global, &args, &mut out).await.unwrap_err();
        assert_eq!(err.to_string(), "rancher authorization failed");
        assert_eq!(err.exit_code(), 2);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_match_rejects_output_mode_first() {
        let global = GlobalArgs {
            kubeconfig: Some("/nonexistent/kubeconfig".to_string()),
            ..Default::default()
        };
        let args = MatchArgs {
            output: "xml".to_string(),
            ..Default::default()
        };

        let mut out = Vec::new();
        let err = run_match(&global, &args, &mut out).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Config(ConfigError::InvalidOutputMode { .. })
        ));
        assert_eq!(err.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_match_without_kubeconfig() {
        let global = GlobalArgs {
            kubeconfig: Some("/nonexistent/kubeconfig".to_string()),
            ..Default::default()
        };

        let mut out = Vec::new();
        let err = run_match(&global, &json_args(), &mut out)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Config(ConfigError::KubeconfigNotFound { .. })
        ));
        assert_eq!(err.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_nodes_expands_label_key_columns() {
        colored::control::set_override(false);
        let fx = fixture(vec![kube_node("node-1", "10.0.0.1", "mtl-a")], json!([])).await;
        let args = NodesArgs {
            label_keys: "zo*".to_string(),
            output: "table".to_string(),
            ..Default::default()
        };

        let mut out = Vec::new();
        run_nodes(&fx.global, &args, &mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].ends_with("zone"));
        assert!(lines[2].starts_with("node-1"));
        assert!(lines[2].ends_with("mtl-a"));
    }

    #[tokio::test]
    async fn test_label_values_json() {
        let fx = fixture(
            vec![
                kube_node("node-1", "10.0.0.1", "a"),
                kube_node("node-2", "10.0.0.2", "a"),
                kube_node("node-3", "10.0.0.3", "b"),
            ],
            json!([]),
        )
        .await;
        let command = LabelsCommand::Values {
            key: "zone".to_string(),
            output: "json".to_string(),
        };

        let mut out = Vec::new();
        run_labels(&fx.global, &command, &mut out).await.unwrap();
        let doc: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(
            doc,
            json!([{"value": "a", "count": 2}, {"value": "b", "count": 1}])
        );
    }
}
