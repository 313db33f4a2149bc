// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `cli.rs`

#[cfg(test)]
mod tests {
    use crate::cli::{parse_error_exit_code, Cli, Command, LabelsCommand, MatchArgs};
    use crate::constants::{EXIT_CONFIG_ERROR, EXIT_REMOTE_ERROR};
    use clap::{CommandFactory, Parser};

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_match_flags() {
        let cli = Cli::try_parse_from([
            "elemental-node-map",
            "match",
            "--rancher-url",
            "https://rancher.example.com",
            "--rancher-token",
            "t",
            "--rancher-cluster",
            "edge",
            "--labels",
            "zone,re:^pool",
            "--show-unmatched",
            "--explain",
            "--wide",
            "--output",
            "json",
            "-v",
        ])
        .unwrap();

        assert!(cli.global.verbose);
        let Command::Match(args) = cli.command else {
            panic!("expected match command");
        };
        assert_eq!(args.rancher_url(), Some("https://rancher.example.com"));
        assert_eq!(args.rancher_token(), Some("t"));
        assert_eq!(args.rancher_cluster(), Some("edge"));
        assert_eq!(args.labels, "zone,re:^pool");
        assert!(args.show_unmatched && args.explain && args.wide);
        assert_eq!(args.output, "json");
        assert_eq!(args.selector, "");
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "elemental-node-map",
            "nodes",
            "--kubeconfig",
            "~/edge.yaml",
            "--context",
            "edge",
            "--label-keys",
            "zone",
            "--labels",
        ])
        .unwrap();

        assert_eq!(cli.global.kubeconfig.as_deref(), Some("~/edge.yaml"));
        assert_eq!(cli.global.context.as_deref(), Some("edge"));
        let Command::Nodes(args) = cli.command else {
            panic!("expected nodes command");
        };
        assert!(args.labels);
        assert_eq!(args.label_keys, "zone");
        assert_eq!(args.output, "table");
    }

    #[test]
    fn test_labels_subcommands() {
        let cli =
            Cli::try_parse_from(["elemental-node-map", "labels", "values", "zone", "--output", "yaml"])
                .unwrap();
        let Command::Labels {
            command: LabelsCommand::Values { key, output },
        } = cli.command
        else {
            panic!("expected labels values");
        };
        assert_eq!(key, "zone");
        assert_eq!(output, "yaml");

        assert!(Cli::try_parse_from(["elemental-node-map", "labels", "values"]).is_err());
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let args = MatchArgs {
            rancher_url: Some("  ".to_string()),
            rancher_token: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(args.rancher_url(), None);
        assert_eq!(args.rancher_token(), None);
        assert_eq!(args.rancher_cluster(), None);
    }

    #[test]
    fn test_insecure_tls_from_env() {
        let args = MatchArgs::default();
        assert!(!args.insecure_tls(None));
        assert!(args.insecure_tls(Some("true")));
        assert!(args.insecure_tls(Some("1")));
        assert!(!args.insecure_tls(Some("yes")));

        let flagged = MatchArgs {
            insecure_skip_tls_verify: true,
            ..Default::default()
        };
        assert!(flagged.insecure_tls(Some("false")));
    }

    fn parse_exit(args: &[&str]) -> i32 {
        let err = Cli::try_parse_from(args).unwrap_err();
        parse_error_exit_code(&err)
    }

    #[test]
    fn test_usage_errors_exit_as_config_errors() {
        let unknown = parse_exit(&["elemental-node-map", "match", "--bogus-flag"]);
        assert_eq!(unknown, EXIT_CONFIG_ERROR);
        assert_ne!(unknown, EXIT_REMOTE_ERROR);

        assert_eq!(parse_exit(&["elemental-node-map"]), EXIT_CONFIG_ERROR);
        assert_eq!(
            parse_exit(&["elemental-node-map", "labels", "values"]),
            EXIT_CONFIG_ERROR
        );
        assert_eq!(
            parse_exit(&["elemental-node-map", "nodes", "--selector"]),
            EXIT_CONFIG_ERROR
        );
    }

    #[test]
    fn test_help_and_version_exit_zero() {
        assert_eq!(parse_exit(&["elemental-node-map", "--help"]), 0);
        assert_eq!(parse_exit(&["elemental-node-map", "--version"]), 0);
        assert_eq!(parse_exit(&["elemental-node-map", "match", "--help"]), 0);
    }
}
