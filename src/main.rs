// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::Parser;
use elemental_node_map::{
    cli::{parse_error_exit_code, Cli},
    commands,
    constants::EXIT_CONFIG_ERROR,
    errors::AppError,
};
use std::process::ExitCode;
use tracing::debug;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            if e.print().is_err() {
                eprintln!("{e}");
            }
            return exit_code(parse_error_exit_code(&e));
        }
    };
    init_tracing(cli.global.verbose);

    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: {e:#}");
            return exit_code(EXIT_CONFIG_ERROR);
        }
    };

    match runtime.block_on(async_main(&cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            exit_code(err.exit_code())
        }
    }
}

fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .thread_name("elemental-node-map")
        .enable_all()
        .build()
        .context("failed to start async runtime")
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

async fn async_main(cli: &Cli) -> Result<(), AppError> {
    let mut stdout = std::io::stdout();

    // Dropping the command future on Ctrl-C cancels every in-flight request
    tokio::select! {
        result = commands::run(cli, &mut stdout) => result,
        Ok(()) = tokio::signal::ctrl_c() => {
            debug!("Interrupted");
            Err(AppError::Interrupted)
        }
    }
}

/// Logs go to stderr; stdout carries rendered results only.
///
/// Respects RUST_LOG if set, otherwise warnings only, or debug output for this crate
/// with `--verbose`. RUST_LOG_FORMAT=json switches to JSON lines.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "warn,elemental_node_map=debug"
    } else {
        "warn"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact()
                .init();
        }
    }
}
