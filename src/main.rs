//! Permission Matrix - replay role permission edits and print the sync payload
//!
//! Reads an editing session (resource catalog, the role's current grants and a
//! list of edits), applies the edits, and writes the resulting change set as
//! JSON on stdout.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::{debug, info};

use permission_matrix::config::{LogFormat, LogTarget};
use permission_matrix::{
    services::{apply_edits, build_resource_tree, merge_role_permissions, validate_edits},
    AppConfig, MatrixError, PermissionMatrixState, SessionFile,
};

/// What to print once the edits are applied
#[derive(Debug, Clone, Copy, PartialEq)]
enum OutputMode {
    Diff,
    Preview,
    Tree,
    Merge,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();

    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return ExitCode::SUCCESS;
    }

    if args.iter().any(|arg| arg == "--version" || arg == "-V") {
        println!("permission-matrix {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<MatrixError>() {
                Some(matrix_err) => {
                    let mut body = matrix_err.to_response();
                    let context = err.to_string();
                    if context != matrix_err.to_string() {
                        body = body.with_details(serde_json::json!({ "context": context }));
                    }
                    match serde_json::to_string(&body) {
                        Ok(json) => eprintln!("{}", json),
                        Err(_) => eprintln!("Error: {}", matrix_err),
                    }
                }
                None => eprintln!("Error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<()> {
    let (mode, session_path) = parse_args(args)?;

    // Load configuration first (before logging, so we know log format)
    let config = AppConfig::load().context("Failed to load configuration")?;

    // The guard must outlive every log call so file output is flushed
    let _log_guard = init_logging(&config);

    info!(session = ?session_path, mode = ?mode, "Loading editing session");
    let session = SessionFile::load(&session_path)
        .with_context(|| format!("Failed to load session file: {:?}", session_path))?;
    if config.matrix.validate_keys {
        session.validate()?;
    }

    let tree = build_resource_tree(&session.resources)?;
    if config.matrix.strict_edits {
        validate_edits(&session.edits, &tree)?;
    }

    let response = session.response();
    let state = PermissionMatrixState::from_response(&response);
    let edited = apply_edits(&state, &session.edits, &tree);
    let codes = &config.matrix.permission_codes;

    info!(
        resources = session.resources.len(),
        edits = session.edits.len(),
        changed_resources = edited.changed_resources().len(),
        "Edits applied"
    );

    let output = match mode {
        OutputMode::Diff => serde_json::to_string_pretty(&edited.generate_diff_payload(codes))?,
        OutputMode::Preview => serde_json::to_string_pretty(&edited.change_preview(codes))?,
        OutputMode::Tree => serde_json::to_string_pretty(&tree)?,
        OutputMode::Merge => {
            serde_json::to_string_pretty(&merge_role_permissions(&tree, &response))?
        }
    };
    println!("{}", output);

    debug!("Done");
    Ok(())
}

fn parse_args(args: &[String]) -> Result<(OutputMode, PathBuf)> {
    let mut mode = OutputMode::Diff;
    let mut session_path = None;

    for arg in args {
        match arg.as_str() {
            "--preview" => mode = OutputMode::Preview,
            "--tree" => mode = OutputMode::Tree,
            "--merge" => mode = OutputMode::Merge,
            flag if flag.starts_with('-') => anyhow::bail!("Unknown option: {}", flag),
            path => {
                if session_path.replace(PathBuf::from(path)).is_some() {
                    anyhow::bail!("Only one session file may be given");
                }
            }
        }
    }

    let session_path = session_path.context("Missing session file (see --help)")?;
    Ok((mode, session_path))
}

/// Initialize logging based on configuration
fn init_logging(config: &AppConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer, Registry};

    type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

    fn format_layer<W>(format: &LogFormat, writer: W) -> BoxedLayer
    where
        W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
    {
        match format {
            LogFormat::Json => fmt::layer().json().with_target(true).with_writer(writer).boxed(),
            LogFormat::Compact => fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(writer)
                .boxed(),
            LogFormat::Pretty => fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_writer(writer)
                .boxed(),
        }
    }

    let log_config = &config.logging;
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_config.level));

    // stdout carries the JSON result, so console logs go to stderr
    let mut layers: Vec<BoxedLayer> = vec![];
    if log_config.target != LogTarget::File {
        layers.push(format_layer(&log_config.format, std::io::stderr));
    }

    let guard = if log_config.target != LogTarget::Console {
        if let Err(e) = std::fs::create_dir_all(&log_config.log_dir) {
            eprintln!(
                "Warning: Failed to create log directory {:?}: {}",
                log_config.log_dir, e
            );
        }
        let appender = if log_config.daily_rotation {
            tracing_appender::rolling::daily(&log_config.log_dir, &log_config.log_prefix)
        } else {
            tracing_appender::rolling::never(&log_config.log_dir, &log_config.log_prefix)
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        layers.push(format_layer(&log_config.format, writer));
        Some(guard)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .init();

    guard
}

fn print_help() {
    println!(
        r#"permission-matrix {}

USAGE:
    permission-matrix [OPTIONS] <SESSION_FILE>

OPTIONS:
    -h, --help              Print this help message
    -V, --version           Print version information
    --preview               Print every changed cell with its old and new effect
                            instead of the sync payload
    --tree                  Print the sorted resource tree
    --merge                 Print the read-only role permission table

SESSION FILE:
    YAML or JSON with three keys:
      resources     flat resource list (id, resourceKey, resourceName,
                    resourceType, parentId, sortOrder)
      permissions   the role's grants ({{resourceKey, permissionCodes, effect}})
      edits         edits to replay, each tagged by "op" (set, toggle, row,
                    clear_row, column, all, subtree, reset)

ENVIRONMENT:
    PERMISSION_MATRIX_CONFIG      Path to configuration file (default: config.yaml)
    PERMISSION_MATRIX_CODES       Comma separated permission code universe
    PERMISSION_MATRIX_LOG_FORMAT  pretty, compact or json
    RUST_LOG                      Log filter

CONFIGURATION:
    The tool looks for configuration files in the following order:
    1. Path specified by PERMISSION_MATRIX_CONFIG environment variable
    2. ./config.yaml
    3. ./config/config.yaml
    4. /etc/permission-matrix/config.yaml"#,
        env!("CARGO_PKG_VERSION")
    );
}
