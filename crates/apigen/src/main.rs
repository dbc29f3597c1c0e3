//! CLI for `apigen`.
//!
//! ```text
//! # Default metadata for a service
//! apigen --target metadata --openapi-yaml-spec openapi_specs/compute/v2.yaml \
//!   --service-type compute
//!
//! # Every SDK module listed in the metadata
//! apigen --target sdk --metadata metadata/compute_metadata.yaml
//!
//! # One operation, no metadata
//! apigen --target cli --openapi-yaml-spec openapi_specs/compute/v2.yaml \
//!   --openapi-operation-id servers:get --service-type compute
//! ```

#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use apigen::{PlanExecutor, PlanRequest, ProjectConfig};
use apigen_core::TargetKind;
use clap::Parser;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Metadata-driven SDK, CLI and schema generator for OpenAPI documents.
#[derive(Parser)]
#[command(name = "apigen", version, about)]
struct Cli {
    /// Target to generate: sdk, cli, openapi-spec, jsonschema, metadata, osc
    /// or ansible.
    #[arg(long)]
    target: TargetKind,

    /// Metadata file. Read by generation targets, written by `metadata`.
    #[arg(long)]
    metadata: Option<PathBuf>,

    /// Directory the output roots of the project config are relative to.
    #[arg(long, default_value = ".")]
    work_dir: PathBuf,

    /// OpenAPI document for direct operation mode and the `metadata` target.
    #[arg(long)]
    openapi_yaml_spec: Option<PathBuf>,

    /// Operation to generate in direct operation mode.
    #[arg(long, requires = "openapi_yaml_spec")]
    openapi_operation_id: Option<String>,

    /// Service type outside metadata mode (e.g. `compute`).
    #[arg(long)]
    service_type: Option<String>,

    /// API version outside metadata mode (e.g. `v2`).
    #[arg(long)]
    api_version: Option<String>,

    /// Only generate resources whose service type starts with this.
    #[arg(long)]
    service: Option<String>,

    /// Only generate resources whose hierarchical name starts with this.
    /// Module aggregators are skipped.
    #[arg(long)]
    resource: Option<String>,

    /// Resource descriptor file (direct resource mode).
    #[arg(long, requires = "class_name")]
    module: Option<PathBuf>,

    /// Resource class in the descriptor file.
    #[arg(long, requires = "module")]
    class_name: Option<String>,

    /// Route map of the `openapi-spec` target.
    #[arg(long)]
    route_map: Option<PathBuf>,

    /// Prose merged into the extracted document.
    #[arg(long, requires = "route_map")]
    prose: Option<PathBuf>,

    /// Check that every operation in the metadata resolves; write nothing.
    #[arg(long)]
    validate: bool,

    /// Path to a project config YAML file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", diagnostic(&err));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => ProjectConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => ProjectConfig::default(),
    };
    let executor = PlanExecutor::new(config);
    let target = cli.target;
    let validate = cli.validate;
    let request = plan_request(cli);

    if validate {
        let checked = executor
            .validate(&request)
            .context("Metadata validation failed")?;
        eprintln!("{checked} operations resolved");
        return Ok(());
    }

    let report = executor
        .execute(&request)
        .with_context(|| format!("Failed to generate target '{target}'"))?;
    eprintln!("Wrote {} files", report.written.len());
    if report.formatter_failures > 0 {
        eprintln!("Some output was left unformatted; see the warnings above");
    }
    Ok(())
}

fn plan_request(cli: Cli) -> PlanRequest {
    PlanRequest {
        work_dir: cli.work_dir,
        metadata: cli.metadata,
        openapi_spec: cli.openapi_yaml_spec,
        operation_id: cli.openapi_operation_id,
        service_type: cli.service_type,
        api_version: cli.api_version,
        service: cli.service,
        resource: cli.resource,
        module: cli.module,
        class_name: cli.class_name,
        route_map: cli.route_map,
        prose: cli.prose,
        ..PlanRequest::new(cli.target)
    }
}

/// One-line report of an error and every cause under it.
fn diagnostic(err: &anyhow::Error) -> String {
    format!("error: {err:#}")
}

/// Install the log subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,apigen=info,apigen_build=info,apigen_core=info".to_string(),
            2 => "info,apigen=debug,apigen_build=debug,apigen_core=debug".to_string(),
            _ => "debug,apigen=trace,apigen_build=trace,apigen_core=trace".to_string(),
        },
    };
    let filter = EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(verbose >= 2)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}
