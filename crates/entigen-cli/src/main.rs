mod logging;
mod settings;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use entigen_core::{
    Error as CoreError, RelationGraphReport, Schema, build_relation_graph_report, parse_schema,
};
use entigen_generate::{CodeArtifact, GenerationEngine, GenerationError};
use logging::{LoggingError, init_logging};
use serde::Serialize;
use settings::{Overrides, SETTINGS_FILE, SettingsError, init_settings, load_settings};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    Generation(#[from] GenerationError),
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),
    #[error("failed to read schema {path}: {source}")]
    ReadSchema {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("relation graph contains a cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),
}

#[derive(Parser, Debug)]
#[command(name = "entigen", version, about = "Generate Svelte data layers from entity schemas")]
struct Cli {
    /// Append JSON log lines to this file instead of logging to stderr.
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate project files from a schema.
    Generate(GenerateArgs),
    /// Print the normalized schema and every derived artifact as JSON.
    Preview(PreviewArgs),
    /// Print the belongsTo dependency report as JSON.
    Inspect(InspectArgs),
    /// Write a default settings file.
    Init(InitArgs),
}

#[derive(Args, Debug)]
struct OptionArgs {
    /// Settings file; missing files fall back to defaults.
    #[arg(long, value_name = "PATH", default_value = SETTINGS_FILE)]
    config: PathBuf,
    /// Client-side database name.
    #[arg(long)]
    db_name: Option<String>,
    /// Skip the CRUD routes and layout files.
    #[arg(long, default_value_t = false)]
    no_routes: bool,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// YAML schema file.
    #[arg(value_name = "SCHEMA")]
    schema: PathBuf,
    /// Project directory to write into.
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,
    #[command(flatten)]
    options: OptionArgs,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    /// YAML schema file.
    #[arg(value_name = "SCHEMA")]
    schema: PathBuf,
    #[command(flatten)]
    options: OptionArgs,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// YAML schema file.
    #[arg(value_name = "SCHEMA")]
    schema: PathBuf,
    /// Fail when belongsTo references form a cycle.
    #[arg(long, default_value_t = false)]
    strict: bool,
}

#[derive(Args, Debug)]
struct InitArgs {
    /// Where to write the settings file.
    #[arg(long, value_name = "PATH", default_value = SETTINGS_FILE)]
    config: PathBuf,
}

#[derive(Serialize)]
struct PreviewOutput<'a> {
    schema: &'a Schema,
    artifacts: &'a [CodeArtifact],
}

#[derive(Serialize)]
struct InspectOutput<'a> {
    entities: Vec<&'a str>,
    join_tables: Vec<&'a str>,
    graph: RelationGraphReport,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(cli.log_file.as_deref()) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }

    let outcome = match cli.command {
        Command::Generate(args) => run_generate(args).await,
        Command::Preview(args) => run_preview(args).await,
        Command::Inspect(args) => run_inspect(args).await,
        Command::Init(args) => run_init(args).await,
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            if let CliError::Generation(GenerationError::Failed(report)) = &err {
                for failure in &report.failures {
                    eprintln!("  {}: {}", failure.path, failure.error);
                }
            }
            ExitCode::FAILURE
        }
    }
}

async fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let GenerateArgs {
        schema,
        out,
        options,
    } = args;

    let run_id = Uuid::new_v4().to_string();
    let started_at = chrono::Utc::now();
    let timer = Instant::now();

    let engine = build_engine(&options, out)?;
    tracing::info!(
        event = "run_started",
        run_id = %run_id,
        started_at = %started_at.to_rfc3339(),
        schema = %schema.display(),
        out_dir = %engine.options().out_dir.display()
    );

    let yaml = read_schema(&schema).await?;
    let result = engine.run_yaml(&yaml).await?;

    tracing::info!(
        event = "run_finished",
        run_id = %run_id,
        status = "success",
        written = result.report.artifacts_written,
        duration_ms = timer.elapsed().as_millis() as u64
    );
    println!(
        "wrote {} files to {}",
        result.report.artifacts_written,
        result.out_dir.display()
    );
    Ok(())
}

async fn run_preview(args: PreviewArgs) -> Result<(), CliError> {
    let engine = build_engine(&args.options, None)?;
    let schema = parse_schema(&read_schema(&args.schema).await?)?;
    let artifacts = engine.preview(&schema)?;
    tracing::info!(event = "preview_derived", artifacts = artifacts.len());

    let output = PreviewOutput {
        schema: &schema,
        artifacts: &artifacts,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run_inspect(args: InspectArgs) -> Result<(), CliError> {
    let schema = parse_schema(&read_schema(&args.schema).await?)?;
    let graph = build_relation_graph_report(&schema);

    if args.strict {
        if let Some(cycle) = &graph.cycle {
            return Err(CliError::Cycle(cycle.clone()));
        }
    }

    let output = InspectOutput {
        entities: schema.entities.keys().map(String::as_str).collect(),
        join_tables: schema.join_tables.keys().map(String::as_str).collect(),
        graph,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run_init(args: InitArgs) -> Result<(), CliError> {
    if init_settings(&args.config).await? {
        tracing::info!(event = "settings_written", path = %args.config.display());
        println!("wrote {}", args.config.display());
    } else {
        println!("{} already exists", args.config.display());
    }
    Ok(())
}

fn build_engine(options: &OptionArgs, out: Option<PathBuf>) -> Result<GenerationEngine, CliError> {
    let settings = load_settings(&options.config)?;
    let options = settings.into_options(Overrides {
        out_dir: out,
        db_name: options.db_name.clone(),
        no_routes: options.no_routes,
    });
    Ok(GenerationEngine::new(options))
}

async fn read_schema(path: &Path) -> Result<String, CliError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::ReadSchema {
            path: path.display().to_string(),
            source,
        })
}
