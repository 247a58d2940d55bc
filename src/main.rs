//! planlens CLI entrypoint.
//!
//! This is the main entrypoint for the planlens command-line tool.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use planlens::analysis::RefactorWarning;
use planlens::cli::{Cli, Commands, OutputFormat, OutputFormatter};
use planlens::config::{ConfigParser, ConfigValidator, LensConfig, find_config_file};
use planlens::error::{ConfigError, PlanLensError, Result};
use planlens::schema::SchemaCache;
use planlens::session::AnalysisSession;
use planlens::source::{LocalPlanSource, PlanSource};

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Workspace key for schemas loaded from the command line.
const CLI_WORKSPACE: &str = "default";

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, matches!(cli.output, OutputFormat::Json));

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
///
/// Logs go to stderr so stdout carries only command output.
fn init_logging(verbose: bool, json: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let formatter = OutputFormatter::new(cli.output);

    match &cli.command {
        Commands::Init { path, force } => return cmd_init(path, *force, &formatter),
        Commands::Validate { strict } => {
            return cmd_validate(cli.config.as_ref(), *strict, &formatter);
        }
        _ => {}
    }

    let config = load_config(&cli)?;
    let source: Box<dyn PlanSource> = Box::new(LocalPlanSource::from_config(&config.plan));
    debug!("Loading inputs from {} source", source.source_type());

    let plan = source.load_plan().await?;
    let graph_text = source.load_graph().await?;
    let drafts = config.draft_set();
    let session = AnalysisSession::new(&plan, &graph_text, &config.analysis, &drafts);

    let output = match cli.command {
        Commands::Init { .. } | Commands::Validate { .. } => return Ok(()),
        Commands::Summary => formatter.format_summary(&session.report()),
        Commands::Graph => formatter.format_graph(session.graph()),
        Commands::Impact {
            source: input,
            explain,
        } => {
            let result = session.impact(&session.resolve_input(&input));
            let explanations = if explain {
                session.explain_impact(&result)
            } else {
                Vec::new()
            };
            formatter.format_impact(&result, &explanations)
        }
        Commands::Drift => formatter.format_drift(&session.drift()),
        Commands::Outputs { identifier } => {
            formatter.format_output_usage(&session.output_usage(&identifier))
        }
        Commands::Explain { source: input } => {
            let resolved = session.resolve_input(&input);
            let explanations = session.explain_impact(&session.impact(&resolved));
            formatter.format_explanations(&resolved, &explanations)
        }
        Commands::Refactor { subject } => {
            let explanations = session.explain_refactor(&RefactorWarning::for_address(&subject));
            formatter.format_explanations(&subject, &explanations)
        }
        Commands::Flow { address, attribute } => {
            let steps = session.value_flow(&address, &attribute);
            formatter.format_flow(&address, &attribute, &steps)
        }
        Commands::Resource { address } => {
            let summary = session
                .resource(&address)
                .ok_or_else(|| PlanLensError::not_found(format!("resource change {address}")))?;
            formatter.format_resource(&summary)
        }
        Commands::Schema { resource_type } => {
            let schemas = source
                .load_schemas()
                .await?
                .ok_or_else(|| ConfigError::missing("plan.schemas"))?;

            let mut cache = SchemaCache::new();
            cache.insert(CLI_WORKSPACE, schemas);
            let schema = cache
                .resource_schema(CLI_WORKSPACE, &resource_type)
                .ok_or_else(|| PlanLensError::not_found(format!("schema for {resource_type}")))?;
            formatter.format_schema(&resource_type, schema)
        }
    };

    emit(&output)
}

/// Writes a starter configuration file.
fn cmd_init(path: &Path, force: bool, formatter: &OutputFormatter) -> Result<()> {
    info!("Initializing planlens configuration in: {}", path.display());

    let config_path = path.join("planlens.yaml");

    if !force && config_path.exists() {
        eprintln!("Configuration file already exists: {}", config_path.display());
        eprintln!("Use --force to overwrite.");
        return Ok(());
    }

    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }

    let config_template = include_str!("../templates/planlens.yaml");
    std::fs::write(&config_path, config_template)?;

    emit(&formatter.format_message(&format!("Created {}", config_path.display())))?;

    eprintln!("\nNext steps:");
    eprintln!("  1. Export a plan: terraform show -json plan.out > plan.json");
    eprintln!("  2. Export the graph: terraform graph > graph.dot");
    eprintln!("  3. Run 'planlens validate' to check your configuration");
    eprintln!("  4. Run 'planlens summary' to see what the plan does");

    Ok(())
}

/// Validates the configuration file.
fn cmd_validate(
    config_path: Option<&PathBuf>,
    strict: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let config_file = resolve_config_path(config_path)?;
    info!("Validating configuration: {}", config_file.display());

    let parser = ConfigParser::new().with_base_path(config_dir(&config_file));
    parser.load_dotenv()?;
    let config = parser.load_with_env(&config_file)?;

    let result = ConfigValidator::new().with_strict(strict).validate(&config)?;
    emit(&formatter.format_validation(&result))
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Resolves the configuration file path.
fn resolve_config_path(config_path: Option<&PathBuf>) -> Result<PathBuf> {
    config_path.map_or_else(|| find_config_file("."), |path| Ok(path.clone()))
}

/// Directory that holds a configuration file.
fn config_dir(config_file: &Path) -> &Path {
    config_file.parent().unwrap_or_else(|| Path::new("."))
}

/// Builds the effective configuration.
///
/// `--plan` skips the configuration file; otherwise the file is found,
/// loaded with `.env` and environment overrides, and validated. `--graph`
/// overrides the graph path in both cases.
fn load_config(cli: &Cli) -> Result<LensConfig> {
    let mut config = if let Some(plan) = &cli.plan {
        debug!("Using plan from command line: {}", plan.display());
        let mut config = LensConfig::default();
        ConfigParser::apply_env_overrides(&mut config);
        config.plan.path = plan.display().to_string();
        config
    } else {
        let config_file = match resolve_config_path(cli.config.as_ref()) {
            Ok(path) => path,
            Err(_) if cli.config.is_none() => {
                return Err(ConfigError::missing("--plan or a planlens.yaml file").into());
            }
            Err(e) => return Err(e),
        };
        debug!("Loading configuration from: {}", config_file.display());

        let parser = ConfigParser::new().with_base_path(config_dir(&config_file));
        parser.load_dotenv()?;
        parser.load_with_env(&config_file)?
    };

    if let Some(graph) = &cli.graph {
        config.plan.graph = Some(graph.display().to_string());
    }

    ConfigValidator::new().validate(&config)?;
    Ok(config)
}

/// Writes command output to stdout.
fn emit(output: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    if !output.ends_with('\n') {
        writeln!(stdout)?;
    }
    stdout.flush()?;
    Ok(())
}
