//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// planlens - Dependency and change analysis for infrastructure plans.
#[derive(Parser, Debug)]
#[command(name = "planlens")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true, env = "PLANLENS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Plan JSON file (bypasses the configuration file).
    #[arg(short, long, global = true)]
    pub plan: Option<PathBuf>,

    /// Dependency graph file in DOT format (used with --plan).
    #[arg(short, long, global = true)]
    pub graph: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a starter planlens.yaml.
    Init {
        /// Directory to initialize (defaults to current directory).
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Force overwrite existing files.
        #[arg(short, long)]
        force: bool,
    },

    /// Validate the configuration.
    Validate {
        /// Treat warnings as errors.
        #[arg(short, long)]
        strict: bool,
    },

    /// Count planned actions and report drift.
    Summary,

    /// Show the canonical dependency graph.
    Graph,

    /// Show everything downstream of a resource.
    Impact {
        /// Resource address or graph label.
        source: String,

        /// Explain why each node is affected.
        #[arg(short, long)]
        explain: bool,
    },

    /// List resources whose state disagrees with configuration.
    Drift,

    /// Find consumers of a module or output.
    Outputs {
        /// Module call or output identifier.
        identifier: String,
    },

    /// Explain the impact of changing a resource.
    Explain {
        /// Resource address or graph label.
        source: String,
    },

    /// Explain what breaks when a resource, variable or output is renamed.
    Refactor {
        /// Address or name of the refactored item.
        subject: String,
    },

    /// Trace where an attribute value comes from.
    Flow {
        /// Resource address.
        address: String,

        /// Attribute name.
        attribute: String,
    },

    /// Summarize a single resource change.
    Resource {
        /// Resource address.
        address: String,
    },

    /// Show the provider schema for a resource type.
    Schema {
        /// Resource type, e.g. `aws_instance`.
        resource_type: String,
    },
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_impact() {
        let cli = Cli::try_parse_from([
            "planlens",
            "--plan",
            "plan.json",
            "impact",
            "aws_vpc.main",
            "--explain",
        ])
        .unwrap();

        assert_eq!(cli.plan, Some(PathBuf::from("plan.json")));
        assert!(matches!(
            cli.command,
            Commands::Impact { ref source, explain: true } if source == "aws_vpc.main"
        ));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["planlens", "flow", "aws_instance.web", "ami", "--output", "json"])
            .unwrap();
        assert!(matches!(cli.output, OutputFormat::Json));
    }

    #[test]
    fn test_command_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
