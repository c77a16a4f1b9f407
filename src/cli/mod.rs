//! Command-line interface for bzljvm.
//!
//! A diagnostic front end over the library: it reads aspect records from a
//! JSON file (the structured output of the Bazel aspect) and answers the same
//! questions the IDE integration asks.
//!
//! # Available Commands
//!
//! - `roots` - labels nothing else depends on
//! - `leaves` - labels that depend on nothing
//! - `order` - order labels so dependencies come first
//! - `cycles` - groups of labels that depend on each other
//! - `classpath` - resolve the classpath of a project's targets
//!
//! # Examples
//!
//! ```bash
//! bzljvm roots --records aspect.json
//! bzljvm leaves --records aspect.json --ignore-externals
//! bzljvm order --records aspect.json //projects/app //projects/libs
//! bzljvm classpath --records aspect.json -p app -t //projects/app:app --format json
//! ```
//!
//! # Output
//!
//! Results go to stdout, either as colored text or as JSON (`--format json`).
//! Logs go to stderr so JSON output stays machine readable.

mod classpath;
mod graph;


use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::aspect::{DependencyRecord, load_records};
use crate::config::ResolverConfig;
use crate::graph::LabelGraph;
use crate::label::Label;

pub use classpath::ClasspathCommand;
pub use graph::{CyclesCommand, LeavesCommand, OrderCommand, RootsCommand};

/// Runtime configuration for CLI execution.
///
/// Built from the global flags by [`Cli::build_config`]; tests construct it
/// directly.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Default log filter, e.g. `"debug"`. `None` disables logging.
    ///
    /// `RUST_LOG` takes precedence when set.
    pub log_level: Option<String>,

    /// Resolver configuration file given with `--config`.
    pub config_path: Option<PathBuf>,

    /// Workspace root used to find `bzljvm.toml` and `bazel-bin`.
    pub workspace: PathBuf,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            config_path: None,
            workspace: PathBuf::from("."),
        }
    }
}

impl CliConfig {
    /// Create a config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global tracing subscriber, writing to stderr.
    ///
    /// Safe to call more than once; later calls are ignored.
    pub fn init_logging(&self) {
        let Some(level) = &self.log_level else {
            return;
        };

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Main CLI application structure for bzljvm
#[derive(Parser, Debug)]
#[command(
    name = "bzljvm",
    about = "Bazel label graphs and JVM classpaths for IDE integration",
    version,
    author,
    long_about = "bzljvm builds dependency graphs from Bazel aspect output and resolves the JVM classpath of IDE projects."
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging.
    ///
    /// Equivalent to `RUST_LOG=debug`. Mutually exclusive with `--quiet`.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all logging. Command output is unaffected.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a resolver configuration file.
    ///
    /// Defaults to `bzljvm.toml` in the workspace root, if present.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Workspace root.
    #[arg(short, long, global = true, default_value = ".")]
    workspace: PathBuf,
}

/// Available subcommands for the bzljvm CLI.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List root labels (nothing depends on them)
    Roots(RootsCommand),

    /// List leaf labels (they depend on nothing)
    Leaves(LeavesCommand),

    /// Order labels so every label comes after its dependencies
    Order(OrderCommand),

    /// Report groups of labels that depend on each other
    Cycles(CyclesCommand),

    /// Resolve the classpath of a project
    Classpath(ClasspathCommand),
}

impl Cli {
    /// Execute the CLI with configuration built from its flags.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Build a [`CliConfig`] from the parsed CLI arguments.
    ///
    /// `--verbose` selects debug logging, `--quiet` disables it, and the
    /// default is info.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("info".to_string())
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
            workspace: self.workspace.clone(),
        }
    }

    /// Execute the CLI with a specific configuration.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        let settings =
            ResolverConfig::load_or_default(config.config_path.as_deref(), &config.workspace)
                .await?;
        tracing::debug!("Using resolver configuration {:?}", settings);

        match self.command {
            Commands::Roots(cmd) => cmd.execute(&settings).await,
            Commands::Leaves(cmd) => cmd.execute(&settings).await,
            Commands::Order(cmd) => cmd.execute(&settings).await,
            Commands::Cycles(cmd) => cmd.execute(&settings).await,
            Commands::Classpath(cmd) => cmd.execute(&settings, &config.workspace).await,
        }
    }
}

/// How results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored, human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Arguments shared by every command that reads aspect records.
#[derive(Args, Debug, Clone)]
pub struct RecordsArgs {
    /// JSON file containing an array of aspect records
    #[arg(short, long)]
    records: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Build the graph over targets instead of packages
    #[arg(long)]
    target_granularity: bool,
}

impl RecordsArgs {
    fn records_path(&self) -> &Path {
        &self.records
    }

    async fn load(&self) -> Result<Vec<DependencyRecord>> {
        load_records(self.records_path()).await
    }

    async fn load_graph(&self, config: &ResolverConfig) -> Result<LabelGraph> {
        let records = self.load().await?;
        let builder = config
            .graph_builder()
            .with_target_granularity(config.include_target_granularity || self.target_granularity);
        Ok(builder.build(&records))
    }

    fn uses_target_granularity(&self, config: &ResolverConfig) -> bool {
        config.include_target_granularity || self.target_granularity
    }
}

/// Every label that appears in the graph, sorted.
fn all_labels(graph: &LabelGraph) -> BTreeSet<&Label> {
    graph.depends_on_map().keys().chain(graph.used_by_map().keys()).collect()
}
