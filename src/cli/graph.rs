//! Graph query commands: `roots`, `leaves`, `order` and `cycles`.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::{OutputFormat, RecordsArgs, all_labels};
use crate::config::ResolverConfig;
use crate::core::BzlError;
use crate::graph::OrderingStrategy;
use crate::label::Label;

fn print_labels<'a, I>(title: &str, labels: I, format: OutputFormat) -> Result<()>
where
    I: IntoIterator<Item = &'a Label>,
{
    let labels: Vec<&str> = labels.into_iter().map(Label::as_str).collect();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&labels)?),
        OutputFormat::Text => {
            println!("{} ({})", title.bold(), labels.len());
            if labels.is_empty() {
                println!("  {}", "(none)".dimmed());
            }
            for label in labels {
                println!("  {}", colorize(label));
            }
        }
    }
    Ok(())
}

fn colorize(label: &str) -> colored::ColoredString {
    if label.starts_with(crate::constants::EXTERNAL_REPO_PREFIX) {
        label.cyan()
    } else {
        label.normal()
    }
}

/// List labels that nothing depends on.
#[derive(Args, Debug)]
pub struct RootsCommand {
    #[command(flatten)]
    input: RecordsArgs,
}

impl RootsCommand {
    /// Print the root labels of the graph.
    pub async fn execute(self, config: &ResolverConfig) -> Result<()> {
        let graph = self.input.load_graph(config).await?;
        print_labels("Root labels", graph.root_labels(), self.input.format)
    }
}

/// List labels that depend on nothing.
#[derive(Args, Debug)]
pub struct LeavesCommand {
    #[command(flatten)]
    input: RecordsArgs,

    /// Treat labels whose only dependencies are external as leaves, and omit
    /// external labels themselves
    #[arg(long)]
    ignore_externals: bool,
}

impl LeavesCommand {
    /// Print the leaf labels of the graph.
    pub async fn execute(self, config: &ResolverConfig) -> Result<()> {
        let graph = self.input.load_graph(config).await?;
        print_labels(
            "Leaf labels",
            graph.leaf_labels(self.ignore_externals),
            self.input.format,
        )
    }
}

/// Order labels so dependencies come first.
#[derive(Args, Debug)]
pub struct OrderCommand {
    #[command(flatten)]
    pub(super) input: RecordsArgs,

    /// Labels to order; every label in the graph when omitted
    pub(super) labels: Vec<String>,

    /// Ordering algorithm (topological or insertion); overrides the config file
    #[arg(long)]
    pub(super) strategy: Option<OrderingStrategy>,

    /// Follow dependencies through external repositories
    #[arg(long)]
    follow_externals: bool,
}

impl OrderCommand {
    /// Print the selected labels in dependency order.
    pub async fn execute(self, config: &ResolverConfig) -> Result<()> {
        let graph = self.input.load_graph(config).await?;
        let target_granularity = self.input.uses_target_granularity(config);

        let selected: Vec<Label> = if self.labels.is_empty() {
            all_labels(&graph).into_iter().cloned().collect()
        } else {
            self.labels
                .iter()
                .map(|raw| -> Result<Label, BzlError> {
                    let label = Label::parse(raw)?;
                    Ok(if target_granularity {
                        label
                    } else {
                        label.package_label()
                    })
                })
                .collect::<Result<_, _>>()?
        };

        let strategy = self.strategy.unwrap_or(config.ordering);
        let follow = self.follow_externals || config.follow_external_transitives;
        let ordered = graph.order_labels_with(&selected, follow, strategy);

        match self.input.format {
            OutputFormat::Json => {
                let labels: Vec<&str> = ordered.iter().map(Label::as_str).collect();
                println!("{}", serde_json::to_string_pretty(&labels)?);
            }
            OutputFormat::Text => {
                println!("{} ({:?})", "Dependency order".bold(), strategy);
                for (position, label) in ordered.iter().enumerate() {
                    println!("  {:>3}. {}", position + 1, colorize(label.as_str()));
                }
            }
        }
        Ok(())
    }
}

/// Report dependency cycles.
#[derive(Args, Debug)]
pub struct CyclesCommand {
    #[command(flatten)]
    input: RecordsArgs,
}

impl CyclesCommand {
    /// Print every strongly connected group of labels.
    pub async fn execute(self, config: &ResolverConfig) -> Result<()> {
        let graph = self.input.load_graph(config).await?;
        let cycles = graph.find_cycles();

        match self.input.format {
            OutputFormat::Json => {
                let groups: Vec<Vec<&str>> = cycles
                    .iter()
                    .map(|group| group.iter().map(Label::as_str).collect())
                    .collect();
                println!("{}", serde_json::to_string_pretty(&groups)?);
            }
            OutputFormat::Text if cycles.is_empty() => {
                println!("{}", "No dependency cycles found".green());
            }
            OutputFormat::Text => {
                for group in &cycles {
                    let Some(first) = group.first() else {
                        continue;
                    };
                    let mut path: Vec<&str> = group.iter().map(Label::as_str).collect();
                    path.push(first.as_str());
                    let diagnostic = BzlError::CyclicPathDetected {
                        label: first.to_string(),
                        path: path.join(" -> "),
                    };
                    println!("{} {}", "cycle:".yellow().bold(), diagnostic);
                }
            }
        }
        Ok(())
    }
}
