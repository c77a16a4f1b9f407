//! The `classpath` command.
//!
//! Resolves a project classpath from a records file instead of a live Bazel
//! workspace. The project owns the sources under `--source-dir`; each
//! `--sibling NAME=DIR` declares another workspace project whose sources
//! turn dependencies into project references rather than jars.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;

use super::{OutputFormat, RecordsArgs};
use crate::aspect::{AspectRecords, DependencyRecord};
use crate::classpath::implicit::TestRunnerImplicitDependencies;
use crate::classpath::{
    AspectRecordSource, ClasspathEntry, NoProgress, Project, ProjectModel, ResolvedClasspath,
    SystemClock, WorkspaceClasspath,
};
use crate::config::ResolverConfig;
use crate::core::BzlError;
use crate::label::Label;

/// Resolve the classpath of a project.
#[derive(Args, Debug)]
pub struct ClasspathCommand {
    #[command(flatten)]
    input: RecordsArgs,

    /// Name of the project to resolve
    #[arg(short, long, default_value = "main")]
    project: String,

    /// Targets configured for the project (repeatable)
    #[arg(short, long = "target", required = true)]
    targets: Vec<String>,

    /// Workspace-relative source directory of the project
    #[arg(long)]
    source_dir: Option<String>,

    /// Another project of the workspace, as NAME=DIR (repeatable)
    #[arg(long = "sibling", value_parser = parse_sibling)]
    siblings: Vec<(String, String)>,
}

fn parse_sibling(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, dir)) if !name.trim().is_empty() && !dir.trim().is_empty() => {
            Ok((name.trim().to_string(), dir.trim().to_string()))
        }
        _ => Err(format!("expected NAME=DIR, got '{raw}'")),
    }
}

/// A configured target must name one target, not a pattern.
fn parse_target(raw: &str) -> Result<Label, BzlError> {
    let label = Label::parse(raw)?;
    if !label.is_concrete() {
        return Err(BzlError::InvalidLabel {
            label: raw.to_string(),
            reason: "wildcard patterns cannot be configured as project targets".to_string(),
        });
    }
    Ok(label)
}

impl ClasspathCommand {
    /// Resolve and print the classpath.
    pub async fn execute(self, config: &ResolverConfig, workspace_root: &Path) -> Result<()> {
        let records = self.input.load().await?;
        let targets = self
            .targets
            .iter()
            .map(|raw| parse_target(raw))
            .collect::<Result<Vec<_>, _>>()?;

        let project = Project::new(&self.project);
        let mut model = DirectoryProjectModel::default();
        model.add(project.clone(), self.source_dir.clone(), targets);
        for (name, dir) in &self.siblings {
            model.add(Project::new(name), Some(dir.clone()), Vec::new());
        }

        let implicit = TestRunnerImplicitDependencies::new(config.bazel_bin_dir(workspace_root))
            .with_explicit_java_test_deps(config.explicit_java_test_deps);

        let workspace = WorkspaceClasspath::new(
            config,
            Arc::new(model),
            Arc::new(FileRecordSource::new(records)),
            Arc::new(implicit),
            Arc::new(SystemClock),
        );

        let resolved = workspace.classpath(&project, Arc::new(NoProgress)).await?;
        match self.input.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(resolved.as_ref())?),
            OutputFormat::Text => print_classpath(&project, &resolved),
        }
        workspace.close();
        Ok(())
    }
}

fn describe(entry: &ClasspathEntry) -> String {
    match entry {
        ClasspathEntry::Jar {
            path,
            source_jar: Some(source_jar),
            ..
        } => format!("{path} {}", format!("(sources: {source_jar})").dimmed()),
        ClasspathEntry::Jar {
            path, ..
        } => path.clone(),
        ClasspathEntry::Project {
            project, ..
        } => format!("{} {}", "project".cyan(), project),
    }
}

fn print_section<'a>(title: &str, entries: impl IntoIterator<Item = &'a ClasspathEntry>) {
    let entries: Vec<&ClasspathEntry> = entries.into_iter().collect();
    if entries.is_empty() {
        return;
    }
    println!("{}", title.bold());
    for entry in entries {
        println!("  {}", describe(entry));
    }
}

fn print_classpath(project: &Project, resolved: &ResolvedClasspath) {
    let status = if resolved.is_complete() {
        "complete".green()
    } else {
        "incomplete".yellow()
    };
    println!("Classpath for project {} ({status}, {} entries)", project.to_string().bold(), resolved.len());

    print_section("main:", resolved.main_entries().values());
    print_section("test:", resolved.test_entries().values());
    print_section("implicit:", resolved.implicit_deps());

    if !resolved.project_references().is_empty() {
        let names: Vec<&str> = resolved.project_references().iter().map(Project::name).collect();
        println!("{} {}", "references:".bold(), names.join(", "));
    }

    if !resolved.is_complete() {
        println!("{}", "The classpath may be incomplete; re-run the aspect and try again".yellow());
    }
}

#[derive(Debug)]
struct DirectoryProject {
    project: Project,
    directory: Option<String>,
    targets: Vec<Label>,
}

/// Projects defined by the source directory they own.
#[derive(Debug, Default)]
struct DirectoryProjectModel {
    projects: Vec<DirectoryProject>,
}

impl DirectoryProjectModel {
    fn add(&mut self, project: Project, directory: Option<String>, targets: Vec<Label>) {
        self.projects.push(DirectoryProject {
            project,
            directory: directory.map(|dir| dir.trim_end_matches('/').to_string()),
            targets,
        });
    }
}

impl ProjectModel for DirectoryProjectModel {
    fn owner_project_for_source_path(&self, source_path: &str) -> Option<Project> {
        self.projects
            .iter()
            .filter_map(|candidate| {
                let dir = candidate.directory.as_deref()?;
                let owned = source_path == dir
                    || source_path.strip_prefix(dir).is_some_and(|rest| rest.starts_with('/'));
                owned.then_some((dir.len(), &candidate.project))
            })
            .max_by_key(|(len, _)| *len)
            .map(|(_, project)| project.clone())
    }

    fn configured_targets(&self, project: &Project) -> Result<Vec<Label>, BzlError> {
        self.projects
            .iter()
            .find(|candidate| candidate.project == *project)
            .map(|candidate| candidate.targets.clone())
            .ok_or_else(|| BzlError::ResolutionFailure {
                project: project.name().to_string(),
                reason: "project is not part of the workspace".to_string(),
            })
    }
}

/// Serves records decoded from a file; there is no aspect cache to flush.
#[derive(Debug)]
struct FileRecordSource {
    records: AspectRecords,
}

impl FileRecordSource {
    fn new(records: Vec<DependencyRecord>) -> Self {
        Self {
            records: AspectRecords::from_flat(records),
        }
    }
}

impl AspectRecordSource for FileRecordSource {
    fn fetch_records(&self, targets: &[Label]) -> Result<AspectRecords, BzlError> {
        Ok(self.records.select(targets))
    }

    fn flush_aspect_cache(&self, labels: &[Label]) {
        tracing::warn!(
            "Aspect output for {} target(s) is malformed; regenerate the records file",
            labels.len()
        );
    }
}
