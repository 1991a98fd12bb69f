// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Teamgraph CLI
//!
//! Builds knowledge graphs from normalized activity documents and answers
//! lookups against them.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use teamgraph_core::{parse_documents, EntityId, EntityKind, Graph};
use teamgraph_graph::{
    BuildReport, BuildScope, FailedBuild, GraphBuildConfig, GraphBuilder, GraphQuery, JsonFileSource,
    SourceError,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "teamgraph")]
#[command(about = "Teamgraph - knowledge graphs from team activity", long_about = None)]
struct Cli {
    /// Engine configuration (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose mode
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a graph and write it as JSON
    Build {
        /// Documents file (JSON array or JSON lines), or a directory of
        /// `<project>_<branch>.json` files
        #[arg(short, long)]
        input: PathBuf,

        /// Project, when reading from a directory
        #[arg(long)]
        project: Option<String>,

        /// Branch, when reading from a directory
        #[arg(long, default_value = "main")]
        branch: String,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Look up an entity by id or name in a freshly built graph
    Lookup {
        /// Documents file or directory (see `build`)
        #[arg(short, long)]
        input: PathBuf,

        #[arg(long)]
        project: Option<String>,

        #[arg(long, default_value = "main")]
        branch: String,

        /// Entity id, label or alias
        entity: String,

        /// Restrict name matches to one kind
        #[arg(long, value_enum)]
        kind: Option<KindArg>,

        /// List entities of this kind related to the match
        #[arg(long, value_enum)]
        related: Option<KindArg>,

        /// Hop limit for --related
        #[arg(long, default_value = "2")]
        hops: usize,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Commit,
    Author,
    File,
    Technology,
    Decision,
}

impl From<KindArg> for EntityKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Commit => EntityKind::Commit,
            KindArg::Author => EntityKind::Author,
            KindArg::File => EntityKind::File,
            KindArg::Technology => EntityKind::Technology,
            KindArg::Decision => EntityKind::Decision,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging (stderr, so stdout stays clean JSON)
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => GraphBuildConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => GraphBuildConfig::default(),
    };
    let builder = GraphBuilder::new(config).context("Failed to create graph builder")?;

    match cli.command {
        Commands::Build {
            input,
            project,
            branch,
            output,
            pretty,
        } => {
            let report = match run_build(&builder, &input, project, branch) {
                Ok(report) => report,
                Err(failed) => {
                    write_graph(&failed.graph, output.as_deref(), pretty)?;
                    return Err(failed).context("Graph build failed");
                }
            };

            for failure in &report.failures {
                warn!(
                    document_id = ?failure.document_id,
                    stage = ?failure.stage,
                    reason = %failure.reason,
                    "Skipped document"
                );
            }
            info!(
                nodes = report.graph.nodes.len(),
                links = report.graph.links.len(),
                skipped = report.failures.len(),
                "Build complete"
            );
            write_graph(&report.graph, output.as_deref(), pretty)?;
        }

        Commands::Lookup {
            input,
            project,
            branch,
            entity,
            kind,
            related,
            hops,
        } => {
            let report = run_build(&builder, &input, project, branch)
                .context("Graph build failed")?;
            lookup(&report.graph, &entity, kind.map(Into::into), related.map(Into::into), hops)?;
        }
    }

    Ok(())
}

/// Build from a documents file, or from a directory through the file source
fn run_build(
    builder: &GraphBuilder,
    input: &Path,
    project: Option<String>,
    branch: String,
) -> std::result::Result<BuildReport, FailedBuild> {
    if input.is_dir() {
        let project = project.unwrap_or_else(|| {
            input
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default()
        });
        let scope = BuildScope::new(project, branch);
        info!(scope = %scope, dir = %input.display(), "Building from directory");
        return builder.build_from_source(&JsonFileSource::new(input), &scope);
    }

    let documents = std::fs::read_to_string(input)
        .map_err(SourceError::from)
        .and_then(|raw| parse_documents(&raw).map_err(Into::into))
        .map_err(|e| {
            tracing::error!(input = %input.display(), error = %e, "Failed to read documents");
            FailedBuild::new(e)
        })?;

    for failure in &documents.failures {
        warn!(error = %failure, "Skipping malformed record");
    }
    Ok(builder.build(&documents.documents))
}

fn write_graph(graph: &Graph, output: Option<&Path>, pretty: bool) -> Result<()> {
    let json = if pretty {
        graph.to_json_pretty()?
    } else {
        graph.to_json()?
    };

    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✓ Graph written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn lookup(
    graph: &Graph,
    needle: &str,
    kind: Option<EntityKind>,
    related: Option<EntityKind>,
    hops: usize,
) -> Result<()> {
    let query = GraphQuery::new(graph);

    let matches = match query.lookup(&EntityId::from_raw(needle)) {
        Some(entity) => vec![entity],
        None => query.find(needle, kind),
    };
    if matches.is_empty() {
        bail!("No entity matches {needle:?}");
    }

    for entity in matches {
        println!("{} [{}] {}", entity.id, entity.kind(), entity.label);
        println!("  Importance: {:.2}", entity.importance);
        if let Some(url) = &entity.source_url {
            println!("  Source: {url}");
        }

        match related {
            Some(kind) => {
                let found = query.related(&entity.id, kind, hops);
                println!("  Related {kind} ({}):", found.len());
                for item in found {
                    println!(
                        "    {} {} (hops {}, confidence {:.2})",
                        item.entity.id, item.entity.label, item.hops, item.confidence
                    );
                }
            }
            None => {
                let neighbors = query.neighbors(&entity.id);
                println!("  Neighbors ({}):", neighbors.len());
                for neighbor in neighbors {
                    println!(
                        "    {:?} {} {} [{}] (confidence {:.2})",
                        neighbor.direction,
                        neighbor.relation,
                        neighbor.entity.label,
                        neighbor.entity.kind(),
                        neighbor.confidence
                    );
                }
            }
        }
    }

    Ok(())
}
