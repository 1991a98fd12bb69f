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

//! Graph builder
//!
//! Runs the pipeline over a batch of documents:
//!
//! ```text
//! documents ─► dedupe ─► extract (parallel) ─► resolve ─► infer (parallel) ─► assemble
//!   Idle       Extracting                     Resolving   Inferring          Assembling ─► Done
//! ```
//!
//! A build over documents never fails: bad documents are skipped and
//! reported. Only a collaborator that cannot supply documents at all fails
//! a build, and a failed build carries the empty graph.

use std::cmp::Ordering;
use std::time::Instant;

use serde::Serialize;
use teamgraph_core::{BuildEvent, BuildState, Graph, NormalizedDocument};
use thiserror::Error;
use tracing::{debug, error, info, info_span, warn};

use crate::assembler::{AssemblyReport, GraphAssembler};
use crate::cache::{Clock, GraphCache};
use crate::confidence::ConfidenceModel;
use crate::config::GraphBuildConfig;
use crate::error::{GraphError, GraphResult, ItemFailure};
use crate::extractor::EntityExtractor;
use crate::inferencer::RelationshipInferencer;
use crate::resolver::IdentityResolver;
use crate::rules::{default_rules, EntityRule};
use crate::source::{BuildScope, DocumentSource};

/// Outcome of a successful build
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub graph: Graph,
    /// Documents skipped, with the stage they failed in
    pub failures: Vec<ItemFailure>,
    pub assembly: AssemblyReport,
    /// Distinct documents considered
    pub documents: usize,
    /// Input records dropped because their id was already seen
    pub duplicate_documents: usize,
    pub state: BuildState,
}

/// A build that could not run. `graph` is always the empty graph.
#[derive(Debug, Error)]
#[error("Graph build failed: {error}")]
pub struct FailedBuild {
    #[source]
    pub error: GraphError,
    pub graph: Graph,
    pub state: BuildState,
}

impl FailedBuild {
    /// Wrap an error that stopped the build before it produced anything
    pub fn new(error: impl Into<GraphError>) -> Self {
        Self {
            error: error.into(),
            graph: Graph::empty(),
            state: BuildState::Failed,
        }
    }
}

/// Knowledge graph builder
pub struct GraphBuilder {
    config: GraphBuildConfig,
    extractor: EntityExtractor,
    resolver: IdentityResolver,
    inferencer: RelationshipInferencer,
    assembler: GraphAssembler,
    pool: rayon::ThreadPool,
}

impl std::fmt::Debug for GraphBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphBuilder")
            .field("extractor", &self.extractor)
            .field("workers", &self.pool.current_num_threads())
            .finish()
    }
}

impl GraphBuilder {
    /// Create a builder with the built-in extraction rules
    pub fn new(config: GraphBuildConfig) -> GraphResult<Self> {
        config.validate()?;
        let rules = default_rules(&config.extraction)?;
        Self::with_rules(config, rules)
    }

    /// Create a builder with a custom rule set
    pub fn with_rules(config: GraphBuildConfig, rules: Vec<Box<dyn EntityRule>>) -> GraphResult<Self> {
        config.validate()?;

        let workers = config.worker_threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        });
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("teamgraph-worker-{i}"))
            .build()?;

        Ok(Self {
            extractor: EntityExtractor::with_rules(config.extraction.clone(), rules),
            resolver: IdentityResolver::new(&config),
            inferencer: RelationshipInferencer::new(),
            assembler: GraphAssembler::new(ConfidenceModel::new(config.confidence.clone())),
            pool,
            config,
        })
    }

    pub fn config(&self) -> &GraphBuildConfig {
        &self.config
    }

    /// Build a graph and report what was skipped
    #[tracing::instrument(skip(self, documents), fields(documents = documents.len()))]
    pub fn build(&self, documents: &[NormalizedDocument]) -> BuildReport {
        let started = Instant::now();
        let mut state = BuildState::Idle;

        let (docs, duplicate_documents) = unique_documents(documents);
        advance(&mut state, BuildEvent::DocumentsFetched);

        let extraction = info_span!("extract")
            .in_scope(|| self.pool.install(|| self.extractor.extract_all(&docs)));
        advance(&mut state, BuildEvent::CandidatesExtracted);

        let resolution = info_span!("resolve")
            .in_scope(|| self.resolver.resolve(extraction.candidates()));
        advance(&mut state, BuildEvent::EntitiesResolved);

        let inference = info_span!("infer").in_scope(|| {
            self.pool
                .install(|| self.inferencer.infer_all(&extraction.documents, &resolution))
        });
        advance(&mut state, BuildEvent::EdgesInferred);

        let (graph, assembly) = info_span!("assemble").in_scope(|| {
            self.assembler
                .assemble(resolution.index.into_entities(), inference.edges)
        });
        advance(&mut state, BuildEvent::GraphAssembled);

        let mut failures = extraction.failures;
        failures.extend(inference.failures);

        info!(
            nodes = graph.nodes.len(),
            links = graph.links.len(),
            skipped = failures.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Graph built"
        );

        BuildReport {
            graph,
            failures,
            assembly,
            documents: docs.len(),
            duplicate_documents,
            state,
        }
    }

    /// Build a graph
    pub fn build_graph(&self, documents: &[NormalizedDocument]) -> Graph {
        self.build(documents).graph
    }

    /// Fetch the documents of `scope` and build their graph.
    ///
    /// Records the source could not decode are reported as failures; a
    /// source that cannot answer fails the build.
    pub fn build_from_source(
        &self,
        source: &dyn DocumentSource,
        scope: &BuildScope,
    ) -> Result<BuildReport, FailedBuild> {
        let batch = source.fetch(scope).map_err(|e| {
            error!(scope = %scope, error = %e, "Document source failed");
            FailedBuild::new(e)
        })?;

        let mut report = self.build(&batch.documents);
        let mut failures: Vec<ItemFailure> = batch.failures.iter().map(ItemFailure::decoding).collect();
        failures.append(&mut report.failures);
        report.failures = failures;
        Ok(report)
    }

    /// Serve the graph of `scope` from `cache`, building it on a miss
    pub fn cached_build<C: Clock>(
        &self,
        cache: &GraphCache<C>,
        source: &dyn DocumentSource,
        scope: &BuildScope,
        bypass_cache: bool,
    ) -> Result<std::sync::Arc<Graph>, FailedBuild> {
        cache.get_or_build(scope, bypass_cache, || {
            self.build_from_source(source, scope).map(|report| report.graph)
        })
    }
}

/// Build a graph with the default configuration
pub fn build_graph(documents: &[NormalizedDocument]) -> Graph {
    match GraphBuilder::new(GraphBuildConfig::default()) {
        Ok(builder) => builder.build_graph(documents),
        Err(e) => {
            error!(error = %e, "Failed to create graph builder");
            Graph::empty()
        }
    }
}

/// Deduplicate documents by id. Among records sharing an id, the one
/// ordered first by content wins, so the choice does not depend on
/// input order.
fn unique_documents(documents: &[NormalizedDocument]) -> (Vec<&NormalizedDocument>, usize) {
    let mut docs: Vec<&NormalizedDocument> = documents.iter().collect();
    docs.sort_by(|a, b| compare_documents(a, b));

    let before = docs.len();
    docs.dedup_by(|later, earlier| {
        let duplicate = later.id == earlier.id;
        if duplicate {
            warn!(document_id = %later.id, "Dropping duplicate document id");
        }
        duplicate
    });

    let duplicates = before - docs.len();
    if duplicates > 0 {
        debug!(duplicates, "Deduplicated input documents");
    }
    (docs, duplicates)
}

fn compare_documents(a: &NormalizedDocument, b: &NormalizedDocument) -> Ordering {
    a.id.cmp(&b.id)
        .then_with(|| a.timestamp.cmp(&b.timestamp))
        .then_with(|| a.text.cmp(&b.text))
        .then_with(|| {
            if a == b {
                return Ordering::Equal;
            }
            let a = serde_json::to_string(a).unwrap_or_default();
            let b = serde_json::to_string(b).unwrap_or_default();
            a.cmp(&b)
        })
}

fn advance(state: &mut BuildState, event: BuildEvent) {
    match state.transition(event) {
        Ok(next) => {
            debug!(from = ?state, to = ?next, "Build state");
            *state = next;
        }
        Err(e) => warn!(error = %e, "Ignoring out-of-order build event"),
    }
}
