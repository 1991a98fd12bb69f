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

//! Teamgraph Graph Engine
//!
//! Builds a typed, confidence-scored knowledge graph from normalized team
//! activity (commits, chat messages, page edits).
//!
//! ## Pipeline
//!
//! ```text
//! ┌───────────┐   ┌──────────┐   ┌──────────┐   ┌───────────┐   ┌───────────┐
//! │ documents │──►│ extract  │──►│ resolve  │──►│   infer   │──►│ assemble  │──► Graph
//! └───────────┘   └──────────┘   └──────────┘   └───────────┘   └───────────┘
//!                  per-doc,       merge by        per-doc,        merge edges,
//!                  parallel       canonical key   parallel        score, sort
//! ```
//!
//! Identical input always yields a byte-identical graph, whatever the
//! input order or worker count.
//!
//! ## Example
//!
//! ```no_run
//! use teamgraph_graph::{GraphBuildConfig, GraphBuilder};
//! # fn docs() -> Vec<teamgraph_core::NormalizedDocument> { Vec::new() }
//!
//! let builder = GraphBuilder::new(GraphBuildConfig::default())?;
//! let report = builder.build(&docs());
//! println!("{}", report.graph.to_json()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod assembler;
pub mod builder;
pub mod cache;
pub mod candidate;
pub mod confidence;
pub mod config;
pub mod error;
pub mod extractor;
pub mod identity;
pub mod inferencer;
pub mod query;
pub mod resolver;
pub mod rules;
pub mod source;

pub use assembler::{AssemblyReport, GraphAssembler};
pub use builder::{build_graph, BuildReport, FailedBuild, GraphBuilder};
pub use cache::{Clock, GraphCache, GraphCacheStats, ManualClock, SystemClock};
pub use candidate::{CandidateId, CandidateSeed, EntityCandidate};
pub use confidence::ConfidenceModel;
pub use config::{CacheConfig, ConfidenceConfig, ExtractionConfig, GraphBuildConfig, IdentityConfig};
pub use error::{
    ConfigError, ExtractError, FailureStage, GraphError, GraphResult, InferError, ItemFailure,
    SourceError,
};
pub use extractor::EntityExtractor;
pub use inferencer::{EdgeCandidate, RelationshipInferencer};
pub use query::{Direction, GraphQuery, Neighbor, RelatedEntity};
pub use resolver::{EntityIndex, IdentityResolver, Resolution};
pub use rules::{DecisionRule, EntityRule, TechnologyRule};
pub use source::{BuildScope, DocumentSource, JsonFileSource, MemorySource};
