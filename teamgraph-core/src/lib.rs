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

//! Teamgraph Core
//!
//! Closed data model shared by the knowledge graph engine and its callers:
//! normalized input documents, typed entities and relationships, the
//! serialized graph shape, deterministic ids and the build lifecycle.
//!
//! ```text
//! NormalizedDocument ──► Entity / Relationship ──► Graph { nodes, links, stats }
//!   (code-change,          (Commit, Author, File,      (sorted, deduplicated,
//!    message, page-edit)    Technology, Decision)       byte-stable JSON)
//! ```

pub mod document;
pub mod entity;
pub mod error;
pub mod graph;
pub mod id;
pub mod relationship;
pub mod state;

pub use document::{
    parse_documents, DocumentBatch, DocumentKind, DocumentOrigin, DocumentRefs, NormalizedDocument,
};
pub use entity::{Entity, EntityAttributes, EntityKind};
pub use error::{DocumentError, Result, TeamGraphError};
pub use graph::{Graph, GraphStats};
pub use id::{stable_id, EntityId};
pub use relationship::{RelationType, Relationship};
pub use state::{BuildEvent, BuildState, InvalidTransition};
