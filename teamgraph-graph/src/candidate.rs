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

//! Entity candidates
//!
//! A candidate is an unresolved entity mention produced by extraction. It
//! keeps the evidence (document, time, URL) identity resolution needs to
//! pick a representative and build the canonical entity.

use chrono::{DateTime, Utc};
use teamgraph_core::{DocumentKind, EntityKind, NormalizedDocument};

/// Identifies a candidate: the producing document plus its position
/// in that document's candidate list.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CandidateId {
    pub document_id: String,
    pub ordinal: u32,
}

/// What was mentioned, in surface form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateSeed {
    Commit { sha: String, message: String },
    Author { identity: String },
    File { path: String },
    /// Canonical technology name from the lookup table
    Technology { name: String },
    Decision { statement: String },
}

impl CandidateSeed {
    pub fn kind(&self) -> EntityKind {
        match self {
            CandidateSeed::Commit { .. } => EntityKind::Commit,
            CandidateSeed::Author { .. } => EntityKind::Author,
            CandidateSeed::File { .. } => EntityKind::File,
            CandidateSeed::Technology { .. } => EntityKind::Technology,
            CandidateSeed::Decision { .. } => EntityKind::Decision,
        }
    }
}

/// An unresolved entity mention with its evidence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityCandidate {
    pub id: CandidateId,
    pub document_kind: DocumentKind,
    pub timestamp: DateTime<Utc>,
    pub source_url: Option<String>,
    pub seed: CandidateSeed,
}

impl EntityCandidate {
    /// Attach document evidence to a seed
    pub fn from_document(doc: &NormalizedDocument, ordinal: u32, seed: CandidateSeed) -> Self {
        Self {
            id: CandidateId {
                document_id: doc.id.clone(),
                ordinal,
            },
            document_kind: doc.kind(),
            timestamp: doc.timestamp,
            source_url: doc.source_url.clone(),
            seed,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.seed.kind()
    }

    pub fn document_id(&self) -> &str {
        &self.id.document_id
    }
}
