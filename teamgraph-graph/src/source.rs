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

//! Document sources
//!
//! The engine does not collect activity itself. A [`DocumentSource`]
//! supplies the normalized documents of a build scope (a project branch);
//! a source that cannot answer at all is a collaborator failure and fails
//! the build, while bad individual records are only skipped.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use teamgraph_core::{parse_documents, DocumentBatch, NormalizedDocument};
use tracing::debug;

use crate::error::SourceError;

/// Branch used when a scope does not name one
pub const DEFAULT_BRANCH: &str = "main";

/// A project branch whose activity forms one graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildScope {
    pub project: String,
    #[serde(default = "default_branch")]
    pub branch: String,
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

impl BuildScope {
    pub fn new(project: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            branch: branch.into(),
        }
    }

    /// Scope on the default branch
    pub fn project(project: impl Into<String>) -> Self {
        Self::new(project, DEFAULT_BRANCH)
    }

    /// `project:branch`
    pub fn cache_key(&self) -> String {
        format!("{}:{}", self.project, self.branch)
    }

    /// File-system safe form, `project_branch`
    pub fn file_stem(&self) -> String {
        format!("{}_{}", sanitize(&self.project), sanitize(&self.branch))
    }
}

impl std::fmt::Display for BuildScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.project, self.branch)
    }
}

fn sanitize(part: &str) -> String {
    part.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '^' | '~' | ':' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect()
}

/// Supplies the documents of a build scope
pub trait DocumentSource: Send + Sync {
    fn fetch(&self, scope: &BuildScope) -> Result<DocumentBatch, SourceError>;
}

/// Reads `<dir>/<project>_<branch>.json` (a JSON array) or `.jsonl`
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    dir: PathBuf,
}

impl JsonFileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Candidate paths for a scope, in lookup order
    pub fn paths(&self, scope: &BuildScope) -> [PathBuf; 2] {
        let stem = scope.file_stem();
        [
            self.dir.join(format!("{stem}.json")),
            self.dir.join(format!("{stem}.jsonl")),
        ]
    }
}

impl DocumentSource for JsonFileSource {
    fn fetch(&self, scope: &BuildScope) -> Result<DocumentBatch, SourceError> {
        for path in self.paths(scope) {
            match std::fs::read_to_string(&path) {
                Ok(raw) => {
                    let batch = parse_documents(&raw)?;
                    debug!(
                        path = %path.display(),
                        documents = batch.documents.len(),
                        malformed = batch.failures.len(),
                        "Loaded documents"
                    );
                    return Ok(batch);
                }
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(SourceError::Io(e)),
            }
        }

        Err(SourceError::Unavailable {
            scope: scope.cache_key(),
            reason: format!("no document file in {}", self.dir.display()),
        })
    }
}

/// In-memory source, keyed by scope
#[derive(Debug, Default)]
pub struct MemorySource {
    scopes: RwLock<HashMap<BuildScope, Vec<NormalizedDocument>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the documents of a scope
    pub fn insert(&self, scope: BuildScope, documents: Vec<NormalizedDocument>) {
        self.scopes.write().insert(scope, documents);
    }

    pub fn remove(&self, scope: &BuildScope) -> Option<Vec<NormalizedDocument>> {
        self.scopes.write().remove(scope)
    }
}

impl DocumentSource for MemorySource {
    fn fetch(&self, scope: &BuildScope) -> Result<DocumentBatch, SourceError> {
        let scopes = self.scopes.read();
        let documents = scopes.get(scope).ok_or_else(|| SourceError::Unavailable {
            scope: scope.cache_key(),
            reason: "scope not registered".to_string(),
        })?;

        Ok(DocumentBatch {
            documents: documents.clone(),
            failures: Vec::new(),
        })
    }
}
