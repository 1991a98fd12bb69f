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

//! Engine error types

use serde::Serialize;
use teamgraph_core::{DocumentError, EntityKind, TeamGraphError};
use thiserror::Error;

/// Result type for engine operations
pub type GraphResult<T> = Result<T, GraphError>;

/// Extraction failure for a single document
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    #[error(transparent)]
    InvalidDocument(#[from] DocumentError),
}

/// Inference failure for a single document
#[derive(Debug, Clone, Error)]
pub enum InferError {
    /// A candidate of this document has no resolved entity
    #[error("document {document_id}: unresolved {kind} candidate")]
    Unresolved {
        document_id: String,
        kind: EntityKind,
    },
}

/// Document source (collaborator) failure
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source cannot supply any documents for the scope
    #[error("Document source unavailable for {scope}: {reason}")]
    Unavailable { scope: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Decode(#[from] TeamGraphError),
}

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid decision pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors that can occur while setting up or running a build
#[derive(Debug, Error)]
pub enum GraphError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Core(#[from] TeamGraphError),
}

/// Pipeline stage a skipped item failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Decoding,
    Extraction,
    Inference,
}

/// A document skipped during a build. The build continues without it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub document_id: Option<String>,
    pub stage: FailureStage,
    pub reason: String,
}

impl ItemFailure {
    pub fn decoding(error: &DocumentError) -> Self {
        Self {
            document_id: error.document_id().map(str::to_string),
            stage: FailureStage::Decoding,
            reason: error.to_string(),
        }
    }

    pub fn extraction(document_id: &str, error: &ExtractError) -> Self {
        Self {
            document_id: Some(document_id.to_string()),
            stage: FailureStage::Extraction,
            reason: error.to_string(),
        }
    }

    pub fn inference(document_id: &str, error: &InferError) -> Self {
        Self {
            document_id: Some(document_id.to_string()),
            stage: FailureStage::Inference,
            reason: error.to_string(),
        }
    }
}
