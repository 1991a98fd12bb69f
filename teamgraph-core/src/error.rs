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

//! Error types shared across the workspace

use thiserror::Error;

use crate::state::InvalidTransition;

/// Result type for core operations
pub type Result<T> = std::result::Result<T, TeamGraphError>;

/// A single input document that could not be used.
///
/// These are item-level errors: they are recorded against the offending
/// document and the build continues with the rest of the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// A field required for the document's kind is absent or empty
    #[error("document {document_id}: missing required field `{field}`")]
    MissingField {
        document_id: String,
        field: &'static str,
    },

    /// Text carries NUL bytes or lossy-decoding replacement characters
    #[error("document {document_id}: unexpected text encoding")]
    InvalidEncoding { document_id: String },

    /// The raw record could not be decoded into a document at all
    #[error("record #{index}{}: {reason}", id_suffix(.document_id))]
    Malformed {
        index: usize,
        document_id: Option<String>,
        reason: String,
    },
}

impl DocumentError {
    /// Id of the offending document, when one could be recovered
    pub fn document_id(&self) -> Option<&str> {
        match self {
            DocumentError::MissingField { document_id, .. }
            | DocumentError::InvalidEncoding { document_id } => Some(document_id),
            DocumentError::Malformed { document_id, .. } => document_id.as_deref(),
        }
    }
}

fn id_suffix(document_id: &Option<String>) -> String {
    document_id
        .as_deref()
        .map(|id| format!(" ({id})"))
        .unwrap_or_default()
}

/// Errors surfaced by core operations
#[derive(Debug, Error)]
pub enum TeamGraphError {
    /// Document validation error
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Build lifecycle error
    #[error(transparent)]
    Transition(#[from] InvalidTransition),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Input batch was not a JSON array or JSON lines
    #[error("Invalid document batch: {0}")]
    InvalidBatch(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_display_includes_id() {
        let err = DocumentError::Malformed {
            index: 3,
            document_id: Some("commit_abc".to_string()),
            reason: "missing field `timestamp`".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "record #3 (commit_abc): missing field `timestamp`"
        );
        assert_eq!(err.document_id(), Some("commit_abc"));
    }

    #[test]
    fn test_malformed_display_without_id() {
        let err = DocumentError::Malformed {
            index: 0,
            document_id: None,
            reason: "expected object".to_string(),
        };
        assert_eq!(err.to_string(), "record #0: expected object");
        assert_eq!(err.document_id(), None);
    }
}
