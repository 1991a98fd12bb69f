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

//! Normalized input documents.
//!
//! External collectors turn commits, chat messages and page edits into one
//! common shape. The kind-specific part is a closed tagged union so every
//! extraction and inference rule table can match on it exhaustively.
//!
//! ## Wire format
//!
//! ```json
//! {
//!   "id": "commit_abc123",
//!   "kind": "code-change",
//!   "sha": "abc123",
//!   "timestamp": "2025-03-01T12:00:00Z",
//!   "author_identity": "alice",
//!   "text": "fix auth bug",
//!   "refs": { "files": ["server.go"] },
//!   "source_url": "https://github.com/acme/api/commit/abc123"
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DocumentError, Result, TeamGraphError};

/// Kind of a normalized document (without its payload)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    CodeChange,
    Message,
    PageEdit,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::CodeChange => "code-change",
            DocumentKind::Message => "message",
            DocumentKind::PageEdit => "page-edit",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific document data, tagged by `kind` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DocumentOrigin {
    /// A commit. `sha` may be omitted when `source_url` ends with it.
    CodeChange {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sha: Option<String>,
    },
    /// A chat message
    Message,
    /// A document-page edit
    PageEdit,
}

/// Cross-references carried by a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRefs {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
}

/// A timestamped activity record produced by an external collector.
/// Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedDocument {
    pub id: String,
    #[serde(flatten)]
    pub origin: DocumentOrigin,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub author_identity: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub refs: DocumentRefs,
    #[serde(default)]
    pub source_url: Option<String>,
}

impl NormalizedDocument {
    /// Create a commit document.
    pub fn code_change(
        id: impl Into<String>,
        sha: impl Into<String>,
        timestamp: DateTime<Utc>,
        text: impl Into<String>,
    ) -> Self {
        Self::new(
            id,
            DocumentOrigin::CodeChange {
                sha: Some(sha.into()),
            },
            timestamp,
            text,
        )
    }

    /// Create a chat message document.
    pub fn message(id: impl Into<String>, timestamp: DateTime<Utc>, text: impl Into<String>) -> Self {
        Self::new(id, DocumentOrigin::Message, timestamp, text)
    }

    /// Create a page edit document.
    pub fn page_edit(id: impl Into<String>, timestamp: DateTime<Utc>, text: impl Into<String>) -> Self {
        Self::new(id, DocumentOrigin::PageEdit, timestamp, text)
    }

    fn new(
        id: impl Into<String>,
        origin: DocumentOrigin,
        timestamp: DateTime<Utc>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            origin,
            timestamp,
            author_identity: None,
            text: text.into(),
            refs: DocumentRefs::default(),
            source_url: None,
        }
    }

    /// Set the author identity
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author_identity = Some(author.into());
        self
    }

    /// Add referenced file paths
    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.refs.files.extend(files.into_iter().map(Into::into));
        self
    }

    /// Set the chat channel
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.refs.channel = Some(channel.into());
        self
    }

    /// Set the page id
    pub fn with_page_id(mut self, page_id: impl Into<String>) -> Self {
        self.refs.page_id = Some(page_id.into());
        self
    }

    /// Set the source URL
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    pub fn kind(&self) -> DocumentKind {
        match self.origin {
            DocumentOrigin::CodeChange { .. } => DocumentKind::CodeChange,
            DocumentOrigin::Message => DocumentKind::Message,
            DocumentOrigin::PageEdit => DocumentKind::PageEdit,
        }
    }

    /// Commit sha of a code-change document.
    ///
    /// Falls back to the last path segment of `source_url` (collectors that
    /// only record the commit URL). Returns `None` for other kinds.
    pub fn commit_sha(&self) -> Option<&str> {
        let DocumentOrigin::CodeChange { sha } = &self.origin else {
            return None;
        };

        sha.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or_else(|| {
                self.source_url
                    .as_deref()
                    .and_then(|url| url.trim_end_matches('/').rsplit('/').next())
                    .map(str::trim)
                    .filter(|s| !s.is_empty() && !s.contains(':'))
            })
    }

    /// Check the fields every extraction rule relies on.
    pub fn validate(&self) -> std::result::Result<(), DocumentError> {
        if self.id.trim().is_empty() {
            return Err(DocumentError::MissingField {
                document_id: self.id.clone(),
                field: "id",
            });
        }

        if self.text.contains('\0') || self.text.contains(char::REPLACEMENT_CHARACTER) {
            return Err(DocumentError::InvalidEncoding {
                document_id: self.id.clone(),
            });
        }

        if self.kind() == DocumentKind::CodeChange && self.commit_sha().is_none() {
            return Err(DocumentError::MissingField {
                document_id: self.id.clone(),
                field: "sha",
            });
        }

        Ok(())
    }
}

/// Result of leniently decoding a batch of raw records
#[derive(Debug, Default)]
pub struct DocumentBatch {
    pub documents: Vec<NormalizedDocument>,
    pub failures: Vec<DocumentError>,
}

/// Decode a batch of documents, skipping records that do not decode.
///
/// Accepts either a JSON array or JSON lines. Only a payload that is neither
/// is an error; a bad record is recorded in `failures` and skipped.
pub fn parse_documents(input: &str) -> Result<DocumentBatch> {
    let trimmed = input.trim_start();
    let records: Vec<serde_json::Value> = if trimmed.is_empty() {
        Vec::new()
    } else if trimmed.starts_with('[') {
        serde_json::from_str(trimmed)
            .map_err(|e| TeamGraphError::InvalidBatch(e.to_string()))?
    } else {
        trimmed
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str)
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| TeamGraphError::InvalidBatch(e.to_string()))?
    };

    let mut batch = DocumentBatch::default();
    for (index, record) in records.into_iter().enumerate() {
        let document_id = record
            .get("id")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        match serde_json::from_value::<NormalizedDocument>(record) {
            Ok(doc) => batch.documents.push(doc),
            Err(e) => {
                tracing::warn!(index, ?document_id, error = %e, "Skipping malformed document");
                batch.failures.push(DocumentError::Malformed {
                    index,
                    document_id,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(batch)
}
