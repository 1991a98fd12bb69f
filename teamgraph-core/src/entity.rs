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

//! Entity Types
//!
//! Nodes of the knowledge graph. The kind-specific attributes form a closed
//! tagged union; serialized, the tag appears as `"kind"` next to the common
//! fields:
//!
//! ```json
//! {"id": "file-5c0e...", "label": "server.go", "importance": 1.3,
//!  "connections": 2, "kind": "file", "path": "server.go", "extension": "go",
//!  "contributors": 1, "commits": 1}
//! ```

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::EntityId;

/// Entity kinds in the knowledge graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A commit (keyed by sha)
    Commit,
    /// A person, merged across sources and naming variants
    Author,
    /// A file path
    File,
    /// A language, framework or service (e.g. "PostgreSQL", "React")
    Technology,
    /// A decision statement detected in text
    Decision,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Commit,
        EntityKind::Author,
        EntityKind::File,
        EntityKind::Technology,
        EntityKind::Decision,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Commit => "commit",
            EntityKind::Author => "author",
            EntityKind::File => "file",
            EntityKind::Technology => "technology",
            EntityKind::Decision => "decision",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific entity attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityAttributes {
    Commit {
        sha: String,
        short_sha: String,
        message: String,
        date: DateTime<Utc>,
        /// Files this commit modified
        #[serde(default)]
        files_count: usize,
    },
    Author {
        canonical_name: String,
        /// Every surface form seen for this person
        aliases: BTreeSet<String>,
    },
    File {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        extension: Option<String>,
        /// Distinct authors of the commits that modified this file
        #[serde(default)]
        contributors: usize,
        /// Commits that modified this file
        #[serde(default)]
        commits: usize,
    },
    Technology {
        name: String,
    },
    Decision {
        statement: String,
        date: DateTime<Utc>,
    },
}

impl EntityAttributes {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityAttributes::Commit { .. } => EntityKind::Commit,
            EntityAttributes::Author { .. } => EntityKind::Author,
            EntityAttributes::File { .. } => EntityKind::File,
            EntityAttributes::Technology { .. } => EntityKind::Technology,
            EntityAttributes::Decision { .. } => EntityKind::Decision,
        }
    }
}

/// A knowledge graph entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable id derived from kind + canonical key
    pub id: EntityId,
    /// Human-readable label
    pub label: String,
    /// Derived from connection count (never decreases as edges are added)
    pub importance: f64,
    /// Edges touching this entity in the assembled graph
    #[serde(default)]
    pub connections: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(flatten)]
    pub attributes: EntityAttributes,
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        self.attributes.kind()
    }

    /// Aliases of an author entity (empty for other kinds)
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        let aliases = match &self.attributes {
            EntityAttributes::Author { aliases, .. } => Some(aliases),
            _ => None,
        };
        aliases.into_iter().flatten().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::stable_id;

    #[test]
    fn test_file_entity_serialization_shape() {
        let entity = Entity {
            id: stable_id(EntityKind::File, "src/server.go"),
            label: "server.go".to_string(),
            importance: 1.3,
            connections: 2,
            source_url: None,
            attributes: EntityAttributes::File {
                path: "src/server.go".to_string(),
                extension: Some("go".to_string()),
                contributors: 1,
                commits: 1,
            },
        };

        let value = serde_json::to_value(&entity).unwrap();
        assert_eq!(value["kind"], "file");
        assert_eq!(value["label"], "server.go");
        assert_eq!(value["path"], "src/server.go");
        assert_eq!(value["extension"], "go");
        assert_eq!(value["connections"], 2);
        assert_eq!(value["commits"], 1);
        assert!(value.get("source_url").is_none());

        let back: Entity = serde_json::from_value(value).unwrap();
        assert_eq!(back, entity);
    }

    #[test]
    fn test_author_aliases() {
        let entity = Entity {
            id: stable_id(EntityKind::Author, "janedoe"),
            label: "Jane Doe".to_string(),
            importance: 1.5,
            connections: 0,
            source_url: None,
            attributes: EntityAttributes::Author {
                canonical_name: "Jane Doe".to_string(),
                aliases: ["Jane Doe", "jane.doe"].iter().map(|s| s.to_string()).collect(),
            },
        };

        assert_eq!(entity.kind(), EntityKind::Author);
        let aliases: Vec<&str> = entity.aliases().collect();
        assert_eq!(aliases, vec!["Jane Doe", "jane.doe"]);
    }

    #[test]
    fn test_kind_names_match_serde() {
        for kind in EntityKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }
}
