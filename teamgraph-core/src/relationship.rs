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

//! Relationship Types

use serde::{Deserialize, Serialize};

use crate::id::EntityId;

/// Directed relationship types between entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    /// Author wrote a commit
    Authored,
    /// Commit touched a file
    Modified,
    /// File is written with a technology
    Uses,
    /// Commit carries a decision
    Decided,
    /// Author took part in something through a message or page edit
    Contributed,
}

impl RelationType {
    pub const ALL: [RelationType; 5] = [
        RelationType::Authored,
        RelationType::Modified,
        RelationType::Uses,
        RelationType::Decided,
        RelationType::Contributed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RelationType::Authored => "authored",
            RelationType::Modified => "modified",
            RelationType::Uses => "uses",
            RelationType::Decided => "decided",
            RelationType::Contributed => "contributed",
        }
    }

    /// Structural edges come straight from document metadata; the rest are
    /// inferred from text.
    pub fn is_structural(self) -> bool {
        matches!(self, RelationType::Authored | RelationType::Modified)
    }
}

impl std::fmt::Display for RelationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed, confidence-scored edge. `(source, target, relation)` is unique
/// within a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub source: EntityId,
    pub target: EntityId,
    #[serde(rename = "type")]
    pub relation: RelationType,
    /// Always within `[0, 1]`
    pub confidence: f64,
    /// Strength for visual weighting (summed evidence weight)
    pub value: u32,
}

impl Relationship {
    /// Dedup key of this edge
    pub fn key(&self) -> (&EntityId, &EntityId, RelationType) {
        (&self.source, &self.target, self.relation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_serialization_shape() {
        let link = Relationship {
            source: EntityId::from_raw("author-1"),
            target: EntityId::from_raw("commit-2"),
            relation: RelationType::Authored,
            confidence: 0.9,
            value: 1,
        };

        let json = serde_json::to_string(&link).unwrap();
        assert_eq!(
            json,
            r#"{"source":"author-1","target":"commit-2","type":"authored","confidence":0.9,"value":1}"#
        );
    }

    #[test]
    fn test_structural_types() {
        assert!(RelationType::Authored.is_structural());
        assert!(RelationType::Modified.is_structural());
        assert!(!RelationType::Decided.is_structural());
        assert!(!RelationType::Contributed.is_structural());
    }
}
