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

//! The assembled graph and its serialized shape.
//!
//! ```json
//! { "nodes": [ {"id", "kind", "label", "importance", ...} ],
//!   "links": [ {"source", "target", "type", "confidence", "value"} ],
//!   "stats": { "<kind>": <count> } }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityKind};
use crate::error::Result;
use crate::id::EntityId;
use crate::relationship::Relationship;

/// Per-kind node counts. Kinds without nodes are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphStats(BTreeMap<EntityKind, usize>);

impl GraphStats {
    /// Count nodes per kind
    pub fn from_nodes<'a>(nodes: impl IntoIterator<Item = &'a Entity>) -> Self {
        let mut counts = BTreeMap::new();
        for node in nodes {
            *counts.entry(node.kind()).or_insert(0) += 1;
        }
        GraphStats(counts)
    }

    /// Number of nodes of `kind` (0 when absent)
    pub fn count(&self, kind: EntityKind) -> usize {
        self.0.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityKind, usize)> + '_ {
        self.0.iter().map(|(kind, count)| (*kind, *count))
    }
}

/// A built knowledge graph. Nodes and links are sorted by id so the
/// serialized form is byte-stable across rebuilds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Entity>,
    pub links: Vec<Relationship>,
    pub stats: GraphStats,
}

impl Graph {
    /// The empty graph (`{"nodes":[],"links":[],"stats":{}}`)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }

    /// Find a node by id. Nodes are sorted, so this is a binary search.
    pub fn node(&self, id: &EntityId) -> Option<&Entity> {
        self.nodes
            .binary_search_by(|node| node.id.cmp(id))
            .ok()
            .map(|idx| &self.nodes[idx])
    }

    /// Nodes of one kind, in id order
    pub fn nodes_of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> {
        self.nodes.iter().filter(move |node| node.kind() == kind)
    }

    /// Compact JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Indented JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityAttributes;
    use crate::id::stable_id;

    fn tech(name: &str) -> Entity {
        Entity {
            id: stable_id(EntityKind::Technology, &name.to_lowercase()),
            label: name.to_string(),
            importance: 1.4,
            connections: 0,
            source_url: None,
            attributes: EntityAttributes::Technology {
                name: name.to_string(),
            },
        }
    }

    #[test]
    fn test_empty_graph_json() {
        assert_eq!(
            Graph::empty().to_json().unwrap(),
            r#"{"nodes":[],"links":[],"stats":{}}"#
        );
    }

    #[test]
    fn test_stats_and_lookup() {
        let mut nodes = vec![tech("Rust"), tech("React"), tech("Python")];
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        let stats = GraphStats::from_nodes(&nodes);
        let graph = Graph {
            nodes,
            links: Vec::new(),
            stats,
        };

        assert_eq!(graph.stats.count(EntityKind::Technology), 3);
        assert_eq!(graph.stats.count(EntityKind::Commit), 0);
        assert_eq!(graph.stats.total(), 3);

        let rust_id = stable_id(EntityKind::Technology, "rust");
        assert_eq!(graph.node(&rust_id).map(|n| n.label.as_str()), Some("Rust"));
        assert!(graph.node(&EntityId::from_raw("missing")).is_none());

        let json = graph.to_json().unwrap();
        assert!(json.contains(r#""stats":{"technology":3}"#));
    }
}
