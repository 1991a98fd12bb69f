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

//! Graph queries
//!
//! Read-only lookups over a built graph, used by "related people / files"
//! style questions:
//!
//! - "Who worked on server.go?" -> `related(file, Author, 2)`
//! - "What did this commit touch?" -> `neighbors(commit)`

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use teamgraph_core::{Entity, EntityId, EntityKind, Graph, RelationType, Relationship};

/// Edge direction relative to the queried entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Outgoing,
    Incoming,
}

/// A directly connected entity
#[derive(Debug, Clone, Serialize)]
pub struct Neighbor<'g> {
    pub entity: &'g Entity,
    pub relation: RelationType,
    pub direction: Direction,
    pub confidence: f64,
}

/// An entity reachable within a hop limit
#[derive(Debug, Clone, Serialize)]
pub struct RelatedEntity<'g> {
    pub entity: &'g Entity,
    pub hops: usize,
    /// Best product of edge confidences over shortest paths
    pub confidence: f64,
}

/// Query engine over a built graph
pub struct GraphQuery<'g> {
    graph: &'g Graph,
    outgoing: HashMap<&'g EntityId, Vec<&'g Relationship>>,
    incoming: HashMap<&'g EntityId, Vec<&'g Relationship>>,
}

impl<'g> GraphQuery<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        let mut outgoing: HashMap<&EntityId, Vec<&Relationship>> = HashMap::new();
        let mut incoming: HashMap<&EntityId, Vec<&Relationship>> = HashMap::new();
        for link in &graph.links {
            outgoing.entry(&link.source).or_default().push(link);
            incoming.entry(&link.target).or_default().push(link);
        }

        Self {
            graph,
            outgoing,
            incoming,
        }
    }

    /// Entity by id
    pub fn lookup(&self, id: &EntityId) -> Option<&'g Entity> {
        self.graph.node(id)
    }

    /// Entities whose label, name or alias equals `text` (case-insensitive),
    /// optionally restricted to one kind
    pub fn find(&self, text: &str, kind: Option<EntityKind>) -> Vec<&'g Entity> {
        let needle = text.trim().to_lowercase();
        self.graph
            .nodes
            .iter()
            .filter(|entity| kind.map_or(true, |k| entity.kind() == k))
            .filter(|entity| {
                entity.label.to_lowercase() == needle
                    || entity.aliases().any(|alias| alias.to_lowercase() == needle)
            })
            .collect()
    }

    /// Directly connected entities, strongest edges first
    pub fn neighbors(&self, id: &EntityId) -> Vec<Neighbor<'g>> {
        let outgoing = self
            .outgoing
            .get(id)
            .into_iter()
            .flatten()
            .map(|&link| (link, &link.target, Direction::Outgoing));
        let incoming = self
            .incoming
            .get(id)
            .into_iter()
            .flatten()
            .map(|&link| (link, &link.source, Direction::Incoming));

        let mut neighbors: Vec<Neighbor<'g>> = outgoing
            .chain(incoming)
            .filter_map(|(link, other, direction)| {
                self.graph.node(other).map(|entity| Neighbor {
                    entity,
                    relation: link.relation,
                    direction,
                    confidence: link.confidence,
                })
            })
            .collect();

        neighbors.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| a.entity.id.cmp(&b.entity.id))
                .then_with(|| a.relation.cmp(&b.relation))
        });
        neighbors
    }

    /// Entities of `kind` within `max_hops` edges of `id`, ignoring edge
    /// direction. Closest first, then by confidence.
    pub fn related(&self, id: &EntityId, kind: EntityKind, max_hops: usize) -> Vec<RelatedEntity<'g>> {
        let Some(start) = self.graph.node(id) else {
            return Vec::new();
        };

        let mut visited: HashSet<&EntityId> = HashSet::from([&start.id]);
        let mut frontier: HashMap<&EntityId, f64> = HashMap::from([(&start.id, 1.0)]);
        let mut related = Vec::new();

        for hops in 1..=max_hops {
            let mut next: HashMap<&EntityId, f64> = HashMap::new();
            for (current, reach) in &frontier {
                for (link, other) in self.adjacent(current) {
                    if visited.contains(other) {
                        continue;
                    }
                    let score = reach * link.confidence;
                    let best = next.entry(other).or_insert(score);
                    if score > *best {
                        *best = score;
                    }
                }
            }

            if next.is_empty() {
                break;
            }
            for (other, confidence) in &next {
                visited.insert(*other);
                if let Some(entity) = self.graph.node(other).filter(|e| e.kind() == kind) {
                    related.push(RelatedEntity {
                        entity,
                        hops,
                        confidence: *confidence,
                    });
                }
            }
            frontier = next;
        }

        related.sort_by(|a, b| {
            a.hops
                .cmp(&b.hops)
                .then_with(|| b.confidence.total_cmp(&a.confidence))
                .then_with(|| a.entity.id.cmp(&b.entity.id))
        });
        related
    }

    /// Links touching `id` paired with the entity at the other end
    fn adjacent(&self, id: &EntityId) -> impl Iterator<Item = (&'g Relationship, &'g EntityId)> + '_ {
        let outgoing = self
            .outgoing
            .get(id)
            .into_iter()
            .flatten()
            .map(|&link| (link, &link.target));
        let incoming = self
            .incoming
            .get(id)
            .into_iter()
            .flatten()
            .map(|&link| (link, &link.source));
        outgoing.chain(incoming)
    }
}
