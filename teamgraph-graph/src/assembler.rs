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

//! Graph assembly
//!
//! Merges edge candidates, scores them, derives node importance and emits
//! the final graph. Assembly enforces the graph invariants:
//!
//! - node ids are unique
//! - every edge endpoint is a node (dangling edges are dropped and logged)
//! - `(source, target, type)` is unique; repeats merge, summing their weight
//! - nodes are sorted by id and edges by `(source, target, type)`

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::Serialize;
use teamgraph_core::{
    Entity, EntityAttributes, EntityId, EntityKind, Graph, GraphStats, RelationType, Relationship,
};
use tracing::{debug, warn};

use crate::confidence::ConfidenceModel;
use crate::inferencer::EdgeCandidate;

/// Decimal places kept in importance scores
const PRECISION: f64 = 10_000.0;

/// Base importance per entity kind
pub fn kind_weight(kind: EntityKind) -> f64 {
    match kind {
        EntityKind::Author => 1.5,
        EntityKind::Technology => 1.4,
        EntityKind::File => 1.3,
        EntityKind::Decision => 1.2,
        EntityKind::Commit => 1.0,
    }
}

/// `kind_weight * (1 + ln(1 + degree))`; grows with every added edge
pub fn importance(kind: EntityKind, degree: usize) -> f64 {
    let raw = kind_weight(kind) * (1.0 + (1.0 + degree as f64).ln());
    (raw * PRECISION).round() / PRECISION
}

/// What assembly dropped or merged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssemblyReport {
    pub duplicate_nodes: usize,
    pub dangling_edges: usize,
    /// Edge candidates folded into an existing `(source, target, type)`
    pub merged_edges: usize,
}

#[derive(Default)]
struct EdgeEvidence {
    value: u32,
    documents: BTreeSet<String>,
}

/// Per-commit and per-file change counts, read off the merged links
#[derive(Default)]
struct ChangeActivity<'a> {
    files_per_commit: HashMap<&'a EntityId, usize>,
    commits_per_file: HashMap<&'a EntityId, Vec<&'a EntityId>>,
    authors_per_commit: HashMap<&'a EntityId, Vec<&'a EntityId>>,
}

impl<'a> ChangeActivity<'a> {
    fn from_links(links: &'a [Relationship]) -> Self {
        let mut activity = Self::default();
        for link in links {
            match link.relation {
                RelationType::Modified => {
                    *activity.files_per_commit.entry(&link.source).or_default() += 1;
                    activity
                        .commits_per_file
                        .entry(&link.target)
                        .or_default()
                        .push(&link.source);
                }
                RelationType::Authored => activity
                    .authors_per_commit
                    .entry(&link.target)
                    .or_default()
                    .push(&link.source),
                _ => {}
            }
        }
        activity
    }

    fn annotate(&self, node: &mut Entity) {
        match &mut node.attributes {
            EntityAttributes::Commit { files_count, .. } => {
                *files_count = self.files_per_commit.get(&node.id).copied().unwrap_or(0);
            }
            EntityAttributes::File {
                contributors,
                commits,
                ..
            } => {
                let touching = self.commits_per_file.get(&node.id).map(Vec::as_slice).unwrap_or(&[]);
                let authors: HashSet<&EntityId> = touching
                    .iter()
                    .filter_map(|commit| self.authors_per_commit.get(commit))
                    .flatten()
                    .copied()
                    .collect();
                *commits = touching.len();
                *contributors = authors.len();
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GraphAssembler {
    confidence: ConfidenceModel,
}

impl GraphAssembler {
    pub fn new(confidence: ConfidenceModel) -> Self {
        Self { confidence }
    }

    pub fn assemble(&self, entities: Vec<Entity>, edges: Vec<EdgeCandidate>) -> (Graph, AssemblyReport) {
        let mut report = AssemblyReport::default();

        let mut nodes = entities;
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        let before = nodes.len();
        nodes.dedup_by(|later, earlier| {
            let duplicate = later.id == earlier.id;
            if duplicate {
                warn!(id = %later.id, label = %later.label, "Dropping duplicate node");
            }
            duplicate
        });
        report.duplicate_nodes = before - nodes.len();

        let known: HashSet<&EntityId> = nodes.iter().map(|node| &node.id).collect();

        let mut merged: BTreeMap<(EntityId, EntityId, RelationType), EdgeEvidence> = BTreeMap::new();
        for edge in edges {
            if !known.contains(&edge.source) || !known.contains(&edge.target) {
                warn!(
                    source = %edge.source,
                    target = %edge.target,
                    relation = %edge.relation,
                    document_id = %edge.document_id,
                    "Dropping dangling edge"
                );
                report.dangling_edges += 1;
                continue;
            }

            let evidence = match merged.entry((edge.source, edge.target, edge.relation)) {
                Entry::Occupied(entry) => {
                    report.merged_edges += 1;
                    entry.into_mut()
                }
                Entry::Vacant(entry) => entry.insert(EdgeEvidence::default()),
            };
            evidence.value = evidence.value.saturating_add(edge.weight);
            evidence.documents.insert(edge.document_id);
        }

        let links: Vec<Relationship> = merged
            .into_iter()
            .map(|((source, target, relation), evidence)| Relationship {
                source,
                target,
                relation,
                confidence: self.confidence.score(relation, evidence.documents.len()),
                value: evidence.value,
            })
            .collect();

        let mut degree: HashMap<&EntityId, usize> = HashMap::new();
        for link in &links {
            *degree.entry(&link.source).or_default() += 1;
            *degree.entry(&link.target).or_default() += 1;
        }
        let activity = ChangeActivity::from_links(&links);
        for node in &mut nodes {
            let connections = degree.get(&node.id).copied().unwrap_or(0);
            node.importance = importance(node.kind(), connections);
            node.connections = connections;
            activity.annotate(node);
        }

        let stats = GraphStats::from_nodes(&nodes);
        debug!(
            nodes = nodes.len(),
            links = links.len(),
            dangling = report.dangling_edges,
            "Assembled graph"
        );

        (Graph { nodes, links, stats }, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use teamgraph_core::stable_id;

    fn technology(name: &str) -> Entity {
        Entity {
            id: stable_id(EntityKind::Technology, &name.to_lowercase()),
            label: name.to_string(),
            importance: 0.0,
            connections: 0,
            source_url: None,
            attributes: EntityAttributes::Technology {
                name: name.to_string(),
            },
        }
    }

    fn file(path: &str) -> Entity {
        Entity {
            id: stable_id(EntityKind::File, path),
            label: path.to_string(),
            importance: 0.0,
            connections: 0,
            source_url: None,
            attributes: EntityAttributes::File {
                path: path.to_string(),
                extension: None,
                contributors: 0,
                commits: 0,
            },
        }
    }

    fn person(name: &str) -> Entity {
        Entity {
            id: stable_id(EntityKind::Author, name),
            label: name.to_string(),
            importance: 0.0,
            connections: 0,
            source_url: None,
            attributes: EntityAttributes::Author {
                canonical_name: name.to_string(),
                aliases: Default::default(),
            },
        }
    }

    fn commit(sha: &str) -> Entity {
        Entity {
            id: stable_id(EntityKind::Commit, sha),
            label: sha.to_string(),
            importance: 0.0,
            connections: 0,
            source_url: None,
            attributes: EntityAttributes::Commit {
                sha: sha.to_string(),
                short_sha: sha.to_string(),
                message: String::new(),
                date: chrono::DateTime::<chrono::Utc>::UNIX_EPOCH,
                files_count: 0,
            },
        }
    }

    fn link(source: &Entity, target: &Entity, relation: RelationType) -> EdgeCandidate {
        EdgeCandidate {
            relation,
            ..edge(source, &target.id, source.id.as_str())
        }
    }

    fn edge(source: &Entity, target: &EntityId, document_id: &str) -> EdgeCandidate {
        EdgeCandidate {
            source: source.id.clone(),
            target: target.clone(),
            relation: RelationType::Uses,
            weight: 1,
            document_id: document_id.to_string(),
        }
    }

    #[test]
    fn test_merges_repeated_edges() {
        let go = technology("Go");
        let server = file("server.go");
        let edges = vec![
            edge(&server, &go.id, "c1"),
            edge(&server, &go.id, "c2"),
            edge(&server, &go.id, "c2"),
        ];

        let (graph, report) = GraphAssembler::default().assemble(vec![go.clone(), server], edges);
        assert_eq!(graph.links.len(), 1);
        assert_eq!(graph.links[0].value, 3);
        assert_eq!(report.merged_edges, 2);
        // two distinct documents
        let expected = ConfidenceModel::default().score(RelationType::Uses, 2);
        assert_eq!(graph.links[0].confidence, expected);
        assert!(expected > 0.7);
    }

    #[test]
    fn test_drops_dangling_and_duplicates() {
        let go = technology("Go");
        let server = file("server.go");
        let ghost = stable_id(EntityKind::Technology, "ghost");
        let edges = vec![edge(&server, &ghost, "c1")];

        let (graph, report) =
            GraphAssembler::default().assemble(vec![go.clone(), server, go], edges);
        assert!(graph.links.is_empty());
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(report.dangling_edges, 1);
        assert_eq!(report.duplicate_nodes, 1);
    }

    #[test]
    fn test_nodes_sorted_with_importance_and_stats() {
        let go = technology("Go");
        let server = file("server.go");
        let readme = file("README.md");
        let edges = vec![edge(&server, &go.id, "c1")];

        let (graph, _) = GraphAssembler::default().assemble(vec![readme, go, server], edges);
        let ids: Vec<_> = graph.nodes.iter().map(|n| n.id.clone()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);

        let server = graph.node(&stable_id(EntityKind::File, "server.go")).unwrap();
        let readme = graph.node(&stable_id(EntityKind::File, "README.md")).unwrap();
        assert_eq!(readme.importance, 1.3);
        assert!(server.importance > readme.importance);
        assert_eq!(server.connections, 1);
        assert_eq!(readme.connections, 0);
        let go = graph.node(&stable_id(EntityKind::Technology, "go")).unwrap();
        assert_eq!(go.connections, 1);

        assert_eq!(graph.stats.count(EntityKind::File), 2);
        assert_eq!(graph.stats.count(EntityKind::Technology), 1);
    }

    #[test]
    fn test_change_counts_from_links() {
        let alice = person("alice");
        let bob = person("bob");
        let c1 = commit("c1");
        let c2 = commit("c2");
        let c3 = commit("c3");
        let server = file("server.go");
        let readme = file("README.md");

        let edges = vec![
            link(&alice, &c1, RelationType::Authored),
            link(&bob, &c2, RelationType::Authored),
            link(&alice, &c3, RelationType::Authored),
            link(&c1, &server, RelationType::Modified),
            link(&c1, &readme, RelationType::Modified),
            link(&c2, &server, RelationType::Modified),
            link(&c3, &server, RelationType::Modified),
            // repeated in another document; still one commit
            EdgeCandidate {
                document_id: "other".to_string(),
                ..link(&c3, &server, RelationType::Modified)
            },
        ];
        let (graph, _) = GraphAssembler::default().assemble(
            vec![alice, bob, c1.clone(), c2, c3, server.clone(), readme.clone()],
            edges,
        );

        match &graph.node(&server.id).unwrap().attributes {
            EntityAttributes::File {
                contributors,
                commits,
                ..
            } => {
                assert_eq!(*commits, 3);
                assert_eq!(*contributors, 2);
            }
            other => panic!("unexpected attributes: {other:?}"),
        }
        match &graph.node(&readme.id).unwrap().attributes {
            EntityAttributes::File {
                contributors,
                commits,
                ..
            } => assert_eq!((*contributors, *commits), (1, 1)),
            other => panic!("unexpected attributes: {other:?}"),
        }
        let c1 = graph.node(&c1.id).unwrap();
        assert!(matches!(c1.attributes, EntityAttributes::Commit { files_count: 2, .. }));
        assert_eq!(c1.connections, 3);
    }

    #[test]
    fn test_importance_grows_with_degree() {
        for kind in EntityKind::ALL {
            assert_eq!(importance(kind, 0), kind_weight(kind));
            assert!(importance(kind, 5) > importance(kind, 4));
        }
    }

    #[test]
    fn test_empty() {
        let (graph, report) = GraphAssembler::default().assemble(Vec::new(), Vec::new());
        assert_eq!(graph, Graph::empty());
        assert_eq!(report, AssemblyReport::default());
    }
}
