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

//! Relationship inference
//!
//! Edge rules, applied per document over its resolved entities:
//!
//! | Document    | Edge                               |
//! |-------------|------------------------------------|
//! | code-change | Author --authored--> Commit        |
//! | code-change | Commit --modified--> File          |
//! | code-change | File --uses--> Technology          |
//! | code-change | Commit --decided--> Decision       |
//! | message     | Author --contributed--> any entity |
//! | page-edit   | Author --contributed--> any entity |
//!
//! `uses` needs the technology implied by the file extension to exist as a
//! resolved entity; the engine never creates a technology from an extension
//! alone.

use rayon::prelude::*;
use teamgraph_core::{DocumentKind, EntityId, EntityKind, RelationType};
use tracing::{debug, warn};

use crate::candidate::CandidateSeed;
use crate::error::{InferError, ItemFailure};
use crate::extractor::ExtractedDocument;
use crate::resolver::{technology_key, Resolution};
use crate::rules::technology_for_path;

/// An edge observed in one document, before merging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeCandidate {
    pub source: EntityId,
    pub target: EntityId,
    pub relation: RelationType,
    pub weight: u32,
    pub document_id: String,
}

/// Result of inferring edges for a batch
#[derive(Debug, Default)]
pub struct Inference {
    pub edges: Vec<EdgeCandidate>,
    pub failures: Vec<ItemFailure>,
}

/// The entities one document resolved to, grouped by role
#[derive(Debug, Default)]
struct DocumentEntities<'a> {
    commits: Vec<&'a EntityId>,
    authors: Vec<&'a EntityId>,
    files: Vec<(&'a EntityId, &'a str)>,
    technologies: Vec<&'a EntityId>,
    decisions: Vec<&'a EntityId>,
}

impl<'a> DocumentEntities<'a> {
    fn collect(doc: &'a ExtractedDocument<'_>, resolution: &'a Resolution) -> Result<Self, InferError> {
        let mut entities = Self::default();

        for candidate in &doc.candidates {
            let id = resolution
                .entity_id(&candidate.id)
                .ok_or_else(|| InferError::Unresolved {
                    document_id: doc.document.id.clone(),
                    kind: candidate.kind(),
                })?;

            match &candidate.seed {
                CandidateSeed::Commit { .. } => push_unique(&mut entities.commits, id),
                CandidateSeed::Author { .. } => push_unique(&mut entities.authors, id),
                CandidateSeed::File { path } => {
                    if !entities.files.iter().any(|(existing, _)| *existing == id) {
                        entities.files.push((id, path.as_str()));
                    }
                }
                CandidateSeed::Technology { .. } => push_unique(&mut entities.technologies, id),
                CandidateSeed::Decision { .. } => push_unique(&mut entities.decisions, id),
            }
        }

        Ok(entities)
    }

    /// Every non-author entity, in role order
    fn subjects(&self) -> impl Iterator<Item = &'a EntityId> + '_ {
        self.commits
            .iter()
            .copied()
            .chain(self.files.iter().map(|(id, _)| *id))
            .chain(self.technologies.iter().copied())
            .chain(self.decisions.iter().copied())
    }
}

fn push_unique<'a>(ids: &mut Vec<&'a EntityId>, id: &'a EntityId) {
    if !ids.contains(&id) {
        ids.push(id);
    }
}

/// Rule-driven relationship inferencer
#[derive(Debug, Clone, Copy, Default)]
pub struct RelationshipInferencer;

impl RelationshipInferencer {
    pub fn new() -> Self {
        Self
    }

    /// Infer the edges one document supports
    pub fn infer(
        &self,
        doc: &ExtractedDocument<'_>,
        resolution: &Resolution,
    ) -> Result<Vec<EdgeCandidate>, InferError> {
        let entities = DocumentEntities::collect(doc, resolution)?;
        let document_id = doc.document.id.as_str();

        let mut edges = Vec::new();
        let mut emit = |source: &EntityId, target: &EntityId, relation: RelationType| {
            if source != target {
                edges.push(EdgeCandidate {
                    source: source.clone(),
                    target: target.clone(),
                    relation,
                    weight: 1,
                    document_id: document_id.to_string(),
                });
            }
        };

        match doc.document.kind() {
            DocumentKind::CodeChange => {
                for &commit in &entities.commits {
                    for &author in &entities.authors {
                        emit(author, commit, RelationType::Authored);
                    }
                    for &(file, _) in &entities.files {
                        emit(commit, file, RelationType::Modified);
                    }
                    for &decision in &entities.decisions {
                        emit(commit, decision, RelationType::Decided);
                    }
                }

                for &(file, path) in &entities.files {
                    let technology = technology_for_path(path).and_then(|name| {
                        resolution
                            .index
                            .get(EntityKind::Technology, &technology_key(name))
                    });
                    if let Some(technology) = technology {
                        emit(file, &technology.id, RelationType::Uses);
                    }
                }
            }
            DocumentKind::Message | DocumentKind::PageEdit => {
                for &author in &entities.authors {
                    for subject in entities.subjects() {
                        emit(author, subject, RelationType::Contributed);
                    }
                }
            }
        }

        Ok(edges)
    }

    /// Infer edges for every document in parallel. A document whose
    /// inference fails contributes no edges.
    pub fn infer_all(&self, docs: &[ExtractedDocument<'_>], resolution: &Resolution) -> Inference {
        let results: Vec<_> = docs
            .par_iter()
            .map(|doc| (doc.document.id.as_str(), self.infer(doc, resolution)))
            .collect();

        let mut inference = Inference::default();
        for (document_id, result) in results {
            match result {
                Ok(edges) => inference.edges.extend(edges),
                Err(e) => {
                    warn!(document_id, error = %e, "Skipping document: inference failed");
                    inference.failures.push(ItemFailure::inference(document_id, &e));
                }
            }
        }

        debug!(
            edges = inference.edges.len(),
            failures = inference.failures.len(),
            "Inference complete"
        );
        inference
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::EntityCandidate;
    use crate::config::GraphBuildConfig;
    use crate::resolver::IdentityResolver;
    use chrono::{TimeZone, Utc};
    use teamgraph_core::NormalizedDocument;

    fn ts() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn extracted(doc: &NormalizedDocument, seeds: Vec<CandidateSeed>) -> ExtractedDocument<'_> {
        ExtractedDocument {
            document: doc,
            candidates: seeds
                .into_iter()
                .enumerate()
                .map(|(i, seed)| EntityCandidate::from_document(doc, i as u32, seed))
                .collect(),
        }
    }

    fn resolve(docs: &[ExtractedDocument<'_>]) -> Resolution {
        IdentityResolver::new(&GraphBuildConfig::default())
            .resolve(docs.iter().flat_map(|d| d.candidates.iter()))
    }

    fn relations(edges: &[EdgeCandidate]) -> Vec<RelationType> {
        edges.iter().map(|e| e.relation).collect()
    }

    fn commit_seed() -> CandidateSeed {
        CandidateSeed::Commit {
            sha: "abc123".to_string(),
            message: "fix auth bug".to_string(),
        }
    }

    fn seed_author(identity: &str) -> CandidateSeed {
        CandidateSeed::Author {
            identity: identity.to_string(),
        }
    }

    fn seed_file(path: &str) -> CandidateSeed {
        CandidateSeed::File {
            path: path.to_string(),
        }
    }

    #[test]
    fn test_commit_edges() {
        let doc = NormalizedDocument::code_change("c1", "abc123", ts(), "fix auth bug");
        let docs = vec![extracted(
            &doc,
            vec![commit_seed(), seed_author("alice"), seed_file("server.go")],
        )];
        let resolution = resolve(&docs);

        let edges = RelationshipInferencer.infer(&docs[0], &resolution).unwrap();
        assert_eq!(relations(&edges), vec![RelationType::Authored, RelationType::Modified]);
        assert!(edges.iter().all(|e| e.weight == 1 && e.document_id == "c1"));
    }

    #[test]
    fn test_uses_requires_resolved_technology() {
        let commit = NormalizedDocument::code_change("c1", "abc123", ts(), "");
        let chat = NormalizedDocument::message("m1", ts(), "");
        let docs = vec![
            extracted(&commit, vec![commit_seed(), seed_file("server.go")]),
            extracted(
                &chat,
                vec![CandidateSeed::Technology {
                    name: "Go".to_string(),
                }],
            ),
        ];
        let resolution = resolve(&docs);

        let edges = RelationshipInferencer.infer(&docs[0], &resolution).unwrap();
        assert_eq!(relations(&edges), vec![RelationType::Modified, RelationType::Uses]);

        // without the technology entity there is no uses edge
        let resolution = resolve(&docs[..1]);
        let edges = RelationshipInferencer.infer(&docs[0], &resolution).unwrap();
        assert_eq!(relations(&edges), vec![RelationType::Modified]);
    }

    #[test]
    fn test_commit_decision() {
        let doc = NormalizedDocument::code_change("c1", "abc123", ts(), "");
        let docs = vec![extracted(
            &doc,
            vec![
                commit_seed(),
                CandidateSeed::Decision {
                    statement: "decided to drop the v1 API".to_string(),
                },
            ],
        )];
        let resolution = resolve(&docs);
        let edges = RelationshipInferencer.infer(&docs[0], &resolution).unwrap();
        assert_eq!(relations(&edges), vec![RelationType::Decided]);
    }

    #[test]
    fn test_message_contributions() {
        let doc = NormalizedDocument::message("m1", ts(), "");
        let docs = vec![extracted(
            &doc,
            vec![
                seed_author("Jane Doe"),
                CandidateSeed::Technology {
                    name: "PostgreSQL".to_string(),
                },
                CandidateSeed::Decision {
                    statement: "decided to switch to PostgreSQL".to_string(),
                },
            ],
        )];
        let resolution = resolve(&docs);
        let edges = RelationshipInferencer.infer(&docs[0], &resolution).unwrap();
        assert_eq!(
            relations(&edges),
            vec![RelationType::Contributed, RelationType::Contributed]
        );
    }

    #[test]
    fn test_message_without_author_has_no_edges() {
        let doc = NormalizedDocument::message("m1", ts(), "");
        let docs = vec![extracted(
            &doc,
            vec![CandidateSeed::Technology {
                name: "Redis".to_string(),
            }],
        )];
        let resolution = resolve(&docs);
        assert!(RelationshipInferencer
            .infer(&docs[0], &resolution)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_unresolved_candidate_fails_document() {
        let doc = NormalizedDocument::message("m1", ts(), "");
        let docs = vec![extracted(&doc, vec![seed_author("???")])];
        let resolution = resolve(&docs);

        let inference = RelationshipInferencer.infer_all(&docs, &resolution);
        assert!(inference.edges.is_empty());
        assert_eq!(inference.failures.len(), 1);
        assert_eq!(inference.failures[0].document_id.as_deref(), Some("m1"));
    }
}
