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

//! Identity resolution
//!
//! Collapses candidates that denote the same real-world thing into one
//! canonical entity. Each kind has a canonical key:
//!
//! | Kind       | Key                                              |
//! |------------|--------------------------------------------------|
//! | Commit     | sha as given, trimmed                            |
//! | Author     | normalized identity, after the alias table       |
//! | File       | normalized path                                  |
//! | Technology | lowercased canonical name                        |
//! | Decision   | document kind + normalized statement             |
//!
//! Candidates with equal keys merge. The entity's fields come from the
//! group's representative: the earliest candidate, ties broken by document
//! id. Because groups and members are ordered by value, the result does not
//! depend on input order.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use teamgraph_core::{stable_id, Entity, EntityAttributes, EntityId, EntityKind};
use tracing::{debug, warn};

use crate::candidate::{CandidateId, CandidateSeed, EntityCandidate};
use crate::config::GraphBuildConfig;
use crate::identity::{preferred_name, AuthorNormalizer};

/// Length of the abbreviated sha shown in labels
pub const SHORT_SHA_LEN: usize = 7;

/// Canonical key of a technology name
pub fn technology_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Resolved entities, addressable by id or by (kind, canonical key)
#[derive(Debug, Default)]
pub struct EntityIndex {
    entities: BTreeMap<EntityId, Entity>,
    keys: HashMap<(EntityKind, String), EntityId>,
}

impl EntityIndex {
    pub fn get(&self, kind: EntityKind, key: &str) -> Option<&Entity> {
        self.keys
            .get(&(kind, key.to_string()))
            .and_then(|id| self.entities.get(id))
    }

    pub fn entity(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.entities.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities in id order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn into_entities(self) -> Vec<Entity> {
        self.entities.into_values().collect()
    }

    fn insert(&mut self, kind: EntityKind, key: String, entity: Entity) -> EntityId {
        let id = entity.id.clone();
        if let Some(existing) = self.entities.get(&id) {
            warn!(%id, kind = %kind, existing = %existing.label, "Entity id collision, keeping first");
        } else {
            self.entities.insert(id.clone(), entity);
        }
        self.keys.insert((kind, key), id.clone());
        id
    }
}

/// Output of identity resolution
#[derive(Debug, Default)]
pub struct Resolution {
    pub index: EntityIndex,
    canonical: HashMap<CandidateId, EntityId>,
}

impl Resolution {
    /// Canonical entity id of a candidate
    pub fn entity_id(&self, candidate: &CandidateId) -> Option<&EntityId> {
        self.canonical.get(candidate)
    }

    /// Canonical entity of a candidate
    pub fn entity(&self, candidate: &CandidateId) -> Option<&Entity> {
        self.entity_id(candidate).and_then(|id| self.index.entity(id))
    }
}

/// Merges candidates into canonical entities
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    authors: AuthorNormalizer,
    commit_label_chars: usize,
    decision_label_chars: usize,
}

impl IdentityResolver {
    pub fn new(config: &GraphBuildConfig) -> Self {
        Self {
            authors: AuthorNormalizer::new(&config.identity),
            commit_label_chars: config.extraction.commit_label_chars,
            decision_label_chars: config.extraction.decision_label_chars,
        }
    }

    /// Canonical key of a candidate, or `None` if it cannot be keyed
    pub fn canonical_key(&self, candidate: &EntityCandidate) -> Option<String> {
        let key = match &candidate.seed {
            CandidateSeed::Commit { sha, .. } => sha.trim().to_string(),
            CandidateSeed::Author { identity } => self.authors.key(identity)?,
            CandidateSeed::File { path } => crate::extractor::normalize_path(path)?,
            CandidateSeed::Technology { name } => technology_key(name),
            CandidateSeed::Decision { statement } => {
                format!("{}:{}", candidate.document_kind, normalize_statement(statement))
            }
        };
        (!key.is_empty()).then_some(key)
    }

    /// Resolve candidates into canonical entities
    pub fn resolve<'c>(&self, candidates: impl IntoIterator<Item = &'c EntityCandidate>) -> Resolution {
        let mut groups: BTreeMap<(EntityKind, String), Vec<&EntityCandidate>> = BTreeMap::new();
        let mut unkeyed = 0usize;

        for candidate in candidates {
            match self.canonical_key(candidate) {
                Some(key) => groups.entry((candidate.kind(), key)).or_default().push(candidate),
                None => unkeyed += 1,
            }
        }

        let mut resolution = Resolution::default();
        for ((kind, key), mut members) in groups {
            members.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));

            let entity = self.merge(kind, &key, &members);
            let id = resolution.index.insert(kind, key, entity);
            for member in members {
                resolution.canonical.insert(member.id.clone(), id.clone());
            }
        }

        debug!(
            entities = resolution.index.len(),
            candidates = resolution.canonical.len(),
            unkeyed,
            "Resolved entities"
        );
        resolution
    }

    /// Build the canonical entity of a group. `members` is sorted, so the
    /// first one is the representative.
    fn merge(&self, kind: EntityKind, key: &str, members: &[&EntityCandidate]) -> Entity {
        let representative = members[0];

        let (label, attributes, source_url) = match &representative.seed {
            CandidateSeed::Commit { .. } => {
                let message = members
                    .iter()
                    .find_map(|m| match &m.seed {
                        CandidateSeed::Commit { message, .. } if !message.is_empty() => {
                            Some(message.clone())
                        }
                        _ => None,
                    })
                    .unwrap_or_default();
                let short_sha: String = key.chars().take(SHORT_SHA_LEN).collect();
                let label = if message.is_empty() {
                    short_sha.clone()
                } else {
                    format!("{short_sha}: {}", truncate(&message, self.commit_label_chars))
                };
                (
                    label,
                    EntityAttributes::Commit {
                        sha: key.to_string(),
                        short_sha,
                        message,
                        date: representative.timestamp,
                        files_count: 0,
                    },
                    representative.source_url.clone(),
                )
            }
            CandidateSeed::Author { .. } => {
                let aliases: BTreeSet<String> = members
                    .iter()
                    .filter_map(|m| match &m.seed {
                        CandidateSeed::Author { identity } => Some(identity.clone()),
                        _ => None,
                    })
                    .collect();
                let canonical_name = preferred_name(aliases.iter().map(String::as_str))
                    .unwrap_or(key)
                    .to_string();
                (
                    canonical_name.clone(),
                    EntityAttributes::Author {
                        canonical_name,
                        aliases,
                    },
                    None,
                )
            }
            CandidateSeed::File { .. } => {
                let file_name = key.rsplit('/').next().unwrap_or(key);
                let extension = file_name
                    .rsplit_once('.')
                    .map(|(_, ext)| ext.to_ascii_lowercase())
                    .filter(|ext| !ext.is_empty());
                (
                    file_name.to_string(),
                    EntityAttributes::File {
                        path: key.to_string(),
                        extension,
                        contributors: 0,
                        commits: 0,
                    },
                    None,
                )
            }
            CandidateSeed::Technology { name } => (
                name.clone(),
                EntityAttributes::Technology { name: name.clone() },
                None,
            ),
            CandidateSeed::Decision { statement } => {
                let label = if statement.chars().count() > self.decision_label_chars {
                    format!("{}...", truncate(statement, self.decision_label_chars))
                } else {
                    statement.clone()
                };
                (
                    label,
                    EntityAttributes::Decision {
                        statement: statement.clone(),
                        date: representative.timestamp,
                    },
                    representative.source_url.clone(),
                )
            }
        };

        Entity {
            id: stable_id(kind, key),
            label,
            importance: 0.0,
            connections: 0,
            source_url,
            attributes,
        }
    }
}

/// Comparison form of a decision statement
fn normalize_statement(statement: &str) -> String {
    statement
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(|c: char| c.is_ascii_punctuation())
        .to_lowercase()
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].trim_end(),
        None => s,
    }
}
