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

//! Deterministic entity ids.
//!
//! An id is derived only from `(kind, canonical_key)`, so the same real-world
//! thing gets the same id on every rebuild regardless of document order.

use serde::{Deserialize, Serialize};

use crate::entity::EntityKind;

/// Number of hash bytes kept in an id (16 hex chars)
const ID_HASH_BYTES: usize = 8;

/// A typed entity identifier, e.g. `commit-3f9a0c1e77b2d410`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Wrap an existing id string (e.g. one read back from serialized output).
    pub fn from_raw(id: impl Into<String>) -> Self {
        EntityId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Generate the stable id for an entity from its kind and canonical key.
pub fn stable_id(kind: EntityKind, canonical_key: &str) -> EntityId {
    let mut hasher = blake3::Hasher::new();
    hasher.update(kind.as_str().as_bytes());
    // unit separator keeps ("ab", "c") and ("a", "bc") apart
    hasher.update(&[0x1f]);
    hasher.update(canonical_key.as_bytes());
    let hash = hasher.finalize();

    EntityId(format!(
        "{}-{}",
        kind.as_str(),
        hex::encode(&hash.as_bytes()[..ID_HASH_BYTES])
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_id_is_deterministic() {
        let a = stable_id(EntityKind::Commit, "abc123");
        let b = stable_id(EntityKind::Commit, "abc123");
        assert_eq!(a, b);
        assert!(a.as_str().starts_with("commit-"));
        assert_eq!(a.as_str().len(), "commit-".len() + ID_HASH_BYTES * 2);
    }

    #[test]
    fn test_kind_participates_in_id() {
        let file = stable_id(EntityKind::File, "rust");
        let tech = stable_id(EntityKind::Technology, "rust");
        assert_ne!(file, tech);
    }

    #[test]
    fn test_key_boundaries_do_not_collide() {
        assert_ne!(
            stable_id(EntityKind::Decision, "message:ab"),
            stable_id(EntityKind::Decision, "message:a b")
        );
    }
}
