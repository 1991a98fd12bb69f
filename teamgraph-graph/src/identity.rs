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

//! Author identity normalization
//!
//! Maps the many surface forms of a person ("Jane Doe", "jane.doe",
//! "jane.doe@acme.io", "@jane_doe") onto one comparison key.

use std::collections::HashMap;

use crate::config::IdentityConfig;

/// Placeholder some collectors emit when the author is not known
const UNKNOWN_AUTHOR: &str = "unknown";

/// Normalize an author identity to its comparison key.
///
/// Emails reduce to their local part (without `+tag`), handles lose the
/// leading `@`, a `Name <email>` pair keeps the name. Separators are dropped
/// and the rest lowercased. Returns `None` for empty or unknown authors.
pub fn normalize_identity(raw: &str) -> Option<String> {
    let mut identity = raw.trim();

    if let Some((name, address)) = identity.split_once('<') {
        let name = name.trim().trim_matches('"').trim();
        identity = if name.is_empty() {
            address.trim_end_matches('>').trim()
        } else {
            name
        };
    }

    let identity = identity.strip_prefix('@').unwrap_or(identity);
    let local = match identity.split_once('@') {
        Some((local, _domain)) if !local.is_empty() => {
            local.split_once('+').map_or(local, |(base, _tag)| base)
        }
        _ => identity,
    };

    if local.eq_ignore_ascii_case(UNKNOWN_AUTHOR) {
        return None;
    }

    let key: String = local
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();

    (!key.is_empty()).then_some(key)
}

/// Author key function with the configured alias table applied
#[derive(Debug, Clone, Default)]
pub struct AuthorNormalizer {
    aliases: HashMap<String, String>,
}

impl AuthorNormalizer {
    pub fn new(config: &IdentityConfig) -> Self {
        let aliases = config
            .author_aliases
            .iter()
            .filter_map(|(variant, target)| {
                let variant = normalize_identity(variant)?;
                let target = normalize_identity(target)?;
                (variant != target).then_some((variant, target))
            })
            .collect();

        Self { aliases }
    }

    /// Canonical key for an author identity. Aliases resolve one level deep.
    pub fn key(&self, raw: &str) -> Option<String> {
        let key = normalize_identity(raw)?;
        match self.aliases.get(&key) {
            Some(target) => Some(target.clone()),
            None => Some(key),
        }
    }
}

/// Pick the display name for a person among the surface forms seen.
///
/// Prefers full names (with a space), then capitalized forms, then longer
/// ones; remaining ties go to the lexicographically smallest form.
pub fn preferred_name<'a>(forms: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    fn rank(form: &str) -> (bool, bool, usize) {
        (
            form.contains(' '),
            form.chars().any(char::is_uppercase),
            form.chars().count(),
        )
    }

    forms
        .into_iter()
        .max_by(|a, b| rank(a).cmp(&rank(b)).then_with(|| b.cmp(a)))
}
