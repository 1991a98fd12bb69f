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

//! Entity extraction
//!
//! Turns one normalized document into entity candidates:
//!
//! - metadata: the commit itself, its author and the files it references
//! - commit text: file paths mentioned in the message (`Files: a, b` lines
//!   and path-like tokens)
//! - free text: every configured [`EntityRule`] (technologies, decisions)
//!
//! Extraction is pure and per-document, so [`EntityExtractor::extract_all`]
//! fans out over the rayon pool and records failures without stopping.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use teamgraph_core::{DocumentKind, NormalizedDocument};
use tracing::{debug, warn};

use crate::candidate::{CandidateSeed, EntityCandidate};
use crate::config::ExtractionConfig;
use crate::error::{ConfigError, ExtractError, ItemFailure};
use crate::identity::normalize_identity;
use crate::rules::technology::is_technology_token;
use crate::rules::{default_rules, EntityRule};

/// Path-like token: optional directories, a name, an extension
static PATH_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9_.\-]+/)*[A-Za-z0-9_\-][A-Za-z0-9_.\-]*\.([A-Za-z][A-Za-z0-9]{0,7})$")
        .expect("path token pattern")
});

/// Extensions accepted for bare file names (tokens without a `/`)
const SOURCE_EXTENSIONS: &[&str] = &[
    "py", "js", "ts", "jsx", "tsx", "vue", "go", "java", "rb", "php", "rs", "c", "h", "cpp",
    "cs", "kt", "swift", "sql", "sh", "html", "css", "scss", "md", "json", "yaml", "yml",
    "toml", "proto",
];

/// Prefix of the file list line collectors append to commit text
const FILES_LINE_PREFIX: &str = "files:";
/// Prefix collectors put in front of the commit message
const COMMIT_LINE_PREFIX: &str = "commit:";

/// A document together with the candidates extracted from it
#[derive(Debug)]
pub struct ExtractedDocument<'a> {
    pub document: &'a NormalizedDocument,
    pub candidates: Vec<EntityCandidate>,
}

/// Result of extracting a batch
#[derive(Debug, Default)]
pub struct Extraction<'a> {
    /// Successfully extracted documents, in input order
    pub documents: Vec<ExtractedDocument<'a>>,
    pub failures: Vec<ItemFailure>,
}

impl Extraction<'_> {
    pub fn candidates(&self) -> impl Iterator<Item = &EntityCandidate> {
        self.documents.iter().flat_map(|doc| doc.candidates.iter())
    }
}

/// Rule-driven entity extractor
pub struct EntityExtractor {
    config: ExtractionConfig,
    rules: Vec<Box<dyn EntityRule>>,
}

impl std::fmt::Debug for EntityExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rules: Vec<&str> = self.rules.iter().map(|rule| rule.name()).collect();
        f.debug_struct("EntityExtractor")
            .field("config", &self.config)
            .field("rules", &rules)
            .finish()
    }
}

impl EntityExtractor {
    /// Create an extractor with the built-in rules
    pub fn new(config: ExtractionConfig) -> Result<Self, ConfigError> {
        let rules = default_rules(&config)?;
        Ok(Self::with_rules(config, rules))
    }

    /// Create an extractor with a custom rule set
    pub fn with_rules(config: ExtractionConfig, rules: Vec<Box<dyn EntityRule>>) -> Self {
        Self { config, rules }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract candidates from one document
    pub fn extract(&self, doc: &NormalizedDocument) -> Result<Vec<EntityCandidate>, ExtractError> {
        doc.validate()?;

        let mut seeds = Vec::new();

        if let Some(sha) = doc.commit_sha() {
            seeds.push(CandidateSeed::Commit {
                sha: sha.to_string(),
                message: commit_message(&doc.text, self.config.commit_message_max_chars),
            });
        }

        if let Some(identity) = doc.author_identity.as_deref() {
            if normalize_identity(identity).is_some() {
                seeds.push(CandidateSeed::Author {
                    identity: identity.trim().to_string(),
                });
            }
        }

        let mut seen_paths = HashSet::new();
        let text_paths = if doc.kind() == DocumentKind::CodeChange && self.config.scan_text_for_paths {
            paths_in_text(&doc.text)
        } else {
            Vec::new()
        };
        for path in doc.refs.files.iter().map(String::as_str).chain(text_paths) {
            if let Some(path) = normalize_path(path) {
                if seen_paths.insert(path.clone()) {
                    seeds.push(CandidateSeed::File { path });
                }
            }
        }

        for rule in &self.rules {
            let found = rule.detect(&doc.text);
            if !found.is_empty() {
                debug!(document_id = %doc.id, rule = rule.name(), found = found.len(), "Rule matched");
            }
            seeds.extend(found);
        }

        Ok(seeds
            .into_iter()
            .enumerate()
            .map(|(ordinal, seed)| EntityCandidate::from_document(doc, ordinal as u32, seed))
            .collect())
    }

    /// Extract every document in parallel. Documents that fail are
    /// recorded and skipped; output order follows input order.
    pub fn extract_all<'a>(&self, docs: &[&'a NormalizedDocument]) -> Extraction<'a> {
        let results: Vec<_> = docs
            .par_iter()
            .map(|&doc| (doc, self.extract(doc)))
            .collect();

        let mut extraction = Extraction::default();
        for (doc, result) in results {
            match result {
                Ok(candidates) => extraction.documents.push(ExtractedDocument {
                    document: doc,
                    candidates,
                }),
                Err(e) => {
                    warn!(document_id = %doc.id, error = %e, "Skipping document: extraction failed");
                    extraction.failures.push(ItemFailure::extraction(&doc.id, &e));
                }
            }
        }

        debug!(
            documents = extraction.documents.len(),
            failures = extraction.failures.len(),
            "Extraction complete"
        );
        extraction
    }
}

/// First non-empty line of the commit text, without the `Commit:` prefix
fn commit_message(text: &str, max_chars: usize) -> String {
    let line = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default();

    let line = match line.get(..COMMIT_LINE_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(COMMIT_LINE_PREFIX) => {
            line[COMMIT_LINE_PREFIX.len()..].trim_start()
        }
        _ => line,
    };

    line.chars().take(max_chars).collect::<String>().trim_end().to_string()
}

/// File paths mentioned in text
pub(crate) fn paths_in_text(text: &str) -> Vec<&str> {
    let mut paths = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        match line.get(..FILES_LINE_PREFIX.len()) {
            Some(prefix) if prefix.eq_ignore_ascii_case(FILES_LINE_PREFIX) => {
                paths.extend(
                    line[FILES_LINE_PREFIX.len()..]
                        .split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty()),
                );
            }
            _ => paths.extend(
                line.split(|c: char| c.is_whitespace() || ",;()[]<>\"'`".contains(c))
                    .map(|token| token.trim_end_matches(['.', ':']))
                    .filter(|token| looks_like_path(token)),
            ),
        }
    }

    paths
}

fn looks_like_path(token: &str) -> bool {
    if token.contains("://") || token.contains('@') || is_technology_token(token) {
        return false;
    }

    let Some(captures) = PATH_TOKEN.captures(token) else {
        return false;
    };

    token.contains('/')
        || captures
            .get(1)
            .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext.as_str().to_ascii_lowercase().as_str()))
}

/// Canonical path form: forward slashes, no leading `./`
pub(crate) fn normalize_path(raw: &str) -> Option<String> {
    let path = raw.trim().replace('\\', "/");
    let path = path.trim_start_matches("./").trim_end_matches('/');
    (!path.is_empty()).then(|| path.to_string())
}
