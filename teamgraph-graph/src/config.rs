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

//! Build configuration
//!
//! Every tunable of the engine lives here: extraction limits, decision
//! patterns, author aliases, confidence bases and the worker pool size.
//! All sections have defaults, so an empty TOML file is a valid config.
//!
//! ```toml
//! worker_threads = 4
//!
//! [extraction]
//! decision_min_tokens = 4
//!
//! [identity.author_aliases]
//! "jd" = "jane.doe"
//!
//! [confidence]
//! uses = 0.75
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use teamgraph_core::RelationType;

use crate::error::ConfigError;

/// Decision patterns used when none are configured. Matched case-insensitively.
pub const DEFAULT_DECISION_PATTERNS: &[&str] = &[
    r"\b(?:we(?:'ve| have)? )?decided (?:to|on|that)\b",
    r"\bchose \S+(?: \S+){0,3} over\b",
    r"\b(?:switch(?:ed|ing)?|migrat(?:e|ed|ing)) (?:from \S+ )?to\b",
    r"\b(?:agreed|opted) (?:to|for|on)\b",
    r"\bwe(?:'ll| will) (?:go with|use|adopt)\b",
    r"\bgoing with\b",
];

/// Top-level engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphBuildConfig {
    /// Worker threads for extraction and inference (None = available cores)
    pub worker_threads: Option<usize>,
    pub extraction: ExtractionConfig,
    pub identity: IdentityConfig,
    pub confidence: ConfidenceConfig,
}

impl GraphBuildConfig {
    /// Parse a TOML config
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML config file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Check value ranges and compile every decision pattern once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_threads == Some(0) {
            return Err(ConfigError::Invalid(
                "worker_threads must be at least 1".to_string(),
            ));
        }
        self.extraction.validate()?;
        self.confidence.validate()
    }
}

/// Extraction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Also pick up file paths mentioned in commit text
    pub scan_text_for_paths: bool,
    /// Commit messages are cut to this many characters
    pub commit_message_max_chars: usize,
    /// Characters of the message shown in a commit label
    pub commit_label_chars: usize,
    /// A decision statement needs at least this many words
    pub decision_min_tokens: usize,
    pub decision_max_chars: usize,
    pub decision_label_chars: usize,
    /// Ordered decision patterns (regex, case-insensitive). First match wins.
    pub decision_patterns: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            scan_text_for_paths: true,
            commit_message_max_chars: 100,
            commit_label_chars: 40,
            decision_min_tokens: 4,
            decision_max_chars: 240,
            decision_label_chars: 60,
            decision_patterns: DEFAULT_DECISION_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

impl ExtractionConfig {
    /// Compile the decision patterns in order
    pub fn compile_decision_patterns(&self) -> Result<Vec<Regex>, ConfigError> {
        self.decision_patterns
            .iter()
            .map(|pattern| {
                Regex::new(&format!("(?i){pattern}")).map_err(|source| ConfigError::Pattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.commit_message_max_chars == 0 || self.decision_max_chars == 0 {
            return Err(ConfigError::Invalid(
                "message and statement limits must be positive".to_string(),
            ));
        }
        if self.decision_min_tokens == 0 {
            return Err(ConfigError::Invalid(
                "decision_min_tokens must be at least 1".to_string(),
            ));
        }
        if self.decision_patterns.is_empty() {
            return Err(ConfigError::Invalid(
                "decision_patterns must not be empty".to_string(),
            ));
        }
        self.compile_decision_patterns().map(|_| ())
    }
}

/// Author identity settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Extra author merges: variant -> identity it belongs to.
    /// Both sides go through the usual normalization.
    pub author_aliases: BTreeMap<String, String>,
}

/// Confidence model parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    pub authored: f64,
    pub modified: f64,
    pub uses: f64,
    pub decided: f64,
    pub contributed: f64,
    /// Added per natural-log unit of supporting documents
    pub corroboration_scale: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            authored: 0.9,
            modified: 0.9,
            uses: 0.7,
            decided: 0.5,
            contributed: 0.6,
            corroboration_scale: 0.1,
        }
    }
}

impl ConfidenceConfig {
    /// Base confidence for a relation seen in a single document
    pub fn base(&self, relation: RelationType) -> f64 {
        match relation {
            RelationType::Authored => self.authored,
            RelationType::Modified => self.modified,
            RelationType::Uses => self.uses,
            RelationType::Decided => self.decided,
            RelationType::Contributed => self.contributed,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for relation in RelationType::ALL {
            let base = self.base(relation);
            if !(base > 0.0 && base <= 1.0) {
                return Err(ConfigError::Invalid(format!(
                    "confidence.{relation} must be in (0, 1], got {base}"
                )));
            }
        }
        if !(self.corroboration_scale >= 0.0 && self.corroboration_scale.is_finite()) {
            return Err(ConfigError::Invalid(
                "confidence.corroboration_scale must be finite and non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Graph cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Seconds a cached graph stays fresh
    pub ttl_secs: u64,
    /// Maximum number of cached scopes
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 300,
            max_entries: 64,
        }
    }
}
