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

//! Decision detection
//!
//! A decision is a sentence introduced by a decision phrase ("decided to",
//! "switching to", "chose X over Y", ...). The statement runs from the
//! phrase to the end of its sentence and must carry enough words to say
//! something on its own.

use regex::Regex;

use super::EntityRule;
use crate::candidate::CandidateSeed;
use crate::config::ExtractionConfig;
use crate::error::ConfigError;

/// Detects decision statements with an ordered list of patterns
#[derive(Debug, Clone)]
pub struct DecisionRule {
    patterns: Vec<Regex>,
    min_tokens: usize,
    max_chars: usize,
}

impl DecisionRule {
    pub fn new(config: &ExtractionConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            patterns: config.compile_decision_patterns()?,
            min_tokens: config.decision_min_tokens,
            max_chars: config.decision_max_chars,
        })
    }

    /// The first decision statement in `text`, if any.
    ///
    /// Patterns are tried in order; within a pattern, matches are tried
    /// left to right. A match whose sentence is too short is skipped.
    pub fn statement(&self, text: &str) -> Option<String> {
        self.patterns.iter().find_map(|pattern| {
            pattern.find_iter(text).find_map(|m| {
                let end = sentence_end(text, m.end());
                let statement = clean_statement(&text[m.start()..end]);
                (statement.split_whitespace().count() >= self.min_tokens)
                    .then(|| truncate_chars(&statement, self.max_chars))
            })
        })
    }
}

impl EntityRule for DecisionRule {
    fn name(&self) -> &str {
        "decision"
    }

    fn detect(&self, text: &str) -> Vec<CandidateSeed> {
        self.statement(text)
            .map(|statement| CandidateSeed::Decision { statement })
            .into_iter()
            .collect()
    }
}

/// Byte offset where the sentence containing `from` ends.
/// A `.` only ends a sentence when followed by whitespace or the end of
/// text, so "Next.js" stays in one piece.
fn sentence_end(text: &str, from: usize) -> usize {
    let rest = &text[from..];
    let mut chars = rest.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        match c {
            '\n' | '!' | '?' | ';' => return from + idx,
            '.' => match chars.peek() {
                None => return from + idx,
                Some((_, next)) if next.is_whitespace() => return from + idx,
                Some(_) => {}
            },
            _ => {}
        }
    }

    text.len()
}

/// Collapse whitespace and trim dangling punctuation
fn clean_statement(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches([',', ':', '-', ' '])
        .to_string()
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].trim_end().to_string(),
        None => s.to_string(),
    }
}
