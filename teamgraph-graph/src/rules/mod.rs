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

//! Text rules
//!
//! Rules scan free text for entity mentions the document metadata does not
//! carry. Each rule is pure: the same text always yields the same seeds, in
//! the same order.

pub mod decision;
pub mod technology;

pub use decision::DecisionRule;
pub use technology::{technology_for_path, TechnologyRule};

use crate::candidate::CandidateSeed;
use crate::config::ExtractionConfig;
use crate::error::ConfigError;

/// A text rule producing entity seeds
pub trait EntityRule: Send + Sync {
    /// Rule name for logs
    fn name(&self) -> &str;

    /// Scan `text` and return the seeds found, in a deterministic order
    fn detect(&self, text: &str) -> Vec<CandidateSeed>;
}

/// The built-in rule set: technologies, then decisions
pub fn default_rules(config: &ExtractionConfig) -> Result<Vec<Box<dyn EntityRule>>, ConfigError> {
    Ok(vec![
        Box::new(TechnologyRule),
        Box::new(DecisionRule::new(config)?),
    ])
}
