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

//! Confidence scoring
//!
//! `confidence = min(1, base(type) + scale * ln(support))`
//!
//! `support` is the number of distinct documents that produced the edge. A
//! single document yields exactly the base, and every additional document
//! raises the score until it saturates at 1.

use teamgraph_core::RelationType;

use crate::config::ConfidenceConfig;

/// Decimal places kept in published scores
const PRECISION: f64 = 10_000.0;

#[derive(Debug, Clone)]
pub struct ConfidenceModel {
    config: ConfidenceConfig,
}

impl ConfidenceModel {
    pub fn new(config: ConfidenceConfig) -> Self {
        Self { config }
    }

    /// Score an edge of `relation` supported by `support` documents.
    /// Always in `[0, 1]`; non-decreasing in `support`.
    pub fn score(&self, relation: RelationType, support: usize) -> f64 {
        if support == 0 {
            return 0.0;
        }

        let raw = self.config.base(relation)
            + self.config.corroboration_scale * (support as f64).ln();
        ((raw.clamp(0.0, 1.0)) * PRECISION).round() / PRECISION
    }
}

impl Default for ConfidenceModel {
    fn default() -> Self {
        Self::new(ConfidenceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_single_document_is_base() {
        let model = ConfidenceModel::default();
        assert_eq!(model.score(RelationType::Authored, 1), 0.9);
        assert_eq!(model.score(RelationType::Modified, 1), 0.9);
        assert_eq!(model.score(RelationType::Uses, 1), 0.7);
        assert_eq!(model.score(RelationType::Contributed, 1), 0.6);
        assert_eq!(model.score(RelationType::Decided, 1), 0.5);
    }

    #[test]
    fn test_corroboration_raises_and_saturates() {
        let model = ConfidenceModel::default();
        assert!(model.score(RelationType::Uses, 3) > model.score(RelationType::Uses, 1));
        assert_eq!(model.score(RelationType::Authored, 1_000), 1.0);
        assert_eq!(model.score(RelationType::Authored, 0), 0.0);
    }

    proptest! {
        #[test]
        fn prop_bounded_and_monotonic(n in 1usize..10_000, extra in 0usize..1_000) {
            let model = ConfidenceModel::default();
            for relation in RelationType::ALL {
                let low = model.score(relation, n);
                let high = model.score(relation, n + extra);
                prop_assert!((0.0..=1.0).contains(&low));
                prop_assert!(high >= low);
            }
        }
    }
}
