//! Engagement scoring and tiering.

use crate::config::MemoryConfig;
use quill_core::types::EngagementCounts;
use serde::{Deserialize, Serialize};

/// Score assumed for generated posts whose engagement is not yet known
pub const UNMEASURED_SCORE: f64 = 0.5;

/// Lowest score any measured post receives
pub const SCORE_FLOOR: f64 = 0.1;

const LIKE_WEIGHT: f64 = 1.0;
const COMMENT_WEIGHT: f64 = 3.0;
const SHARE_WEIGHT: f64 = 5.0;
const VIEW_WEIGHT: f64 = 0.1;

/// Maps raw interaction counts to a score in [0.1, 1.0]
#[derive(Debug, Clone, Copy)]
pub struct EngagementScorer {
    max_expected: f64,
}

impl Default for EngagementScorer {
    fn default() -> Self {
        Self::new(1000.0)
    }
}

impl EngagementScorer {
    /// `max_expected` is the weighted total that maps to a full score.
    /// Non-positive values fall back to 1000.
    pub fn new(max_expected: f64) -> Self {
        let max_expected = if max_expected > 0.0 { max_expected } else { 1000.0 };
        Self { max_expected }
    }

    pub fn from_config(config: &MemoryConfig) -> Self {
        Self::new(config.max_expected_engagement)
    }

    pub fn score(&self, counts: &EngagementCounts) -> f64 {
        let raw = counts.likes as f64 * LIKE_WEIGHT
            + counts.comments as f64 * COMMENT_WEIGHT
            + counts.shares as f64 * SHARE_WEIGHT
            + counts.views as f64 * VIEW_WEIGHT;
        (raw / self.max_expected).min(1.0).max(SCORE_FLOOR)
    }

    /// Score measured counts, or [`UNMEASURED_SCORE`] when there are none
    pub fn score_optional(&self, counts: Option<&EngagementCounts>) -> f64 {
        counts.map_or(UNMEASURED_SCORE, |c| self.score(c))
    }
}

/// Engagement tier of a post within a compression batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementTier {
    High,
    Medium,
    Low,
}

/// Cut points between tiers. High is strictly above `high`, low strictly
/// below `low`, medium is the closed band between.
#[derive(Debug, Clone, Copy)]
pub struct TierThresholds {
    pub high: f64,
    pub low: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self { high: 0.6, low: 0.3 }
    }
}

impl TierThresholds {
    pub fn from_config(config: &MemoryConfig) -> Self {
        Self {
            high: config.high_engagement_threshold,
            low: config.low_engagement_threshold,
        }
    }

    pub fn classify(&self, score: f64) -> EngagementTier {
        if score > self.high {
            EngagementTier::High
        } else if score < self.low {
            EngagementTier::Low
        } else {
            EngagementTier::Medium
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(likes: u64, comments: u64, shares: u64, views: u64) -> EngagementCounts {
        EngagementCounts::new(likes, comments, shares, views)
    }

    #[test]
    fn test_score_weights() {
        let scorer = EngagementScorer::default();
        // 100 + 30 + 25 + 100 = 255
        let score = scorer.score(&counts(100, 10, 5, 1000));
        assert!((score - 0.255).abs() < 1e-9);
    }

    #[test]
    fn test_score_bounds() {
        let scorer = EngagementScorer::default();
        assert_eq!(scorer.score(&counts(0, 0, 0, 0)), SCORE_FLOOR);
        assert_eq!(scorer.score(&counts(5000, 0, 0, 0)), 1.0);
        assert_eq!(scorer.score(&counts(u64::MAX, u64::MAX, u64::MAX, u64::MAX)), 1.0);
        assert_eq!(scorer.score_optional(None), UNMEASURED_SCORE);
    }

    #[test]
    fn test_score_monotone_per_argument() {
        let scorer = EngagementScorer::default();
        let steps = [0u64, 1, 7, 40, 150, 400, 2000];
        for &base in &steps {
            for pair in steps.windows(2) {
                let (lo, hi) = (pair[0], pair[1]);
                let cases = [
                    (counts(lo, base, base, base), counts(hi, base, base, base)),
                    (counts(base, lo, base, base), counts(base, hi, base, base)),
                    (counts(base, base, lo, base), counts(base, base, hi, base)),
                    (counts(base, base, base, lo), counts(base, base, base, hi)),
                ];
                for (a, b) in cases {
                    let (sa, sb) = (scorer.score(&a), scorer.score(&b));
                    assert!(sa <= sb, "{:?} -> {} > {:?} -> {}", a, sa, b, sb);
                    assert!((SCORE_FLOOR..=1.0).contains(&sa));
                }
            }
        }
    }

    #[test]
    fn test_configurable_max_expected() {
        let scorer = EngagementScorer::new(100.0);
        assert_eq!(scorer.score(&counts(50, 0, 0, 0)), 0.5);
        assert_eq!(EngagementScorer::new(0.0).score(&counts(500, 0, 0, 0)), 0.5);
    }

    #[test]
    fn test_tier_boundaries() {
        let tiers = TierThresholds::default();
        assert_eq!(tiers.classify(0.61), EngagementTier::High);
        assert_eq!(tiers.classify(0.6), EngagementTier::Medium);
        assert_eq!(tiers.classify(0.3), EngagementTier::Medium);
        assert_eq!(tiers.classify(0.29), EngagementTier::Low);
    }
}
