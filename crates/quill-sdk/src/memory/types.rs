//! Memory pipeline inputs and results.

use quill_core::types::{EngagementCounts, EngagementTrend};
use serde::{Deserialize, Serialize};

/// A post to be analyzed and appended to short-term memory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPost {
    pub text: String,
    pub topic: String,
    pub post_type: String,
    /// Real interaction counts, if known
    #[serde(default)]
    pub engagement: Option<EngagementCounts>,
}

impl NewPost {
    pub fn new(text: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            topic: topic.into(),
            post_type: "Generated".to_string(),
            engagement: None,
        }
    }

    pub fn with_post_type(mut self, post_type: impl Into<String>) -> Self {
        self.post_type = post_type.into();
        self
    }

    pub fn with_engagement(mut self, counts: EngagementCounts) -> Self {
        self.engagement = Some(counts);
        self
    }
}

/// Result of recording a post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedPost {
    pub entry_id: String,
    pub engagement_score: f64,
    /// The analysis reply was unusable and fallback values were stored
    pub used_fallback: bool,
    pub compression: CompressionStatus,
}

/// Whether recording a post led to a compression run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CompressionStatus {
    NotTriggered,
    Compressed(CompressionOutcome),
    Failed { message: String },
}

impl CompressionStatus {
    pub fn is_compressed(&self) -> bool {
        matches!(self, Self::Compressed(_))
    }
}

/// Result of one STM to LTM compression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionOutcome {
    pub ltm_id: String,
    pub post_count: u64,
    pub avg_engagement: f64,
    pub max_engagement: f64,
    pub high_engagement_count: u64,
    pub engagement_trend: EngagementTrend,
    /// The compression reply was unusable and fallback values were stored
    pub used_fallback: bool,
    /// Set when the follow-up snapshot rebuild failed
    pub snapshot_error: Option<String>,
}

/// Direction of recent engagement across all of a user's posts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightTrend {
    Improving,
    Stable,
}

impl std::fmt::Display for InsightTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InsightTrend::Improving => write!(f, "improving"),
            InsightTrend::Stable => write!(f, "stable"),
        }
    }
}

/// Aggregate engagement over every STM entry of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementInsights {
    pub total_posts: usize,
    pub avg_engagement: f64,
    pub peak_engagement: f64,
    pub high_performers: usize,
    pub trend: InsightTrend,
}
