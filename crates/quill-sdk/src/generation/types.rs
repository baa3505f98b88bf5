//! Generation inputs and results.

use crate::memory::{EngagementInsights, RecordedPost};
use quill_core::types::{PersonaSnapshot, ReferencePost};
use serde::{Deserialize, Serialize};

/// What the user liked about one reference creator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatorPreference {
    pub name: String,
    #[serde(default)]
    pub tone: Vec<String>,
    #[serde(default)]
    pub content_type: Vec<String>,
    #[serde(default)]
    pub style: Vec<String>,
}

impl CreatorPreference {
    pub fn has_preferences(&self) -> bool {
        !(self.tone.is_empty() && self.content_type.is_empty() && self.style.is_empty())
    }
}

/// Self-described profile of the user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub name: String,
    pub role: String,
    pub linkedin_goal: String,
    pub preferred_content_types: Vec<String>,
    pub preferred_tone: Vec<String>,
    /// Free text on what the user likes about their reference creators
    pub creator_likes: Option<String>,
    pub reference_creators: Vec<CreatorPreference>,
}

/// A reference post with its similarity to the query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarPost {
    pub post: ReferencePost,
    pub similarity_score: f32,
}

/// Input to [`ContentGenerator::generate`](super::ContentGenerator::generate)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub query: String,
    #[serde(default)]
    pub reference_posts: Vec<SimilarPost>,
    #[serde(default)]
    pub profile: UserProfile,
}

impl GenerationRequest {
    pub fn new(query: impl Into<String>, profile: UserProfile) -> Self {
        Self {
            query: query.into(),
            reference_posts: Vec::new(),
            profile,
        }
    }

    pub fn with_reference_posts(mut self, posts: Vec<SimilarPost>) -> Self {
        self.reference_posts = posts;
        self
    }
}

/// A quoted excerpt of one of the user's own posts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfExample {
    pub excerpt: String,
    pub engagement_score: f64,
}

/// Result of one generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedPost {
    pub text: String,
    /// Snapshot the prompt was built from
    pub persona: Option<PersonaSnapshot>,
    pub insights: Option<EngagementInsights>,
    /// How the generated text was stored; `None` if storing it failed
    pub recorded: Option<RecordedPost>,
    /// Context items that were put in the prompt
    pub context_items_used: usize,
}
