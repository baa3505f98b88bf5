//! Shared domain types for quill-core.
//!
//! Records for the evolution pipeline (STM, LTM, persona snapshots), the
//! context stores and the reference post library, together with their
//! store metadata codecs.

use crate::db::{Metadata, MetadataRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Engagement
// ─────────────────────────────────────────────────────────────────────────────

/// Raw interaction counts for a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementCounts {
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub shares: u64,
    #[serde(default)]
    pub views: u64,
}

impl EngagementCounts {
    pub fn new(likes: u64, comments: u64, shares: u64, views: u64) -> Self {
        Self { likes, comments, shares, views }
    }
}

/// Direction of a compressed batch: more high-tier than low-tier posts, or not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementTrend {
    Improving,
    #[default]
    Mixed,
}

impl EngagementTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngagementTrend::Improving => "improving",
            EngagementTrend::Mixed => "mixed",
        }
    }
}

impl std::fmt::Display for EngagementTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EngagementTrend {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "improving" => Ok(EngagementTrend::Improving),
            "mixed" => Ok(EngagementTrend::Mixed),
            _ => Err(format!("Invalid engagement trend: {}", s)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Provider Response Shapes
// ─────────────────────────────────────────────────────────────────────────────

/// Structured analysis of a single post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostAnalysis {
    pub topic: String,
    pub tone: String,
    pub belief: String,
    pub style_elements: Vec<String>,
    pub post_type: String,
    pub hooks: Vec<String>,
    pub structure: String,
    pub cta_type: String,
    pub voice_characteristics: Vec<String>,
    pub engagement_factors: Vec<String>,
    pub success_elements: Vec<String>,
}

fn default_voice_confidence() -> f64 {
    0.7
}

fn default_uniqueness_score() -> f64 {
    0.8
}

fn default_engagement_optimization() -> f64 {
    0.9
}

fn default_maturity() -> f64 {
    0.5
}

/// Qualitative summary of a compressed batch of posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaSummary {
    #[serde(default)]
    pub period_summary: String,
    #[serde(default)]
    pub dominant_tones: Vec<String>,
    #[serde(default)]
    pub core_beliefs: Vec<String>,
    #[serde(default)]
    pub writing_patterns: Vec<String>,
    #[serde(default)]
    pub voice_evolution: String,
    #[serde(default)]
    pub style_preferences: Vec<String>,
    #[serde(default)]
    pub content_themes: Vec<String>,
    #[serde(default)]
    pub engagement_style: String,
    #[serde(default)]
    pub personality_traits: Vec<String>,
    #[serde(default)]
    pub success_formulas: Vec<String>,
    #[serde(default)]
    pub high_engagement_hooks: Vec<String>,
    #[serde(default)]
    pub winning_structures: Vec<String>,
    #[serde(default)]
    pub engagement_strengths: Vec<String>,
    #[serde(default = "default_voice_confidence")]
    pub voice_confidence: f64,
    #[serde(default = "default_uniqueness_score")]
    pub uniqueness_score: f64,
    #[serde(default = "default_engagement_optimization")]
    pub engagement_optimization: f64,
}

/// Qualitative voice profile held by a persona snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    #[serde(default)]
    pub current_voice: String,
    #[serde(default)]
    pub primary_tones: Vec<String>,
    #[serde(default)]
    pub core_beliefs: Vec<String>,
    #[serde(default)]
    pub writing_signature: String,
    #[serde(default)]
    pub preferred_structures: Vec<String>,
    #[serde(default)]
    pub content_focus_areas: Vec<String>,
    #[serde(default)]
    pub engagement_approach: String,
    #[serde(default)]
    pub success_patterns: Vec<String>,
    #[serde(default)]
    pub winning_hooks: Vec<String>,
    #[serde(default)]
    pub engagement_strengths: Vec<String>,
    #[serde(default = "default_maturity")]
    pub voice_maturity_level: f64,
    #[serde(default = "default_maturity")]
    pub engagement_mastery: f64,
    #[serde(default)]
    pub personality_blend: String,
    #[serde(default)]
    pub evolution_direction: String,
}

impl Default for VoiceProfile {
    fn default() -> Self {
        Self {
            current_voice: String::new(),
            primary_tones: Vec::new(),
            core_beliefs: Vec::new(),
            writing_signature: String::new(),
            preferred_structures: Vec::new(),
            content_focus_areas: Vec::new(),
            engagement_approach: String::new(),
            success_patterns: Vec::new(),
            winning_hooks: Vec::new(),
            engagement_strengths: Vec::new(),
            voice_maturity_level: default_maturity(),
            engagement_mastery: default_maturity(),
            personality_blend: String::new(),
            evolution_direction: String::new(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Records
// ─────────────────────────────────────────────────────────────────────────────

/// Short-term memory entry: one analyzed post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StmEntry {
    pub id: String,
    pub user_id: String,
    pub document: String,
    pub analysis: PostAnalysis,
    pub engagement_score: f64,
    pub counts: EngagementCounts,
    pub timestamp: DateTime<Utc>,
    pub processed: bool,
}

impl MetadataRecord for StmEntry {
    fn id(&self) -> &str {
        &self.id
    }

    fn document(&self) -> &str {
        &self.document
    }

    fn to_metadata(&self) -> Metadata {
        let a = &self.analysis;
        let mut meta = Metadata::new();
        meta.put("user_id", self.user_id.as_str())
            .put("topic", a.topic.as_str())
            .put("tone", a.tone.as_str())
            .put("belief", a.belief.as_str())
            .put_list("style_elements", &a.style_elements)
            .put("post_type", a.post_type.as_str())
            .put_list("hooks", &a.hooks)
            .put("structure", a.structure.as_str())
            .put("cta_type", a.cta_type.as_str())
            .put_list("voice_characteristics", &a.voice_characteristics)
            .put_list("engagement_factors", &a.engagement_factors)
            .put_list("success_elements", &a.success_elements)
            .put("engagement_score", self.engagement_score)
            .put("likes", self.counts.likes)
            .put("comments", self.counts.comments)
            .put("shares", self.counts.shares)
            .put("views", self.counts.views)
            .put_timestamp("timestamp", &self.timestamp)
            .put("processed", self.processed);
        meta
    }

    fn from_stored(id: String, document: String, meta: &Metadata) -> Self {
        Self {
            id,
            user_id: meta.string("user_id"),
            document,
            analysis: PostAnalysis {
                topic: meta.string("topic"),
                tone: meta.string("tone"),
                belief: meta.string("belief"),
                style_elements: meta.list("style_elements"),
                post_type: meta.string("post_type"),
                hooks: meta.list("hooks"),
                structure: meta.string("structure"),
                cta_type: meta.string("cta_type"),
                voice_characteristics: meta.list("voice_characteristics"),
                engagement_factors: meta.list("engagement_factors"),
                success_elements: meta.list("success_elements"),
            },
            engagement_score: meta.float("engagement_score").unwrap_or(0.5),
            counts: EngagementCounts {
                likes: meta.count("likes"),
                comments: meta.count("comments"),
                shares: meta.count("shares"),
                views: meta.count("views"),
            },
            timestamp: meta.timestamp("timestamp"),
            processed: meta.bool("processed").unwrap_or(false),
        }
    }
}

/// Long-term memory entry: the summary of one compression run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LtmEntry {
    pub id: String,
    pub user_id: String,
    pub document: String,
    pub timestamp: DateTime<Utc>,
    pub post_count: u64,
    pub avg_engagement: f64,
    pub max_engagement: f64,
    pub high_engagement_count: u64,
    pub engagement_trend: EngagementTrend,
    pub summary: PersonaSummary,
}

impl MetadataRecord for LtmEntry {
    fn id(&self) -> &str {
        &self.id
    }

    fn document(&self) -> &str {
        &self.document
    }

    fn to_metadata(&self) -> Metadata {
        let s = &self.summary;
        let mut meta = Metadata::new();
        meta.put("user_id", self.user_id.as_str())
            .put_timestamp("timestamp", &self.timestamp)
            .put("post_count", self.post_count)
            .put("avg_engagement", self.avg_engagement)
            .put("max_engagement", self.max_engagement)
            .put("high_engagement_count", self.high_engagement_count)
            .put("engagement_trend", self.engagement_trend.as_str())
            .put("period_summary", s.period_summary.as_str())
            .put_list("dominant_tones", &s.dominant_tones)
            .put_list("core_beliefs", &s.core_beliefs)
            .put_list("writing_patterns", &s.writing_patterns)
            .put("voice_evolution", s.voice_evolution.as_str())
            .put_list("style_preferences", &s.style_preferences)
            .put_list("content_themes", &s.content_themes)
            .put("engagement_style", s.engagement_style.as_str())
            .put_list("personality_traits", &s.personality_traits)
            .put_list("success_formulas", &s.success_formulas)
            .put_list("high_engagement_hooks", &s.high_engagement_hooks)
            .put_list("winning_structures", &s.winning_structures)
            .put_list("engagement_strengths", &s.engagement_strengths)
            .put("voice_confidence", s.voice_confidence)
            .put("uniqueness_score", s.uniqueness_score)
            .put("engagement_optimization", s.engagement_optimization);
        meta
    }

    fn from_stored(id: String, document: String, meta: &Metadata) -> Self {
        Self {
            id,
            user_id: meta.string("user_id"),
            document,
            timestamp: meta.timestamp("timestamp"),
            post_count: meta.count("post_count"),
            avg_engagement: meta.float("avg_engagement").unwrap_or(0.5),
            max_engagement: meta.float("max_engagement").unwrap_or(0.5),
            high_engagement_count: meta.count("high_engagement_count"),
            engagement_trend: meta
                .str("engagement_trend")
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            summary: PersonaSummary {
                period_summary: meta.string("period_summary"),
                dominant_tones: meta.list("dominant_tones"),
                core_beliefs: meta.list("core_beliefs"),
                writing_patterns: meta.list("writing_patterns"),
                voice_evolution: meta.string("voice_evolution"),
                style_preferences: meta.list("style_preferences"),
                content_themes: meta.list("content_themes"),
                engagement_style: meta.string("engagement_style"),
                personality_traits: meta.list("personality_traits"),
                success_formulas: meta.list("success_formulas"),
                high_engagement_hooks: meta.list("high_engagement_hooks"),
                winning_structures: meta.list("winning_structures"),
                engagement_strengths: meta.list("engagement_strengths"),
                voice_confidence: meta.float("voice_confidence").unwrap_or(0.7),
                uniqueness_score: meta.float("uniqueness_score").unwrap_or(0.8),
                engagement_optimization: meta.float("engagement_optimization").unwrap_or(0.9),
            },
        }
    }
}

/// The single current-state voice record for a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaSnapshot {
    pub id: String,
    pub user_id: String,
    pub document: String,
    pub last_updated: DateTime<Utc>,
    pub avg_engagement: f64,
    pub peak_engagement: f64,
    pub high_engagement_ratio: f64,
    pub voice: VoiceProfile,
}

impl PersonaSnapshot {
    /// Snapshot id for a user. There is exactly one per user.
    pub fn id_for(user_id: &str) -> String {
        format!("persona_{}", user_id)
    }
}

impl MetadataRecord for PersonaSnapshot {
    fn id(&self) -> &str {
        &self.id
    }

    fn document(&self) -> &str {
        &self.document
    }

    fn to_metadata(&self) -> Metadata {
        let v = &self.voice;
        let mut meta = Metadata::new();
        meta.put("user_id", self.user_id.as_str())
            .put_timestamp("last_updated", &self.last_updated)
            .put("avg_engagement", self.avg_engagement)
            .put("peak_engagement", self.peak_engagement)
            .put("high_engagement_ratio", self.high_engagement_ratio)
            .put("current_voice", v.current_voice.as_str())
            .put_list("primary_tones", &v.primary_tones)
            .put_list("core_beliefs", &v.core_beliefs)
            .put("writing_signature", v.writing_signature.as_str())
            .put_list("preferred_structures", &v.preferred_structures)
            .put_list("content_focus_areas", &v.content_focus_areas)
            .put("engagement_approach", v.engagement_approach.as_str())
            .put_list("success_patterns", &v.success_patterns)
            .put_list("winning_hooks", &v.winning_hooks)
            .put_list("engagement_strengths", &v.engagement_strengths)
            .put("voice_maturity_level", v.voice_maturity_level)
            .put("engagement_mastery", v.engagement_mastery)
            .put("personality_blend", v.personality_blend.as_str())
            .put("evolution_direction", v.evolution_direction.as_str());
        meta
    }

    fn from_stored(id: String, document: String, meta: &Metadata) -> Self {
        Self {
            id,
            user_id: meta.string("user_id"),
            document,
            last_updated: meta.timestamp("last_updated"),
            avg_engagement: meta.float("avg_engagement").unwrap_or(0.5),
            peak_engagement: meta.float("peak_engagement").unwrap_or(0.5),
            high_engagement_ratio: meta.float("high_engagement_ratio").unwrap_or(0.0),
            voice: VoiceProfile {
                current_voice: meta.string("current_voice"),
                primary_tones: meta.list("primary_tones"),
                core_beliefs: meta.list("core_beliefs"),
                writing_signature: meta.string("writing_signature"),
                preferred_structures: meta.list("preferred_structures"),
                content_focus_areas: meta.list("content_focus_areas"),
                engagement_approach: meta.string("engagement_approach"),
                success_patterns: meta.list("success_patterns"),
                winning_hooks: meta.list("winning_hooks"),
                engagement_strengths: meta.list("engagement_strengths"),
                voice_maturity_level: meta.float("voice_maturity_level").unwrap_or(0.5),
                engagement_mastery: meta.float("engagement_mastery").unwrap_or(0.5),
                personality_blend: meta.string("personality_blend"),
                evolution_direction: meta.string("evolution_direction"),
            },
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Context Records
// ─────────────────────────────────────────────────────────────────────────────

/// Category of a personal context item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextType {
    #[default]
    Personal,
    Professional,
    Experience,
    Background,
    Values,
}

impl ContextType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextType::Personal => "personal",
            ContextType::Professional => "professional",
            ContextType::Experience => "experience",
            ContextType::Background => "background",
            ContextType::Values => "values",
        }
    }
}

impl std::fmt::Display for ContextType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContextType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "personal" => Ok(ContextType::Personal),
            "professional" => Ok(ContextType::Professional),
            "experience" => Ok(ContextType::Experience),
            "background" => Ok(ContextType::Background),
            "values" => Ok(ContextType::Values),
            _ => Err(format!("Invalid context type: {}", s)),
        }
    }
}

/// Kind of company information
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoType {
    #[default]
    Culture,
    Values,
    News,
    Achievements,
    Products,
    Industry,
}

impl InfoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::Culture => "culture",
            InfoType::Values => "values",
            InfoType::News => "news",
            InfoType::Achievements => "achievements",
            InfoType::Products => "products",
            InfoType::Industry => "industry",
        }
    }
}

impl std::fmt::Display for InfoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InfoType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "culture" => Ok(InfoType::Culture),
            "values" => Ok(InfoType::Values),
            "news" => Ok(InfoType::News),
            "achievements" => Ok(InfoType::Achievements),
            "products" => Ok(InfoType::Products),
            "industry" => Ok(InfoType::Industry),
            _ => Err(format!("Invalid company info type: {}", s)),
        }
    }
}

/// Kind of personal achievement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementType {
    #[default]
    Project,
    Award,
    Milestone,
    Learning,
}

impl AchievementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementType::Project => "project",
            AchievementType::Award => "award",
            AchievementType::Milestone => "milestone",
            AchievementType::Learning => "learning",
        }
    }
}

impl std::fmt::Display for AchievementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AchievementType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "project" => Ok(AchievementType::Project),
            "award" => Ok(AchievementType::Award),
            "milestone" => Ok(AchievementType::Milestone),
            "learning" => Ok(AchievementType::Learning),
            _ => Err(format!("Invalid achievement type: {}", s)),
        }
    }
}

/// A personal or professional fact about the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalContext {
    pub id: String,
    pub user_id: String,
    pub context_type: ContextType,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub importance: f64,
    pub timestamp: DateTime<Utc>,
    pub usage_count: u64,
}

impl MetadataRecord for PersonalContext {
    fn id(&self) -> &str {
        &self.id
    }

    fn document(&self) -> &str {
        &self.content
    }

    fn to_metadata(&self) -> Metadata {
        let mut meta = Metadata::new();
        meta.put("user_id", self.user_id.as_str())
            .put("context_type", self.context_type.as_str())
            .put("title", self.title.as_str())
            .put_list("tags", &self.tags)
            .put("importance", self.importance)
            .put_timestamp("timestamp", &self.timestamp)
            .put("usage_count", self.usage_count);
        meta
    }

    fn from_stored(id: String, document: String, meta: &Metadata) -> Self {
        Self {
            id,
            user_id: meta.string("user_id"),
            context_type: meta
                .str("context_type")
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            title: meta.string("title"),
            content: document,
            tags: meta.list("tags"),
            importance: meta.float("importance").unwrap_or(0.5),
            timestamp: meta.timestamp("timestamp"),
            usage_count: meta.count("usage_count"),
        }
    }
}

/// Information about the user's company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub id: String,
    pub user_id: String,
    pub company_name: String,
    pub info_type: InfoType,
    pub title: String,
    pub content: String,
    pub relevance: f64,
    pub timestamp: DateTime<Utc>,
    pub usage_count: u64,
}

impl MetadataRecord for CompanyInfo {
    fn id(&self) -> &str {
        &self.id
    }

    fn document(&self) -> &str {
        &self.content
    }

    fn to_metadata(&self) -> Metadata {
        let mut meta = Metadata::new();
        meta.put("user_id", self.user_id.as_str())
            .put("company_name", self.company_name.as_str())
            .put("info_type", self.info_type.as_str())
            .put("title", self.title.as_str())
            .put("relevance", self.relevance)
            .put_timestamp("timestamp", &self.timestamp)
            .put("usage_count", self.usage_count);
        meta
    }

    fn from_stored(id: String, document: String, meta: &Metadata) -> Self {
        Self {
            id,
            user_id: meta.string("user_id"),
            company_name: meta.string("company_name"),
            info_type: meta
                .str("info_type")
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            title: meta.string("title"),
            content: document,
            relevance: meta.float("relevance").unwrap_or(0.5),
            timestamp: meta.timestamp("timestamp"),
            usage_count: meta.count("usage_count"),
        }
    }
}

/// A project, award, milestone or learning the user wants to draw on.
///
/// `content` is the composed document that gets embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub user_id: String,
    pub achievement_type: AchievementType,
    pub title: String,
    pub description: String,
    pub impact: String,
    pub date: String,
    pub skills_used: Vec<String>,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub usage_count: u64,
}

impl Achievement {
    /// Compose the searchable document for an achievement.
    ///
    /// Empty optional parts are left out.
    pub fn compose_document(
        title: &str,
        description: &str,
        impact: &str,
        date: &str,
        skills_used: &[String],
    ) -> String {
        let mut doc = format!("Achievement: {}\nDescription: {}", title, description);
        if !impact.trim().is_empty() {
            doc.push_str(&format!("\nImpact: {}", impact));
        }
        if !date.trim().is_empty() {
            doc.push_str(&format!("\nDate: {}", date));
        }
        if !skills_used.is_empty() {
            doc.push_str(&format!("\nSkills Used: {}", skills_used.join(", ")));
        }
        doc
    }
}

impl MetadataRecord for Achievement {
    fn id(&self) -> &str {
        &self.id
    }

    fn document(&self) -> &str {
        &self.content
    }

    fn to_metadata(&self) -> Metadata {
        let mut meta = Metadata::new();
        meta.put("user_id", self.user_id.as_str())
            .put("achievement_type", self.achievement_type.as_str())
            .put("title", self.title.as_str())
            .put("description", self.description.as_str())
            .put("impact", self.impact.as_str())
            .put("date", self.date.as_str())
            .put_list("skills_used", &self.skills_used)
            .put_timestamp("timestamp", &self.timestamp)
            .put("usage_count", self.usage_count);
        meta
    }

    fn from_stored(id: String, document: String, meta: &Metadata) -> Self {
        Self {
            id,
            user_id: meta.string("user_id"),
            achievement_type: meta
                .str("achievement_type")
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            title: meta.string("title"),
            description: meta.string("description"),
            impact: meta.string("impact"),
            date: meta.string("date"),
            skills_used: meta.list("skills_used"),
            content: document,
            timestamp: meta.timestamp("timestamp"),
            usage_count: meta.count("usage_count"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reference Posts
// ─────────────────────────────────────────────────────────────────────────────

/// A post by a followed creator, used as a style reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencePost {
    #[serde(default)]
    pub id: String,
    pub profile_name: String,
    #[serde(default)]
    pub category: String,
    pub post_text: String,
    #[serde(default)]
    pub scraped_at: Option<String>,
}

impl MetadataRecord for ReferencePost {
    fn id(&self) -> &str {
        &self.id
    }

    fn document(&self) -> &str {
        &self.post_text
    }

    fn to_metadata(&self) -> Metadata {
        let mut meta = Metadata::new();
        meta.put("profile_name", self.profile_name.as_str())
            .put("category", self.category.as_str());
        if let Some(at) = &self.scraped_at {
            meta.put("scraped_at", at.as_str());
        }
        meta
    }

    fn from_stored(id: String, document: String, meta: &Metadata) -> Self {
        Self {
            id,
            profile_name: meta.string("profile_name"),
            category: meta.string("category"),
            post_text: document,
            scraped_at: meta.str("scraped_at").map(str::to_string),
        }
    }
}
