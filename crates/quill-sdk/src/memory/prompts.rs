//! Prompts for the analysis, compression and snapshot calls.
//!
//! Each prompt asks for a bare JSON object of one fixed shape.

use crate::memory::snapshot::SnapshotMetrics;

const ANALYSIS_SHAPE: &str = r#"{
    "topic": "main topic/theme",
    "tone": "dominant tone",
    "belief": "key belief or stance expressed",
    "style_elements": ["element1", "element2"],
    "post_type": "type",
    "hooks": ["hook1", "hook2"],
    "structure": "how the post is structured",
    "cta_type": "call to action type if any",
    "voice_characteristics": ["characteristic1", "characteristic2"],
    "engagement_factors": ["factor1", "factor2"],
    "success_elements": ["element1", "element2"]
}"#;

const SUMMARY_SHAPE: &str = r#"{
    "period_summary": "brief description focusing on what worked best",
    "dominant_tones": ["tone1", "tone2"],
    "core_beliefs": ["belief1", "belief2"],
    "writing_patterns": ["pattern1", "pattern2"],
    "voice_evolution": "how the voice changed",
    "style_preferences": ["preference1", "preference2"],
    "content_themes": ["theme1", "theme2"],
    "engagement_style": "how they engage with audience",
    "personality_traits": ["trait1", "trait2"],
    "success_formulas": ["formula1", "formula2"],
    "high_engagement_hooks": ["hook1", "hook2"],
    "winning_structures": ["structure1", "structure2"],
    "engagement_strengths": ["strength1", "strength2"],
    "voice_confidence": 0.7,
    "uniqueness_score": 0.8,
    "engagement_optimization": 0.9
}"#;

const VOICE_SHAPE: &str = r#"{
    "current_voice": "dominant voice description",
    "primary_tones": ["tone1", "tone2"],
    "core_beliefs": ["belief1", "belief2"],
    "writing_signature": "unique writing characteristics",
    "preferred_structures": ["structure1", "structure2"],
    "content_focus_areas": ["area1", "area2"],
    "engagement_approach": "how they connect with audience",
    "success_patterns": ["pattern1", "pattern2"],
    "winning_hooks": ["hook1", "hook2"],
    "engagement_strengths": ["strength1", "strength2"],
    "voice_maturity_level": 0.8,
    "engagement_mastery": 0.7,
    "personality_blend": "combination of traits",
    "evolution_direction": "how voice is trending"
}"#;

/// How engaging a score is, in words
pub fn engagement_label(score: f64) -> &'static str {
    if score > 0.7 {
        "highly engaging"
    } else if score > 0.4 {
        "moderately engaging"
    } else {
        "less engaging"
    }
}

pub fn analysis_prompt(post_text: &str, engagement_score: f64) -> String {
    format!(
        "Analyze this LinkedIn post and return a JSON object. \
         This post had an engagement level of {score:.2}/1.0.\n\n\
         Post: \"{post}\"\n\n\
         Focus on identifying what made this post {label}.\n\n\
         Return ONLY a valid JSON object with this exact structure:\n{shape}\n",
        score = engagement_score,
        post = post_text,
        label = engagement_label(engagement_score),
        shape = ANALYSIS_SHAPE,
    )
}

pub fn compression_prompt(post_count: usize, digest: &str, high_threshold: f64) -> String {
    format!(
        "Analyze these {count} posts to understand the user's evolving voice, \
         PRIORITIZING patterns from high-engagement posts (score > {high:.1}):\n\n\
         {digest}\n\n\
         Create a personality evolution summary.\n\n\
         Return ONLY a valid JSON object with this exact structure:\n{shape}\n",
        count = post_count,
        high = high_threshold,
        digest = digest,
        shape = SUMMARY_SHAPE,
    )
}

pub fn snapshot_prompt(metrics: &SnapshotMetrics, evolution_context: &str) -> String {
    format!(
        "Based on this user's writing evolution, create their current persona snapshot.\n\n\
         ENGAGEMENT PERFORMANCE:\n\
         - Average Engagement: {avg:.2}/1.0\n\
         - Peak Engagement: {peak:.2}/1.0\n\
         - High-Engagement Ratio: {ratio:.2}\n\n\
         EVOLUTION CONTEXT:\n{context}\n\n\
         Return ONLY a valid JSON object with this exact structure:\n{shape}\n",
        avg = metrics.avg_engagement,
        peak = metrics.peak_engagement,
        ratio = metrics.high_engagement_ratio,
        context = evolution_context,
        shape = VOICE_SHAPE,
    )
}
