//! Default records used when provider output cannot be decoded.

use quill_core::types::{PersonaSummary, PostAnalysis, VoiceProfile};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Analysis used when a post's analysis reply is unusable
pub fn post_analysis(topic: &str, post_type: &str) -> PostAnalysis {
    PostAnalysis {
        topic: topic.to_string(),
        tone: "Professional".to_string(),
        belief: "Growth mindset".to_string(),
        style_elements: strings(&["Clear", "Engaging"]),
        post_type: post_type.to_string(),
        hooks: strings(&["Question"]),
        structure: "Hook-Content-Action".to_string(),
        cta_type: "Engagement".to_string(),
        voice_characteristics: strings(&["Professional", "Authentic"]),
        engagement_factors: strings(&["Relatable", "Actionable"]),
        success_elements: strings(&["Clear message", "Call to action"]),
    }
}

/// Fill the fields a decoded analysis must always carry
pub fn fill_analysis(analysis: &mut PostAnalysis, topic: &str, post_type: &str) {
    if analysis.topic.trim().is_empty() {
        analysis.topic = topic.to_string();
    }
    if analysis.tone.trim().is_empty() {
        analysis.tone = "Professional".to_string();
    }
    if analysis.post_type.trim().is_empty() {
        analysis.post_type = post_type.to_string();
    }
}

/// Summary used when a compression reply is unusable
pub fn persona_summary() -> PersonaSummary {
    PersonaSummary {
        period_summary: "Analysis period summary".to_string(),
        dominant_tones: strings(&["Professional"]),
        core_beliefs: strings(&["Growth mindset"]),
        writing_patterns: strings(&["Clear communication"]),
        voice_evolution: "Voice developing".to_string(),
        style_preferences: strings(&["Professional"]),
        content_themes: strings(&["Professional development"]),
        engagement_style: "Professional engagement".to_string(),
        personality_traits: strings(&["Professional"]),
        success_formulas: strings(&["Hook-Content-Action"]),
        high_engagement_hooks: strings(&["Question"]),
        winning_structures: strings(&["Problem-Solution"]),
        engagement_strengths: strings(&["Clear", "Professional"]),
        voice_confidence: 0.7,
        uniqueness_score: 0.8,
        engagement_optimization: 0.9,
    }
}

/// Voice profile used when a snapshot reply is unusable
pub fn voice_profile() -> VoiceProfile {
    VoiceProfile {
        current_voice: "Professional and engaging".to_string(),
        primary_tones: strings(&["Professional", "Friendly"]),
        core_beliefs: strings(&["Growth mindset", "Continuous learning"]),
        writing_signature: "Clear and actionable content".to_string(),
        preferred_structures: strings(&["Hook-Insight-Action"]),
        content_focus_areas: strings(&["Professional development"]),
        engagement_approach: "Ask questions and provide value".to_string(),
        success_patterns: strings(&["Start with story", "End with action"]),
        winning_hooks: strings(&["Question", "Story"]),
        engagement_strengths: strings(&["Authentic", "Actionable"]),
        voice_maturity_level: 0.8,
        engagement_mastery: 0.7,
        personality_blend: "Professional yet approachable".to_string(),
        evolution_direction: "Toward more engaging content".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_analysis_only_touches_required_fields() {
        let mut analysis = PostAnalysis {
            belief: String::new(),
            ..Default::default()
        };
        fill_analysis(&mut analysis, "Hiring", "Story");
        assert_eq!(analysis.topic, "Hiring");
        assert_eq!(analysis.tone, "Professional");
        assert_eq!(analysis.post_type, "Story");
        assert!(analysis.belief.is_empty());
        assert!(analysis.hooks.is_empty());
    }

    #[test]
    fn test_fallback_analysis_keeps_caller_fields() {
        let analysis = post_analysis("Remote work", "Generated");
        assert_eq!(analysis.topic, "Remote work");
        assert_eq!(analysis.post_type, "Generated");
        assert_eq!(analysis.hooks, vec!["Question"]);
    }
}
