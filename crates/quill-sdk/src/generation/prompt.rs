//! Generation prompt assembly.
//!
//! Pure functions: every section is rendered from already-fetched data so
//! the prompt can be inspected in tests without any backend.

use super::types::{SelfExample, SimilarPost, UserProfile};
use crate::config::GenerationConfig;
use crate::context::RelevantContext;
use crate::memory::EngagementInsights;
use crate::utils::join_or;
use quill_core::types::PersonaSnapshot;
use std::fmt::Write;

/// Everything the generation prompt is built from
#[derive(Debug, Clone, Copy)]
pub struct PromptInputs<'a> {
    pub query: &'a str,
    pub profile: &'a UserProfile,
    pub persona: Option<&'a PersonaSnapshot>,
    pub insights: Option<&'a EngagementInsights>,
    pub context: &'a RelevantContext,
    pub self_examples: &'a [SelfExample],
    pub reference_posts: &'a [SimilarPost],
}

fn profile_section(profile: &UserProfile) -> String {
    format!(
        "User Profile:\n\
         - Name: {}\n\
         - Role: {}\n\
         - LinkedIn Goal: {}\n\
         - Preferred Content Types: {}\n\
         - Preferred Tone: {}\n",
        profile.name,
        profile.role,
        profile.linkedin_goal,
        profile.preferred_content_types.join(", "),
        profile.preferred_tone.join(", "),
    )
}

fn voice_section(persona: Option<&PersonaSnapshot>) -> String {
    let Some(persona) = persona else {
        return String::new();
    };
    let v = &persona.voice;
    let or = |s: &str, fallback: &str| {
        if s.trim().is_empty() {
            fallback.to_string()
        } else {
            s.to_string()
        }
    };
    format!(
        "YOUR ENGAGEMENT-OPTIMIZED VOICE (based on your most successful posts):\n\
         - Current Voice: {}\n\
         - Primary Tones: {}\n\
         - Core Beliefs (from high-engagement posts): {}\n\
         - Writing Signature: {}\n\
         - Success Patterns: {}\n\
         - Winning Hooks: {}\n\
         - Engagement Strengths: {}\n\
         - Voice Maturity: {}/1.0\n\
         - Engagement Mastery: {}/1.0\n",
        or(&v.current_voice, "Professional"),
        join_or(&v.primary_tones, "Professional"),
        join_or(&v.core_beliefs, "Growth mindset"),
        or(&v.writing_signature, "Clear and engaging"),
        join_or(&v.success_patterns, "Hook-Insight-Action"),
        join_or(&v.winning_hooks, "Question, Story"),
        join_or(&v.engagement_strengths, "Authentic, Actionable"),
        v.voice_maturity_level,
        v.engagement_mastery,
    )
}

fn performance_section(insights: Option<&EngagementInsights>) -> String {
    let Some(i) = insights else {
        return String::new();
    };
    format!(
        "YOUR ENGAGEMENT PERFORMANCE:\n\
         - Total Posts: {}\n\
         - Average Engagement: {:.2}/1.0\n\
         - Peak Performance: {:.2}/1.0\n\
         - High Performers: {} posts\n\
         - Trend: {}\n",
        i.total_posts, i.avg_engagement, i.peak_engagement, i.high_performers, i.trend,
    )
}

fn context_section(context: &RelevantContext) -> String {
    let mut out = String::new();
    if !context.user_context.is_empty() {
        out.push_str("YOUR PERSONAL CONTEXT:\n");
        for c in &context.user_context {
            let _ = writeln!(out, "- {}: {}", c.title, c.content);
            let _ = writeln!(out, "  Type: {}, Importance: {}", c.context_type, c.importance);
        }
    }
    if !context.company_info.is_empty() {
        out.push_str("\nYOUR COMPANY CONTEXT:\n");
        for c in &context.company_info {
            let _ = writeln!(out, "- {}: {}", c.title, c.content);
            let _ = writeln!(out, "  Company: {}, Type: {}", c.company_name, c.info_type);
        }
    }
    if !context.achievements.is_empty() {
        out.push_str("\nYOUR ACHIEVEMENTS & EXPERIENCES:\n");
        for a in &context.achievements {
            let _ = writeln!(out, "- {}: {}", a.title, a.content);
            if !a.impact.trim().is_empty() {
                let _ = writeln!(out, "  Impact: {}", a.impact);
            }
        }
    }
    out
}

fn self_example_section(examples: &[SelfExample]) -> String {
    if examples.is_empty() {
        return String::new();
    }
    let lines: Vec<String> = examples
        .iter()
        .map(|e| format!("- {}... (Engagement: {:.2})", e.excerpt, e.engagement_score))
        .collect();
    format!(
        "YOUR HIGH-PERFORMING POSTS ON SIMILAR TOPICS:\n{}\n",
        lines.join("\n")
    )
}

fn creator_section(profile: &UserProfile) -> String {
    let mut out = String::new();
    if let Some(likes) = profile.creator_likes.as_deref().filter(|l| !l.trim().is_empty()) {
        let _ = writeln!(out, "What you like about reference creators: {}", likes);
    }
    for creator in profile.reference_creators.iter().filter(|c| c.has_preferences()) {
        let _ = writeln!(out, "\nAbout {}:", creator.name);
        if !creator.tone.is_empty() {
            let _ = writeln!(out, "- Liked tone: {}", creator.tone.join(", "));
        }
        if !creator.content_type.is_empty() {
            let _ = writeln!(out, "- Liked content types: {}", creator.content_type.join(", "));
        }
        if !creator.style.is_empty() {
            let _ = writeln!(out, "- Liked style: {}", creator.style.join(", "));
        }
    }
    out
}

fn reference_section(posts: &[SimilarPost]) -> String {
    if posts.is_empty() {
        return "--- No reference posts available ---\n".to_string();
    }
    let mut out = String::new();
    for (i, p) in posts.iter().enumerate() {
        let name = if p.post.profile_name.trim().is_empty() {
            "Unknown"
        } else {
            p.post.profile_name.as_str()
        };
        let _ = writeln!(out, "--- Reference Post {} (by {}) ---", i + 1, name);
        let _ = writeln!(out, "Similarity Score: {:.3}", p.similarity_score);
        let _ = writeln!(out, "Content: {}", p.post.post_text);
    }
    out
}

fn instructions(query: &str, config: &GenerationConfig) -> String {
    format!(
        "CRITICAL INSTRUCTIONS FOR ENGAGEMENT-OPTIMIZED CONTENT WITH PERSONAL CONTEXT:\n\
         1. Write in the user's EVOLVED VOICE prioritizing their highest-performing patterns\n\
         2. Use their winning hooks and success formulas from high-engagement posts\n\
         3. INCORPORATE relevant personal/company context naturally into the content\n\
         4. Reference their achievements, experiences, or company details when relevant\n\
         5. Make the content authentic by weaving their specific context into the narrative\n\
         6. Address the query: \"{query}\" using their most successful voice elements AND personal context\n\
         7. Apply their engagement strengths and proven structures\n\
         8. Include {min}-{max} relevant hashtags based on their successful content themes and context\n\
         9. Keep within {chars} characters for optimal LinkedIn engagement\n\
         10. Make it authentically theirs while maximizing engagement potential using their real experiences\n",
        query = query,
        min = config.min_hashtags,
        max = config.max_hashtags,
        chars = config.max_characters,
    )
}

/// Assemble the single generation prompt
pub fn build_generation_prompt(inputs: &PromptInputs<'_>, config: &GenerationConfig) -> String {
    let sections = [
        format!(
            "You are creating LinkedIn content for a user whose writing voice has evolved based on ENGAGEMENT SUCCESS PATTERNS.\n\n\
             USER QUERY: \"{}\"\n",
            inputs.query
        ),
        profile_section(inputs.profile),
        voice_section(inputs.persona),
        performance_section(inputs.insights),
        context_section(inputs.context),
        self_example_section(inputs.self_examples),
        creator_section(inputs.profile),
        format!(
            "REFERENCE POSTS (for inspiration):\n{}",
            reference_section(inputs.reference_posts)
        ),
        instructions(inputs.query, config),
        "Generate a LinkedIn post that combines their authentic evolved voice with their highest-engagement elements AND relevant personal/company context:".to_string(),
    ];
    sections
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| s.trim_end())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::CreatorPreference;
    use crate::memory::InsightTrend;
    use chrono::Utc;
    use quill_core::types::{
        Achievement, AchievementType, ContextType, PersonalContext, ReferencePost, VoiceProfile,
    };

    fn profile() -> UserProfile {
        UserProfile {
            name: "Alice".into(),
            role: "Founder".into(),
            linkedin_goal: "Hire engineers".into(),
            preferred_content_types: vec!["Stories".into(), "Tips".into()],
            preferred_tone: vec!["Candid".into()],
            creator_likes: Some("Short punchy lines".into()),
            reference_creators: vec![
                CreatorPreference {
                    name: "Dana".into(),
                    tone: vec!["Bold".into()],
                    ..Default::default()
                },
                CreatorPreference {
                    name: "Eli".into(),
                    ..Default::default()
                },
            ],
        }
    }

    fn render(inputs: PromptInputs<'_>) -> String {
        build_generation_prompt(&inputs, &GenerationConfig::default())
    }

    #[test]
    fn test_minimal_prompt() {
        let profile = UserProfile::default();
        let context = RelevantContext::default();
        let prompt = render(PromptInputs {
            query: "remote hiring",
            profile: &profile,
            persona: None,
            insights: None,
            context: &context,
            self_examples: &[],
            reference_posts: &[],
        });

        assert!(prompt.contains("USER QUERY: \"remote hiring\""));
        assert!(prompt.contains("--- No reference posts available ---"));
        assert!(prompt.contains("8. Include 3-5 relevant hashtags"));
        assert!(prompt.contains("9. Keep within 1300 characters"));
        assert!(!prompt.contains("YOUR ENGAGEMENT-OPTIMIZED VOICE"));
        assert!(!prompt.contains("YOUR ENGAGEMENT PERFORMANCE"));
        assert!(!prompt.contains("YOUR PERSONAL CONTEXT"));
    }

    #[test]
    fn test_full_prompt_sections() {
        let profile = profile();
        let persona = PersonaSnapshot {
            id: "persona_alice".into(),
            user_id: "alice".into(),
            document: String::new(),
            last_updated: Utc::now(),
            avg_engagement: 0.6,
            peak_engagement: 0.9,
            high_engagement_ratio: 0.4,
            voice: VoiceProfile {
                current_voice: "Warm and direct".into(),
                winning_hooks: vec!["Confession".into()],
                voice_maturity_level: 0.8,
                ..Default::default()
            },
        };
        let insights = EngagementInsights {
            total_posts: 7,
            avg_engagement: 0.55,
            peak_engagement: 0.9,
            high_performers: 3,
            trend: InsightTrend::Improving,
        };
        let context = RelevantContext {
            user_context: vec![PersonalContext {
                id: "c1".into(),
                user_id: "alice".into(),
                context_type: ContextType::Background,
                title: "Math educator".into(),
                content: "Taught math for 5 years".into(),
                tags: vec![],
                importance: 0.9,
                timestamp: Utc::now(),
                usage_count: 0,
            }],
            company_info: vec![],
            achievements: vec![Achievement {
                id: "a1".into(),
                user_id: "alice".into(),
                achievement_type: AchievementType::Award,
                title: "Award".into(),
                description: "Best talk".into(),
                impact: "2k views".into(),
                date: String::new(),
                skills_used: vec![],
                content: "Achievement: Award".into(),
                timestamp: Utc::now(),
                usage_count: 0,
            }],
        };
        let examples = vec![SelfExample {
            excerpt: "We hired".into(),
            engagement_score: 0.8,
        }];
        let references = vec![SimilarPost {
            post: ReferencePost {
                id: "r1".into(),
                profile_name: "Dana".into(),
                category: "Tech".into(),
                post_text: "Hiring is a product".into(),
                scraped_at: None,
            },
            similarity_score: 0.8123,
        }];

        let prompt = render(PromptInputs {
            query: "hiring",
            profile: &profile,
            persona: Some(&persona),
            insights: Some(&insights),
            context: &context,
            self_examples: &examples,
            reference_posts: &references,
        });

        assert!(prompt.contains("- Preferred Content Types: Stories, Tips"));
        assert!(prompt.contains("- Current Voice: Warm and direct"));
        assert!(prompt.contains("- Primary Tones: Professional"));
        assert!(prompt.contains("- Winning Hooks: Confession"));
        assert!(prompt.contains("- Voice Maturity: 0.8/1.0"));
        assert!(prompt.contains("- Average Engagement: 0.55/1.0"));
        assert!(prompt.contains("- Trend: improving"));
        assert!(prompt.contains("- Math educator: Taught math for 5 years\n  Type: background, Importance: 0.9"));
        assert!(prompt.contains("  Impact: 2k views"));
        assert!(!prompt.contains("YOUR COMPANY CONTEXT"));
        assert!(prompt.contains("- We hired... (Engagement: 0.80)"));
        assert!(prompt.contains("What you like about reference creators: Short punchy lines"));
        assert!(prompt.contains("About Dana:\n- Liked tone: Bold"));
        assert!(!prompt.contains("About Eli"));
        assert!(prompt.contains("--- Reference Post 1 (by Dana) ---\nSimilarity Score: 0.812\nContent: Hiring is a product"));

        let voice_at = prompt.find("YOUR ENGAGEMENT-OPTIMIZED VOICE").unwrap();
        let refs_at = prompt.find("REFERENCE POSTS").unwrap();
        assert!(voice_at < refs_at);
    }
}
