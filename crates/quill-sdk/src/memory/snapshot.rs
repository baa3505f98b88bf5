//! Persona snapshot builder.
//!
//! A snapshot is the single current-state voice record for a user. It is
//! rebuilt from the most recent LTM entries after every compression and
//! replaces whatever snapshot existed before.

use crate::backends::Backends;
use crate::config::MemoryConfig;
use crate::memory::collections::{LONG_TERM, PERSONA_SNAPSHOTS};
use crate::memory::fallbacks;
use crate::memory::prompts::snapshot_prompt;
use crate::memory::structured::parse_or_fallback;
use crate::request::RequestContext;
use crate::utils::{join_or, now_utc};
use crate::SDKResult;
use quill_core::db::MetadataRecord;
use quill_core::types::{LtmEntry, PersonaSnapshot, VoiceProfile};
use quill_core::CompletionRequest;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, Instrument};

/// Engagement aggregates over all of a user's LTM entries
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetrics {
    pub avg_engagement: f64,
    pub peak_engagement: f64,
    pub high_engagement_ratio: f64,
}

impl SnapshotMetrics {
    /// `None` for an empty slice
    pub fn from_entries(entries: &[LtmEntry]) -> Option<Self> {
        if entries.is_empty() {
            return None;
        }
        let n = entries.len() as f64;
        let avg_engagement = entries.iter().map(|e| e.avg_engagement).sum::<f64>() / n;
        let peak_engagement = entries
            .iter()
            .map(|e| e.max_engagement)
            .fold(f64::MIN, f64::max);
        let high_engagement_ratio = entries
            .iter()
            .map(|e| e.high_engagement_count as f64 / e.post_count.max(1) as f64)
            .sum::<f64>()
            / n;
        Some(Self {
            avg_engagement,
            peak_engagement,
            high_engagement_ratio,
        })
    }
}

/// Order LTM entries newest first, breaking ties toward higher average
/// engagement.
pub fn rank_for_snapshot(entries: &mut [LtmEntry]) {
    entries.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| b.avg_engagement.total_cmp(&a.avg_engagement))
    });
}

/// Human-readable snapshot document
pub fn render_snapshot_document(metrics: &SnapshotMetrics, voice: &VoiceProfile) -> String {
    format!(
        "Current Persona Snapshot (Engagement-Optimized)\n\n\
         ENGAGEMENT PERFORMANCE:\n\
         Average Engagement: {avg:.2}/1.0\n\
         Peak Engagement: {peak:.2}/1.0\n\
         High-Performance Ratio: {ratio:.1}%\n\n\
         EVOLVED VOICE PROFILE:\n\
         Voice Description: {voice}\n\
         Primary Tones: {tones}\n\
         Core Beliefs: {beliefs}\n\
         Writing Signature: {signature}\n\
         Preferred Structures: {structures}\n\
         Content Focus: {focus}\n\
         Engagement Style: {approach}\n\n\
         SUCCESS FORMULAS:\n\
         Success Patterns: {patterns}\n\
         Winning Hooks: {hooks}\n\
         Engagement Strengths: {strengths}\n\n\
         MATURITY METRICS:\n\
         Voice Maturity: {maturity}\n\
         Engagement Mastery: {mastery}\n\
         Personality Blend: {blend}\n\
         Evolution Direction: {direction}",
        avg = metrics.avg_engagement,
        peak = metrics.peak_engagement,
        ratio = metrics.high_engagement_ratio * 100.0,
        voice = voice.current_voice,
        tones = join_or(&voice.primary_tones, ""),
        beliefs = join_or(&voice.core_beliefs, ""),
        signature = voice.writing_signature,
        structures = join_or(&voice.preferred_structures, ""),
        focus = join_or(&voice.content_focus_areas, ""),
        approach = voice.engagement_approach,
        patterns = join_or(&voice.success_patterns, ""),
        hooks = join_or(&voice.winning_hooks, ""),
        strengths = join_or(&voice.engagement_strengths, ""),
        maturity = voice.voice_maturity_level,
        mastery = voice.engagement_mastery,
        blend = voice.personality_blend,
        direction = voice.evolution_direction,
    )
}

/// Builds and reads persona snapshots
#[derive(Clone)]
pub struct SnapshotBuilder {
    backends: Backends,
    config: MemoryConfig,
}

impl SnapshotBuilder {
    pub fn new(backends: Backends, config: MemoryConfig) -> Self {
        Self { backends, config }
    }

    /// All LTM entries of the user, in insertion order
    pub fn long_term_entries(&self, ctx: &RequestContext) -> SDKResult<Vec<LtmEntry>> {
        let docs = self
            .backends
            .store
            .get(LONG_TERM, None, Some(&ctx.owner_filter()))?;
        Ok(docs.into_iter().map(LtmEntry::from_document).collect())
    }

    /// The user's current snapshot, if one has been built
    pub fn current(&self, ctx: &RequestContext) -> SDKResult<Option<PersonaSnapshot>> {
        let id = PersonaSnapshot::id_for(ctx.user_id());
        let docs = self.backends.store.get(
            PERSONA_SNAPSHOTS,
            Some(std::slice::from_ref(&id)),
            Some(&ctx.owner_filter()),
        )?;
        Ok(docs.into_iter().next().map(PersonaSnapshot::from_document))
    }

    /// Rebuild the user's snapshot from their LTM entries.
    ///
    /// Returns `None` without writing when the user has no LTM entries.
    /// A provider failure is returned and leaves any previous snapshot in
    /// place.
    pub async fn rebuild(&self, ctx: &RequestContext) -> SDKResult<Option<PersonaSnapshot>> {
        self.rebuild_inner(ctx)
            .instrument(ctx.span("snapshot_rebuild"))
            .await
    }

    async fn rebuild_inner(&self, ctx: &RequestContext) -> SDKResult<Option<PersonaSnapshot>> {
        let mut entries = self.long_term_entries(ctx)?;
        let Some(metrics) = SnapshotMetrics::from_entries(&entries) else {
            debug!("No long-term memory yet, skipping snapshot");
            return Ok(None);
        };

        rank_for_snapshot(&mut entries);
        let evolution_context = entries
            .iter()
            .take(self.config.snapshot_window)
            .map(|e| e.document.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let raw = self
            .backends
            .complete(CompletionRequest::new(
                snapshot_prompt(&metrics, &evolution_context),
                self.config.analysis_temperature,
            ))
            .await?;
        let voice = parse_or_fallback(&raw, "persona snapshot", fallbacks::voice_profile).value;

        let snapshot = PersonaSnapshot {
            id: PersonaSnapshot::id_for(ctx.user_id()),
            user_id: ctx.user_id().to_string(),
            document: render_snapshot_document(&metrics, &voice),
            last_updated: now_utc(),
            avg_engagement: metrics.avg_engagement,
            peak_engagement: metrics.peak_engagement,
            high_engagement_ratio: metrics.high_engagement_ratio,
            voice,
        };

        let embedding = self.backends.embed(&snapshot.document).await?;
        let store = &self.backends.store;
        store.delete(PERSONA_SNAPSHOTS, std::slice::from_ref(&snapshot.id))?;
        store.add(PERSONA_SNAPSHOTS, vec![snapshot.to_new_document(Some(embedding))])?;

        info!(
            ltm_entries = entries.len(),
            avg_engagement = metrics.avg_engagement,
            "Persona snapshot rebuilt"
        );
        Ok(Some(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{in_memory_backends, ScriptedGenerator};
    use chrono::{Duration, Utc};
    use quill_core::types::EngagementTrend;
    use std::sync::Arc;

    fn ltm(id: &str, user: &str, age_days: i64, avg: f64, max: f64, high: u64, posts: u64) -> LtmEntry {
        LtmEntry {
            id: id.to_string(),
            user_id: user.to_string(),
            document: format!("period {}", id),
            timestamp: Utc::now() - Duration::days(age_days),
            post_count: posts,
            avg_engagement: avg,
            max_engagement: max,
            high_engagement_count: high,
            engagement_trend: EngagementTrend::Mixed,
            summary: fallbacks::persona_summary(),
        }
    }

    #[test]
    fn test_metrics_span_all_entries() {
        let entries = vec![
            ltm("a", "u", 3, 0.4, 0.7, 1, 5),
            ltm("b", "u", 2, 0.6, 0.9, 3, 5),
            ltm("c", "u", 1, 0.5, 0.8, 0, 0),
        ];
        let m = SnapshotMetrics::from_entries(&entries).unwrap();
        assert!((m.avg_engagement - 0.5).abs() < 1e-9);
        assert_eq!(m.peak_engagement, 0.9);
        // (0.2 + 0.6 + 0.0) / 3
        assert!((m.high_engagement_ratio - 0.8 / 3.0).abs() < 1e-9);
        assert!(SnapshotMetrics::from_entries(&[]).is_none());
    }

    #[test]
    fn test_rank_newest_first_ties_by_engagement() {
        let mut entries = vec![
            ltm("old", "u", 5, 0.9, 0.9, 0, 5),
            ltm("new", "u", 0, 0.2, 0.2, 0, 5),
        ];
        let mut tied_low = ltm("tie_low", "u", 0, 0.3, 0.3, 0, 5);
        let mut tied_high = ltm("tie_high", "u", 0, 0.8, 0.8, 0, 5);
        let at = Utc::now() - Duration::days(1);
        tied_low.timestamp = at;
        tied_high.timestamp = at;
        entries.push(tied_low);
        entries.push(tied_high);

        rank_for_snapshot(&mut entries);
        let order: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(order, vec!["new", "tie_high", "tie_low", "old"]);
    }

    #[tokio::test]
    async fn test_rebuild_without_ltm_is_noop() {
        let generator = Arc::new(ScriptedGenerator::new());
        let backends = in_memory_backends(generator.clone()).unwrap();
        let builder = SnapshotBuilder::new(backends.clone(), MemoryConfig::default());
        let ctx = RequestContext::new("alice").unwrap();

        assert!(builder.rebuild(&ctx).await.unwrap().is_none());
        assert_eq!(generator.call_count(), 0);
        assert_eq!(backends.store.count(PERSONA_SNAPSHOTS, None).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rebuild_replaces_previous_snapshot() {
        let generator = Arc::new(ScriptedGenerator::new());
        generator
            .push_text(r#"{"current_voice": "Candid builder", "winning_hooks": ["Confession"]}"#)
            .push_text("not json");
        let backends = in_memory_backends(generator.clone()).unwrap();
        let entry = ltm("ltm_1", "alice", 0, 0.5, 0.9, 2, 5);
        backends
            .store
            .add(LONG_TERM, vec![entry.to_new_document(Some(vec![0.1; 64]))])
            .unwrap();

        let builder = SnapshotBuilder::new(backends.clone(), MemoryConfig::default());
        let ctx = RequestContext::new("alice").unwrap();

        let first = builder.rebuild(&ctx).await.unwrap().unwrap();
        assert_eq!(first.id, "persona_alice");
        assert_eq!(first.voice.current_voice, "Candid builder");
        assert_eq!(first.voice.winning_hooks, vec!["Confession"]);
        assert!((first.high_engagement_ratio - 0.4).abs() < 1e-9);

        let second = builder.rebuild(&ctx).await.unwrap().unwrap();
        assert_eq!(second.voice.current_voice, "Professional and engaging");
        assert_eq!(backends.store.count(PERSONA_SNAPSHOTS, None).unwrap(), 1);

        let current = builder.current(&ctx).unwrap().unwrap();
        assert_eq!(current.voice.current_voice, "Professional and engaging");

        let bob = RequestContext::new("bob").unwrap();
        assert!(builder.current(&bob).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_provider_failure_keeps_old_snapshot() {
        let generator = Arc::new(ScriptedGenerator::new());
        generator.push_text("{}").push_failure("rate limited");
        let backends = in_memory_backends(generator.clone()).unwrap();
        let entry = ltm("ltm_1", "alice", 0, 0.5, 0.9, 2, 5);
        backends
            .store
            .add(LONG_TERM, vec![entry.to_new_document(None)])
            .unwrap();

        let builder = SnapshotBuilder::new(backends.clone(), MemoryConfig::default());
        let ctx = RequestContext::new("alice").unwrap();
        builder.rebuild(&ctx).await.unwrap();

        let err = builder.rebuild(&ctx).await.unwrap_err();
        assert!(err.is_provider_unavailable());
        assert!(builder.current(&ctx).unwrap().is_some());
    }
}
