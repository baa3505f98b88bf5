//! STM to LTM compression.
//!
//! Once a user has `compression_threshold` unprocessed STM entries, the
//! whole unprocessed batch is summarized into one LTM entry, weighted
//! toward high-engagement posts. The consumed entries are then marked
//! processed and the persona snapshot is rebuilt.
//!
//! Writing the LTM entry and marking the batch are separate store calls.
//! A crash between them leaves the batch unprocessed, and the next run
//! produces a near-duplicate LTM entry.

use crate::backends::Backends;
use crate::config::MemoryConfig;
use crate::memory::collections::{LONG_TERM, SHORT_TERM};
use crate::memory::fallbacks;
use crate::memory::prompts::compression_prompt;
use crate::memory::scoring::{EngagementTier, TierThresholds};
use crate::memory::snapshot::SnapshotBuilder;
use crate::memory::structured::parse_or_fallback;
use crate::memory::types::CompressionOutcome;
use crate::request::RequestContext;
use crate::utils::{join_or, now_utc, truncate_chars};
use crate::SDKResult;
use chrono::{DateTime, Utc};
use quill_core::db::{MetadataRecord, Where};
use quill_core::types::{EngagementTrend, LtmEntry, PersonaSummary, StmEntry};
use quill_core::CompletionRequest;
use tracing::{debug, error, info, warn, Instrument};

const HIGH_TIER_CHARS: usize = 150;
const MEDIUM_TIER_CHARS: usize = 100;
const LOW_TIER_CHARS: usize = 80;

/// Unprocessed STM entries grouped by engagement tier, each group sorted
/// by score descending
#[derive(Debug, Default)]
pub struct TieredBatch<'a> {
    pub high: Vec<&'a StmEntry>,
    pub medium: Vec<&'a StmEntry>,
    pub low: Vec<&'a StmEntry>,
}

impl<'a> TieredBatch<'a> {
    /// `entries` must already be sorted by score descending
    pub fn partition(entries: &'a [StmEntry], tiers: TierThresholds) -> Self {
        let mut batch = Self::default();
        for entry in entries {
            match tiers.classify(entry.engagement_score) {
                EngagementTier::High => batch.high.push(entry),
                EngagementTier::Medium => batch.medium.push(entry),
                EngagementTier::Low => batch.low.push(entry),
            }
        }
        batch
    }

    /// Improving iff strictly more high-tier than low-tier posts
    pub fn trend(&self) -> EngagementTrend {
        if self.high.len() > self.low.len() {
            EngagementTrend::Improving
        } else {
            EngagementTrend::Mixed
        }
    }

    /// Tier-labeled digest for the compression prompt
    pub fn digest(&self, total: usize) -> String {
        fn section(title: &str, entries: &[&StmEntry], max_chars: usize) -> String {
            let lines: Vec<String> = entries
                .iter()
                .map(|e| {
                    format!(
                        "- {}... (Score: {:.2})",
                        truncate_chars(&e.document, max_chars),
                        e.engagement_score
                    )
                })
                .collect();
            format!("{} ({} posts):\n{}", title, entries.len(), lines.join("\n"))
        }

        format!(
            "ENGAGEMENT-WEIGHTED POST ANALYSIS ({} posts):\n\n{}\n\n{}\n\n{}",
            total,
            section("HIGH ENGAGEMENT POSTS", &self.high, HIGH_TIER_CHARS),
            section("MEDIUM ENGAGEMENT POSTS", &self.medium, MEDIUM_TIER_CHARS),
            section("LOW ENGAGEMENT POSTS", &self.low, LOW_TIER_CHARS),
        )
    }
}

/// Human-readable LTM document
pub fn render_ltm_document(
    at: &DateTime<Utc>,
    post_count: usize,
    avg_engagement: f64,
    max_engagement: f64,
    trend: EngagementTrend,
    summary: &PersonaSummary,
) -> String {
    format!(
        "User Writing Period Analysis (Engagement-Weighted)\n\
         Period: {period}\n\
         Posts Analyzed: {count}\n\
         Average Engagement: {avg:.2}\n\
         Peak Engagement: {peak:.2}\n\
         Engagement Trend: {trend}\n\n\
         Summary: {summary}\n\
         Dominant Tones: {tones}\n\
         Core Beliefs: {beliefs}\n\
         Writing Patterns: {patterns}\n\
         Voice Evolution: {evolution}\n\
         Style Preferences: {style}\n\
         Content Themes: {themes}\n\
         Engagement Style: {engagement_style}\n\
         Personality Traits: {traits}\n\
         Success Formulas: {formulas}\n\
         High-Engagement Hooks: {hooks}\n\
         Winning Structures: {structures}\n\
         Engagement Strengths: {strengths}",
        period = at.format("%Y-%m-%d"),
        count = post_count,
        avg = avg_engagement,
        peak = max_engagement,
        trend = trend,
        summary = summary.period_summary,
        tones = join_or(&summary.dominant_tones, ""),
        beliefs = join_or(&summary.core_beliefs, ""),
        patterns = join_or(&summary.writing_patterns, ""),
        evolution = summary.voice_evolution,
        style = join_or(&summary.style_preferences, ""),
        themes = join_or(&summary.content_themes, ""),
        engagement_style = summary.engagement_style,
        traits = join_or(&summary.personality_traits, ""),
        formulas = join_or(&summary.success_formulas, ""),
        hooks = join_or(&summary.high_engagement_hooks, ""),
        structures = join_or(&summary.winning_structures, ""),
        strengths = join_or(&summary.engagement_strengths, ""),
    )
}

/// Folds batches of STM entries into LTM entries
#[derive(Clone)]
pub struct CompressionEngine {
    backends: Backends,
    config: MemoryConfig,
    snapshots: SnapshotBuilder,
}

impl CompressionEngine {
    pub fn new(backends: Backends, config: MemoryConfig, snapshots: SnapshotBuilder) -> Self {
        Self {
            backends,
            config,
            snapshots,
        }
    }

    pub fn snapshots(&self) -> &SnapshotBuilder {
        &self.snapshots
    }

    fn unprocessed_filter(ctx: &RequestContext) -> Where {
        ctx.owner_filter().and(Where::eq("processed", false))
    }

    /// The user's unprocessed STM entries
    pub fn unprocessed(&self, ctx: &RequestContext) -> SDKResult<Vec<StmEntry>> {
        let docs = self
            .backends
            .store
            .get(SHORT_TERM, None, Some(&Self::unprocessed_filter(ctx)))?;
        Ok(docs.into_iter().map(StmEntry::from_document).collect())
    }

    pub fn unprocessed_count(&self, ctx: &RequestContext) -> SDKResult<usize> {
        Ok(self
            .backends
            .store
            .count(SHORT_TERM, Some(&Self::unprocessed_filter(ctx)))?)
    }

    /// Compress the user's unprocessed STM entries into one LTM entry.
    ///
    /// Returns `None` without side effects while fewer than
    /// `compression_threshold` entries are unprocessed. A provider failure
    /// is returned before anything is written, so the call can be retried.
    pub async fn compress(&self, ctx: &RequestContext) -> SDKResult<Option<CompressionOutcome>> {
        self.compress_inner(ctx)
            .instrument(ctx.span("compress"))
            .await
    }

    async fn compress_inner(&self, ctx: &RequestContext) -> SDKResult<Option<CompressionOutcome>> {
        let mut entries = self.unprocessed(ctx)?;
        if entries.len() < self.config.compression_threshold {
            debug!(
                unprocessed = entries.len(),
                threshold = self.config.compression_threshold,
                "Below compression threshold"
            );
            return Ok(None);
        }

        entries.sort_by(|a, b| b.engagement_score.total_cmp(&a.engagement_score));
        let batch = TieredBatch::partition(&entries, TierThresholds::from_config(&self.config));
        let digest = batch.digest(entries.len());

        let prompt = compression_prompt(entries.len(), &digest, self.config.high_engagement_threshold);
        let raw = match self
            .backends
            .complete(CompletionRequest::new(prompt, self.config.analysis_temperature))
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                error!(error = %e, "Compression call failed, batch left unprocessed");
                return Err(e);
            }
        };
        let parsed = parse_or_fallback(&raw, "long-term summary", fallbacks::persona_summary);

        let n = entries.len() as f64;
        let avg_engagement = entries.iter().map(|e| e.engagement_score).sum::<f64>() / n;
        let max_engagement = entries
            .iter()
            .map(|e| e.engagement_score)
            .fold(f64::MIN, f64::max);
        let trend = batch.trend();
        let now = now_utc();

        let ltm = LtmEntry {
            id: format!("ltm_{}_{}", ctx.user_id(), uuid::Uuid::new_v4().simple()),
            user_id: ctx.user_id().to_string(),
            document: render_ltm_document(
                &now,
                entries.len(),
                avg_engagement,
                max_engagement,
                trend,
                &parsed.value,
            ),
            timestamp: now,
            post_count: entries.len() as u64,
            avg_engagement,
            max_engagement,
            high_engagement_count: batch.high.len() as u64,
            engagement_trend: trend,
            summary: parsed.value,
        };

        let embedding = self.backends.embed(&ltm.document).await?;
        self.backends
            .store
            .add(LONG_TERM, vec![ltm.to_new_document(Some(embedding))])?;

        let updates = entries
            .iter()
            .map(|e| {
                let mut meta = e.to_metadata();
                meta.put("processed", true);
                (e.id.clone(), meta)
            })
            .collect();
        let marked = self.backends.store.update_metadata(SHORT_TERM, updates)?;
        if marked != entries.len() {
            warn!(expected = entries.len(), marked, "Some STM entries were not marked processed");
        }

        info!(
            ltm_id = %ltm.id,
            posts = entries.len(),
            avg_engagement,
            trend = %trend,
            "Compressed short-term memory"
        );

        let snapshot_error = match self.snapshots.rebuild(ctx).await {
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "Snapshot rebuild failed after compression");
                Some(e.to_string())
            }
        };

        Ok(Some(CompressionOutcome {
            ltm_id: ltm.id,
            post_count: ltm.post_count,
            avg_engagement,
            max_engagement,
            high_engagement_count: ltm.high_engagement_count,
            engagement_trend: trend,
            used_fallback: parsed.used_fallback,
            snapshot_error,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{in_memory_backends, ScriptedGenerator};
    use quill_core::types::{EngagementCounts, PostAnalysis};
    use std::sync::Arc;

    fn stm(id: &str, user: &str, score: f64, text: &str) -> StmEntry {
        StmEntry {
            id: id.to_string(),
            user_id: user.to_string(),
            document: text.to_string(),
            analysis: PostAnalysis::default(),
            engagement_score: score,
            counts: EngagementCounts::default(),
            timestamp: now_utc(),
            processed: false,
        }
    }

    fn seed(backends: &Backends, user: &str, scores: &[f64]) {
        let docs = scores
            .iter()
            .enumerate()
            .map(|(i, s)| {
                stm(&format!("stm_{}_{}", user, i), user, *s, &format!("post {} by {}", i, user))
                    .to_new_document(Some(vec![0.5; 64]))
            })
            .collect();
        backends.store.add(SHORT_TERM, docs).unwrap();
    }

    fn engine(backends: &Backends) -> CompressionEngine {
        let config = MemoryConfig::default();
        let snapshots = SnapshotBuilder::new(backends.clone(), config.clone());
        CompressionEngine::new(backends.clone(), config, snapshots)
    }

    #[test]
    fn test_trend_requires_strictly_more_high() {
        let tiers = TierThresholds::default();
        let mk = |scores: &[f64]| -> Vec<StmEntry> {
            scores.iter().map(|s| stm("x", "u", *s, "t")).collect()
        };

        let improving = mk(&[0.9, 0.8, 0.7, 0.5, 0.1]);
        assert_eq!(TieredBatch::partition(&improving, tiers).trend(), EngagementTrend::Improving);

        let mixed = mk(&[0.9, 0.8, 0.2, 0.1, 0.15]);
        assert_eq!(TieredBatch::partition(&mixed, tiers).trend(), EngagementTrend::Mixed);

        let tied = mk(&[0.9, 0.8, 0.5, 0.2, 0.1]);
        assert_eq!(TieredBatch::partition(&tied, tiers).trend(), EngagementTrend::Mixed);
    }

    #[test]
    fn test_digest_truncates_per_tier() {
        let long = "x".repeat(300);
        let entries = vec![
            stm("h", "u", 0.9, &long),
            stm("m", "u", 0.5, &long),
            stm("l", "u", 0.1, &long),
        ];
        let batch = TieredBatch::partition(&entries, TierThresholds::default());
        let digest = batch.digest(entries.len());

        assert!(digest.starts_with("ENGAGEMENT-WEIGHTED POST ANALYSIS (3 posts):"));
        assert!(digest.contains(&format!("- {}... (Score: 0.90)", "x".repeat(150))));
        assert!(digest.contains(&format!("- {}... (Score: 0.50)", "x".repeat(100))));
        assert!(digest.contains(&format!("- {}... (Score: 0.10)", "x".repeat(80))));
        assert!(!digest.contains(&"x".repeat(151)));
        assert!(digest.contains("HIGH ENGAGEMENT POSTS (1 posts):"));
    }

    #[tokio::test]
    async fn test_compress_below_threshold_is_noop() {
        let generator = Arc::new(ScriptedGenerator::new());
        let backends = in_memory_backends(generator.clone()).unwrap();
        seed(&backends, "alice", &[0.5, 0.5, 0.5, 0.5]);

        let ctx = RequestContext::new("alice").unwrap();
        assert!(engine(&backends).compress(&ctx).await.unwrap().is_none());
        assert_eq!(generator.call_count(), 0);
        assert_eq!(backends.store.count(LONG_TERM, None).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_compress_writes_ltm_and_marks_batch() {
        let generator = Arc::new(ScriptedGenerator::new());
        generator
            .push_text(r#"```json
{"period_summary": "Stories won", "dominant_tones": ["Candid"]}
```"#)
            .push_text("{}");
        let backends = in_memory_backends(generator.clone()).unwrap();
        seed(&backends, "alice", &[0.2, 0.9, 0.5, 0.8, 0.1]);
        seed(&backends, "bob", &[0.5, 0.5]);

        let ctx = RequestContext::new("alice").unwrap();
        let engine = engine(&backends);
        let outcome = engine.compress(&ctx).await.unwrap().unwrap();

        assert_eq!(outcome.post_count, 5);
        assert_eq!(outcome.high_engagement_count, 2);
        assert_eq!(outcome.engagement_trend, EngagementTrend::Mixed);
        assert!((outcome.avg_engagement - 0.5).abs() < 1e-9);
        assert_eq!(outcome.max_engagement, 0.9);
        assert!(!outcome.used_fallback);
        assert!(outcome.snapshot_error.is_none());

        assert_eq!(engine.unprocessed_count(&ctx).unwrap(), 0);
        let bob = RequestContext::new("bob").unwrap();
        assert_eq!(engine.unprocessed_count(&bob).unwrap(), 2);

        let ltm = engine.snapshots().long_term_entries(&ctx).unwrap();
        assert_eq!(ltm.len(), 1);
        assert_eq!(ltm[0].summary.period_summary, "Stories won");
        assert!(ltm[0].document.contains("Posts Analyzed: 5"));

        // The digest lists the batch highest score first
        let prompt = &generator.requests()[0].prompt;
        assert!(prompt.find("post 1 by alice").unwrap() < prompt.find("post 3 by alice").unwrap());
        assert_eq!(generator.requests()[0].temperature, 0.3);

        assert!(engine.compress(&ctx).await.unwrap().is_none());
        assert_eq!(backends.store.count(LONG_TERM, None).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_leaves_batch_unprocessed() {
        let generator = Arc::new(ScriptedGenerator::new());
        generator.push_failure("connection reset");
        let backends = in_memory_backends(generator.clone()).unwrap();
        seed(&backends, "alice", &[0.5; 5]);

        let ctx = RequestContext::new("alice").unwrap();
        let engine = engine(&backends);
        let err = engine.compress(&ctx).await.unwrap_err();

        assert!(err.is_provider_unavailable());
        assert_eq!(engine.unprocessed_count(&ctx).unwrap(), 5);
        assert_eq!(backends.store.count(LONG_TERM, None).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_snapshot_failure_is_reported_not_raised() {
        let generator = Arc::new(ScriptedGenerator::new());
        generator.push_text("garbage").push_failure("snapshot down");
        let backends = in_memory_backends(generator.clone()).unwrap();
        seed(&backends, "alice", &[0.7; 5]);

        let ctx = RequestContext::new("alice").unwrap();
        let engine = engine(&backends);
        let outcome = engine.compress(&ctx).await.unwrap().unwrap();

        assert!(outcome.used_fallback);
        assert_eq!(outcome.engagement_trend, EngagementTrend::Improving);
        assert!(outcome.snapshot_error.unwrap().contains("snapshot down"));
        assert_eq!(engine.unprocessed_count(&ctx).unwrap(), 0);

        let ltm = engine.snapshots().long_term_entries(&ctx).unwrap();
        assert_eq!(ltm[0].summary.dominant_tones, vec!["Professional"]);
    }
}
