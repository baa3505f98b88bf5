//! Short-term memory: analyzed posts awaiting compression.

use crate::backends::Backends;
use crate::config::MemoryConfig;
use crate::error::SDKError;
use crate::memory::collections::SHORT_TERM;
use crate::memory::compression::CompressionEngine;
use crate::memory::fallbacks;
use crate::memory::prompts::analysis_prompt;
use crate::memory::scoring::EngagementScorer;
use crate::memory::structured::parse_or_fallback;
use crate::memory::types::{
    CompressionStatus, EngagementInsights, InsightTrend, NewPost, RecordedPost,
};
use crate::request::RequestContext;
use crate::utils::{now_utc, require_text};
use crate::SDKResult;
use quill_core::db::MetadataRecord;
use quill_core::types::{EngagementCounts, StmEntry};
use quill_core::CompletionRequest;
use tracing::{debug, info, warn, Instrument};

/// Number of most recent posts compared against the rest for the trend
const RECENT_WINDOW: usize = 3;

/// Engagement aggregates over scores in timestamp order.
///
/// Returns `None` for an empty slice.
pub fn compute_insights(scores: &[f64], high_threshold: f64) -> Option<EngagementInsights> {
    if scores.is_empty() {
        return None;
    }
    let mean = |s: &[f64]| s.iter().sum::<f64>() / s.len() as f64;

    let trend = if scores.len() > RECENT_WINDOW {
        let (earlier, recent) = scores.split_at(scores.len() - RECENT_WINDOW);
        if mean(recent) > mean(earlier) {
            InsightTrend::Improving
        } else {
            InsightTrend::Stable
        }
    } else {
        InsightTrend::Stable
    };

    Some(EngagementInsights {
        total_posts: scores.len(),
        avg_engagement: mean(scores),
        peak_engagement: scores.iter().copied().fold(f64::MIN, f64::max),
        high_performers: scores.iter().filter(|s| **s > high_threshold).count(),
        trend,
    })
}

/// Records posts into short-term memory and triggers compression
#[derive(Clone)]
pub struct MemoryBuffer {
    backends: Backends,
    config: MemoryConfig,
    scorer: EngagementScorer,
    compression: CompressionEngine,
}

impl MemoryBuffer {
    pub fn new(backends: Backends, config: MemoryConfig, compression: CompressionEngine) -> Self {
        let scorer = EngagementScorer::from_config(&config);
        Self {
            backends,
            config,
            scorer,
            compression,
        }
    }

    pub fn compression(&self) -> &CompressionEngine {
        &self.compression
    }

    pub fn scorer(&self) -> &EngagementScorer {
        &self.scorer
    }

    /// Analyze a post, store it as an STM entry and compress if the
    /// unprocessed backlog reached the threshold.
    ///
    /// A provider failure during analysis is returned and nothing is
    /// written. A failed compression does not undo the STM write; it is
    /// reported through [`CompressionStatus::Failed`].
    pub async fn record(&self, ctx: &RequestContext, post: NewPost) -> SDKResult<RecordedPost> {
        self.record_inner(ctx, post)
            .instrument(ctx.span("record_post"))
            .await
    }

    async fn record_inner(&self, ctx: &RequestContext, post: NewPost) -> SDKResult<RecordedPost> {
        require_text("post_text", &post.text)?;

        let engagement_score = self.scorer.score_optional(post.engagement.as_ref());
        let prompt = analysis_prompt(&post.text, engagement_score);
        debug!(prompt_chars = prompt.len(), engagement_score, "Requesting post analysis");
        let raw = self
            .backends
            .complete(CompletionRequest::new(prompt, self.config.analysis_temperature))
            .await?;

        let mut parsed = parse_or_fallback(&raw, "post analysis", || {
            fallbacks::post_analysis(&post.topic, &post.post_type)
        });
        fallbacks::fill_analysis(&mut parsed.value, &post.topic, &post.post_type);

        let entry = StmEntry {
            id: format!("stm_{}_{}", ctx.user_id(), uuid::Uuid::new_v4().simple()),
            user_id: ctx.user_id().to_string(),
            document: post.text,
            analysis: parsed.value,
            engagement_score,
            counts: post.engagement.unwrap_or_default(),
            timestamp: now_utc(),
            processed: false,
        };
        let embedding = self.backends.embed(&entry.document).await?;
        self.backends
            .store
            .add(SHORT_TERM, vec![entry.to_new_document(Some(embedding))])?;
        info!(entry_id = %entry.id, engagement_score, "Recorded post");

        let unprocessed = self.compression.unprocessed_count(ctx)?;
        let compression = if unprocessed >= self.config.compression_threshold {
            match self.compression.compress(ctx).await {
                Ok(Some(outcome)) => CompressionStatus::Compressed(outcome),
                Ok(None) => CompressionStatus::NotTriggered,
                Err(e) => {
                    warn!(error = %e, "Compression failed, post kept in short-term memory");
                    CompressionStatus::Failed {
                        message: e.to_string(),
                    }
                }
            }
        } else {
            CompressionStatus::NotTriggered
        };

        Ok(RecordedPost {
            entry_id: entry.id,
            engagement_score,
            used_fallback: parsed.used_fallback,
            compression,
        })
    }

    /// Every STM entry of the user, oldest first
    pub fn entries(&self, ctx: &RequestContext) -> SDKResult<Vec<StmEntry>> {
        let docs = self
            .backends
            .store
            .get(SHORT_TERM, None, Some(&ctx.owner_filter()))?;
        let mut entries: Vec<StmEntry> = docs.into_iter().map(StmEntry::from_document).collect();
        entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(entries)
    }

    pub fn insights(&self, ctx: &RequestContext) -> SDKResult<Option<EngagementInsights>> {
        let scores: Vec<f64> = self
            .entries(ctx)?
            .iter()
            .map(|e| e.engagement_score)
            .collect();
        Ok(compute_insights(&scores, self.config.high_engagement_threshold))
    }

    /// Re-score a stored post once its real engagement is known.
    ///
    /// The processed flag and the analysis are kept as they are.
    pub async fn update_engagement(
        &self,
        ctx: &RequestContext,
        entry_id: &str,
        counts: EngagementCounts,
    ) -> SDKResult<StmEntry> {
        let ids = [entry_id.to_string()];
        let mut entry = self
            .backends
            .store
            .get(SHORT_TERM, Some(ids.as_slice()), Some(&ctx.owner_filter()))?
            .into_iter()
            .next()
            .map(StmEntry::from_document)
            .ok_or_else(|| SDKError::not_found("stm_entry", entry_id))?;

        let previous = entry.engagement_score;
        entry.engagement_score = self.scorer.score(&counts);
        entry.counts = counts;
        self.backends
            .store
            .update_metadata(SHORT_TERM, vec![(entry.id.clone(), entry.to_metadata())])?;

        info!(
            entry_id = %entry.id,
            previous,
            engagement_score = entry.engagement_score,
            "Updated post engagement"
        );
        Ok(entry)
    }

    /// The user's STM entries closest to `text`
    pub async fn similar(
        &self,
        ctx: &RequestContext,
        text: &str,
        n_results: usize,
    ) -> SDKResult<Vec<(StmEntry, f32)>> {
        if n_results == 0 {
            return Ok(Vec::new());
        }
        let embedding = self.backends.embed(text).await?;
        let hits = self.backends.store.query(
            SHORT_TERM,
            &embedding,
            Some(&ctx.owner_filter()),
            n_results,
        )?;
        Ok(hits
            .into_iter()
            .map(|hit| {
                let similarity = hit.similarity();
                let entry = StmEntry::from_stored(hit.id, hit.document, &hit.metadata);
                (entry, similarity)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::snapshot::SnapshotBuilder;
    use crate::testing::{in_memory_backends, ScriptedGenerator};
    use std::sync::Arc;

    const ANALYSIS: &str = r#"{"topic": "Hiring", "tone": "Candid", "belief": "Teams first",
        "style_elements": ["Short lines"], "post_type": "Story", "hooks": ["Confession"],
        "structure": "Story-Lesson", "cta_type": "Question", "voice_characteristics": ["Warm"],
        "engagement_factors": ["Vulnerable"], "success_elements": ["Specific numbers"]}"#;

    fn buffer(backends: &Backends) -> MemoryBuffer {
        let config = MemoryConfig::default();
        let snapshots = SnapshotBuilder::new(backends.clone(), config.clone());
        let compression = CompressionEngine::new(backends.clone(), config.clone(), snapshots);
        MemoryBuffer::new(backends.clone(), config, compression)
    }

    #[test]
    fn test_insights_trend() {
        assert!(compute_insights(&[], 0.6).is_none());

        let few = compute_insights(&[0.1, 0.9, 0.9], 0.6).unwrap();
        assert_eq!(few.trend, InsightTrend::Stable);
        assert_eq!(few.high_performers, 2);

        let rising = compute_insights(&[0.2, 0.3, 0.7, 0.8, 0.9], 0.6).unwrap();
        assert_eq!(rising.trend, InsightTrend::Improving);
        assert_eq!(rising.total_posts, 5);
        assert_eq!(rising.peak_engagement, 0.9);
        assert!((rising.avg_engagement - 0.58).abs() < 1e-9);

        let falling = compute_insights(&[0.9, 0.8, 0.2, 0.3, 0.1], 0.6).unwrap();
        assert_eq!(falling.trend, InsightTrend::Stable);
    }

    #[tokio::test]
    async fn test_record_stores_analysis() {
        let generator = Arc::new(ScriptedGenerator::new());
        generator.push_text(ANALYSIS);
        let backends = in_memory_backends(generator.clone()).unwrap();
        let buffer = buffer(&backends);
        let ctx = RequestContext::new("alice").unwrap();

        let post = NewPost::new("We hired our first engineer", "Hiring")
            .with_post_type("Story")
            .with_engagement(EngagementCounts::new(100, 10, 5, 1000));
        let recorded = buffer.record(&ctx, post).await.unwrap();

        // 100 + 30 + 25 + 100 = 255 of 1000
        assert!((recorded.engagement_score - 0.255).abs() < 1e-9);
        assert!(!recorded.used_fallback);
        assert!(matches!(recorded.compression, CompressionStatus::NotTriggered));

        let entries = buffer.entries(&ctx).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, recorded.entry_id);
        assert_eq!(entries[0].analysis.tone, "Candid");
        assert_eq!(entries[0].analysis.hooks, vec!["Confession"]);
        assert_eq!(entries[0].counts.likes, 100);
        assert!(!entries[0].processed);

        let request = &generator.requests()[0];
        assert_eq!(request.temperature, 0.3);
        assert!(request.prompt.contains("We hired our first engineer"));
    }

    #[tokio::test]
    async fn test_record_partial_analysis_fills_required_fields() {
        let generator = Arc::new(ScriptedGenerator::new());
        generator.push_text(r#"Sure! {"belief": "Ship daily"}"#);
        let backends = in_memory_backends(generator).unwrap();
        let buffer = buffer(&backends);
        let ctx = RequestContext::new("alice").unwrap();

        let recorded = buffer
            .record(&ctx, NewPost::new("text", "Shipping"))
            .await
            .unwrap();
        assert!(!recorded.used_fallback);
        assert_eq!(recorded.engagement_score, 0.5);

        let entry = &buffer.entries(&ctx).unwrap()[0];
        assert_eq!(entry.analysis.belief, "Ship daily");
        assert_eq!(entry.analysis.topic, "Shipping");
        assert_eq!(entry.analysis.tone, "Professional");
        assert_eq!(entry.analysis.post_type, "Generated");
        assert!(entry.analysis.hooks.is_empty());
    }

    #[tokio::test]
    async fn test_record_rejects_blank_text() {
        let generator = Arc::new(ScriptedGenerator::new());
        let backends = in_memory_backends(generator.clone()).unwrap();
        let buffer = buffer(&backends);
        let ctx = RequestContext::new("alice").unwrap();

        let err = buffer.record(&ctx, NewPost::new("  ", "t")).await.unwrap_err();
        assert_eq!(err.invalid_field(), Some("post_text"));
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_record_provider_failure_writes_nothing() {
        let generator = Arc::new(ScriptedGenerator::new());
        generator.push_failure("timeout");
        let backends = in_memory_backends(generator).unwrap();
        let buffer = buffer(&backends);
        let ctx = RequestContext::new("alice").unwrap();

        let err = buffer.record(&ctx, NewPost::new("text", "t")).await.unwrap_err();
        assert!(err.is_provider_unavailable());
        assert!(buffer.entries(&ctx).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_compression_failure_keeps_post() {
        let generator = Arc::new(ScriptedGenerator::new());
        for _ in 0..5 {
            generator.push_text("{}");
        }
        generator.push_failure("rate limited");
        let backends = in_memory_backends(generator).unwrap();
        let buffer = buffer(&backends);
        let ctx = RequestContext::new("alice").unwrap();

        for i in 0..4 {
            let recorded = buffer
                .record(&ctx, NewPost::new(format!("post {}", i), "t"))
                .await
                .unwrap();
            assert!(matches!(recorded.compression, CompressionStatus::NotTriggered));
        }
        let fifth = buffer.record(&ctx, NewPost::new("post 4", "t")).await.unwrap();

        match fifth.compression {
            CompressionStatus::Failed { message } => assert!(message.contains("rate limited")),
            other => panic!("expected failed compression, got {:?}", other),
        }
        assert_eq!(buffer.entries(&ctx).unwrap().len(), 5);
        assert_eq!(buffer.compression().unprocessed_count(&ctx).unwrap(), 5);
    }

    #[tokio::test]
    async fn test_update_engagement_rescores() {
        let generator = Arc::new(ScriptedGenerator::new());
        generator.push_text(ANALYSIS);
        let backends = in_memory_backends(generator).unwrap();
        let buffer = buffer(&backends);
        let alice = RequestContext::new("alice").unwrap();

        let recorded = buffer.record(&alice, NewPost::new("text", "t")).await.unwrap();
        let updated = buffer
            .update_engagement(&alice, &recorded.entry_id, EngagementCounts::new(500, 100, 40, 0))
            .await
            .unwrap();
        assert_eq!(updated.engagement_score, 1.0);

        let stored = &buffer.entries(&alice).unwrap()[0];
        assert_eq!(stored.engagement_score, 1.0);
        assert_eq!(stored.counts.comments, 100);
        assert_eq!(stored.analysis.tone, "Candid");
        assert!(!stored.processed);

        let bob = RequestContext::new("bob").unwrap();
        let err = buffer
            .update_engagement(&bob, &recorded.entry_id, EngagementCounts::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_similar_is_scoped_to_user() {
        let generator = Arc::new(ScriptedGenerator::new());
        let backends = in_memory_backends(generator).unwrap();
        let buffer = buffer(&backends);
        let alice = RequestContext::new("alice").unwrap();
        let bob = RequestContext::new("bob").unwrap();

        buffer
            .record(&alice, NewPost::new("remote work changed our hiring", "t"))
            .await
            .unwrap();
        buffer
            .record(&bob, NewPost::new("remote work changed our hiring", "t"))
            .await
            .unwrap();

        let hits = buffer.similar(&alice, "remote work hiring", 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0.user_id, "alice");
        assert!(hits[0].1 > 0.0);
        assert!(buffer.similar(&alice, "anything", 0).await.unwrap().is_empty());
    }
}
