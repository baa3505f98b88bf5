use super::prompt::{build_generation_prompt, PromptInputs};
use super::types::{GeneratedPost, GenerationRequest, SelfExample};
use crate::backends::Backends;
use crate::config::GenerationConfig;
use crate::context::ContextStore;
use crate::memory::{MemoryBuffer, NewPost, SnapshotBuilder};
use crate::request::RequestContext;
use crate::utils::{require_text, truncate_chars};
use crate::SDKResult;
use quill_core::CompletionRequest;
use tracing::{debug, error, info, warn, Instrument};

/// Post type stored for generated content
pub const GENERATED_POST_TYPE: &str = "Generated";

/// Builds the generation prompt from memory and context, calls the
/// provider once, and feeds the result back into memory
#[derive(Clone)]
pub struct ContentGenerator {
    backends: Backends,
    config: GenerationConfig,
    buffer: MemoryBuffer,
    snapshots: SnapshotBuilder,
    context: ContextStore,
}

impl ContentGenerator {
    pub fn new(
        backends: Backends,
        config: GenerationConfig,
        buffer: MemoryBuffer,
        snapshots: SnapshotBuilder,
        context: ContextStore,
    ) -> Self {
        Self {
            backends,
            config,
            buffer,
            snapshots,
            context,
        }
    }

    /// The user's best-performing posts close to `query`
    pub async fn self_examples(&self, ctx: &RequestContext, query: &str) -> SDKResult<Vec<SelfExample>> {
        let mut hits = self
            .buffer
            .similar(ctx, query, self.config.self_example_candidates)
            .await?;
        hits.sort_by(|a, b| b.0.engagement_score.total_cmp(&a.0.engagement_score));
        Ok(hits
            .into_iter()
            .take(self.config.self_examples)
            .map(|(entry, _)| SelfExample {
                excerpt: truncate_chars(&entry.document, self.config.self_example_chars).to_string(),
                engagement_score: entry.engagement_score,
            })
            .collect())
    }

    /// Generate a post for `request.query` in the user's evolved voice.
    ///
    /// A provider failure on the generation call is returned as an error.
    /// Once text is generated it is always returned; a failure while
    /// storing it is logged and leaves `recorded` empty.
    pub async fn generate(
        &self,
        ctx: &RequestContext,
        request: GenerationRequest,
    ) -> SDKResult<GeneratedPost> {
        self.generate_inner(ctx, request)
            .instrument(ctx.span("generate"))
            .await
    }

    async fn generate_inner(
        &self,
        ctx: &RequestContext,
        request: GenerationRequest,
    ) -> SDKResult<GeneratedPost> {
        require_text("query", &request.query)?;

        let persona = self.snapshots.current(ctx)?;
        let insights = self.buffer.insights(ctx)?;
        let context = self
            .context
            .relevant_context(ctx, &request.query, self.config.context_results)
            .await?;
        let self_examples = self.self_examples(ctx, &request.query).await?;

        let prompt = build_generation_prompt(
            &PromptInputs {
                query: &request.query,
                profile: &request.profile,
                persona: persona.as_ref(),
                insights: insights.as_ref(),
                context: &context,
                self_examples: &self_examples,
                reference_posts: &request.reference_posts,
            },
            &self.config,
        );
        debug!(
            prompt_chars = prompt.len(),
            has_persona = persona.is_some(),
            context_items = context.item_refs().len(),
            self_examples = self_examples.len(),
            reference_posts = request.reference_posts.len(),
            "Built generation prompt"
        );

        let text = match self
            .backends
            .complete(
                CompletionRequest::new(prompt, self.config.temperature)
                    .with_max_tokens(self.config.max_tokens),
            )
            .await
        {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "Generation call failed");
                return Err(e);
            }
        };

        let recorded = match self
            .buffer
            .record(
                ctx,
                NewPost::new(text.clone(), request.query.clone()).with_post_type(GENERATED_POST_TYPE),
            )
            .await
        {
            Ok(recorded) => Some(recorded),
            Err(e) => {
                warn!(error = %e, "Generated post could not be stored in memory");
                None
            }
        };

        let refs = context.item_refs();
        for (kind, id) in &refs {
            self.context.mark_used(ctx, *kind, id);
        }

        info!(
            chars = text.chars().count(),
            recorded = recorded.is_some(),
            "Generated post"
        );
        Ok(GeneratedPost {
            text,
            persona,
            insights,
            recorded,
            context_items_used: refs.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryConfig;
    use crate::context::{ContextKind, NewPersonalContext};
    use crate::memory::CompressionEngine;
    use crate::testing::{in_memory_backends, ScriptedGenerator};
    use quill_core::types::{ContextType, EngagementCounts};
    use std::sync::Arc;

    fn generator(backends: &Backends) -> ContentGenerator {
        let memory = MemoryConfig::default();
        let snapshots = SnapshotBuilder::new(backends.clone(), memory.clone());
        let compression = CompressionEngine::new(backends.clone(), memory.clone(), snapshots.clone());
        let buffer = MemoryBuffer::new(backends.clone(), memory, compression);
        let context = ContextStore::new(backends.clone());
        ContentGenerator::new(
            backends.clone(),
            GenerationConfig::default(),
            buffer,
            snapshots,
            context,
        )
    }

    fn request(query: &str) -> GenerationRequest {
        GenerationRequest::new(query, Default::default())
    }

    #[tokio::test]
    async fn test_generate_records_output() {
        let scripted = Arc::new(ScriptedGenerator::new());
        scripted.push_text("Remote hiring taught me patience. #hiring #remote #startups");
        scripted.push_text(r#"{"tone": "Reflective"}"#);
        let backends = in_memory_backends(scripted.clone()).unwrap();
        let content = generator(&backends);
        let ctx = RequestContext::new("alice").unwrap();

        let post = content.generate(&ctx, request("remote hiring")).await.unwrap();

        assert!(post.text.starts_with("Remote hiring"));
        assert!(post.persona.is_none());
        assert!(post.insights.is_none());
        let recorded = post.recorded.unwrap();
        assert_eq!(recorded.engagement_score, 0.5);

        let requests = scripted.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].temperature, 0.7);
        assert_eq!(requests[0].max_tokens, Some(1000));
        assert!(requests[0].prompt.contains("--- No reference posts available ---"));

        let entries = content.buffer.entries(&ctx).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].analysis.post_type, "Generated");
        assert_eq!(entries[0].analysis.topic, "remote hiring");
        assert_eq!(entries[0].analysis.tone, "Reflective");
    }

    #[tokio::test]
    async fn test_generation_failure_records_nothing() {
        let scripted = Arc::new(ScriptedGenerator::new());
        scripted.push_failure("503");
        let backends = in_memory_backends(scripted).unwrap();
        let content = generator(&backends);
        let ctx = RequestContext::new("alice").unwrap();

        let err = content.generate(&ctx, request("topic")).await.unwrap_err();
        assert!(err.is_provider_unavailable());
        assert!(content.buffer.entries(&ctx).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_failure_still_returns_text() {
        let scripted = Arc::new(ScriptedGenerator::new());
        scripted.push_text("A post").push_failure("analysis down");
        let backends = in_memory_backends(scripted).unwrap();
        let content = generator(&backends);
        let ctx = RequestContext::new("alice").unwrap();

        let post = content.generate(&ctx, request("topic")).await.unwrap();
        assert_eq!(post.text, "A post");
        assert!(post.recorded.is_none());
    }

    #[tokio::test]
    async fn test_self_examples_ranked_by_engagement() {
        let scripted = Arc::new(ScriptedGenerator::new());
        let backends = in_memory_backends(scripted).unwrap();
        let content = generator(&backends);
        let ctx = RequestContext::new("alice").unwrap();

        for likes in [100, 900, 300, 700] {
            content
                .buffer
                .record(
                    &ctx,
                    NewPost::new(format!("Hiring lessons, take {likes}"), "hiring")
                        .with_engagement(EngagementCounts::new(likes, 0, 0, 0)),
                )
                .await
                .unwrap();
        }

        let examples = content.self_examples(&ctx, "hiring lessons").await.unwrap();
        let scores: Vec<f64> = examples.iter().map(|e| e.engagement_score).collect();
        assert_eq!(scores.len(), 3);
        for (score, expected) in scores.iter().zip([0.9, 0.7, 0.3]) {
            assert!((score - expected).abs() < 1e-9, "{scores:?}");
        }
        assert_eq!(examples[0].excerpt, "Hiring lessons, take 900");
    }

    #[tokio::test]
    async fn test_prompt_uses_context_and_self_examples() {
        let scripted = Arc::new(ScriptedGenerator::new());
        let backends = in_memory_backends(scripted.clone()).unwrap();
        let content = generator(&backends);
        let ctx = RequestContext::new("alice").unwrap();

        let id = content
            .context
            .add_personal(
                &ctx,
                NewPersonalContext::new(ContextType::Experience, "Bootcamp", "I mentor bootcamp grads"),
            )
            .await
            .unwrap();
        content
            .buffer
            .record(&ctx, NewPost::new("x".repeat(400), "mentoring"))
            .await
            .unwrap();

        scripted.push_text("Mentoring post");
        let post = content.generate(&ctx, request("mentoring bootcamp grads")).await.unwrap();
        assert_eq!(post.context_items_used, 1);
        assert!(post.insights.is_some());

        let prompt = &scripted.requests()[1].prompt;
        assert!(prompt.contains("- Bootcamp: I mentor bootcamp grads"));
        assert!(prompt.contains(&format!("- {}... (Engagement: 0.50)", "x".repeat(200))));
        assert!(!prompt.contains(&"x".repeat(201)));

        let used = content.context.query_personal(&ctx, "bootcamp", 1).await.unwrap();
        assert_eq!(used[0].id, id);
        assert_eq!(used[0].usage_count, 1);
        assert!(content.context.mark_used(&ctx, ContextKind::Personal, &id));
    }
}
