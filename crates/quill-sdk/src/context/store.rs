use super::types::{
    ContextKind, ContextSummary, NewAchievement, NewCompanyInfo, NewPersonalContext,
    RelevantContext, StoreSummary,
};
use crate::backends::Backends;
use crate::memory::collections::{ACHIEVEMENTS, COMPANY_INFO, USER_CONTEXT};
use crate::request::RequestContext;
use crate::utils::{now_utc, require_text, require_unit_interval};
use crate::SDKResult;
use chrono::{DateTime, Utc};
use quill_core::db::{Metadata, MetadataRecord};
use quill_core::types::{Achievement, CompanyInfo, PersonalContext};
use tracing::{debug, info, warn};

const RECENT_TITLES: usize = 3;

fn new_id(prefix: &str, ctx: &RequestContext) -> String {
    format!("{}_{}_{}", prefix, ctx.user_id(), uuid::Uuid::new_v4().simple())
}

/// Personal, company and achievement context for each user
#[derive(Clone)]
pub struct ContextStore {
    backends: Backends,
}

impl ContextStore {
    pub fn new(backends: Backends) -> Self {
        Self { backends }
    }

    async fn insert<T: MetadataRecord>(&self, collection: &str, record: &T) -> SDKResult<()> {
        let embedding = self.backends.embed(record.document()).await?;
        self.backends
            .store
            .add(collection, vec![record.to_new_document(Some(embedding))])?;
        info!(collection, id = record.id(), "Stored context item");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Writes
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn add_personal(
        &self,
        ctx: &RequestContext,
        input: NewPersonalContext,
    ) -> SDKResult<String> {
        require_text("title", &input.title)?;
        require_text("content", &input.content)?;
        require_unit_interval("importance", input.importance)?;

        let item = PersonalContext {
            id: new_id("context", ctx),
            user_id: ctx.user_id().to_string(),
            context_type: input.context_type,
            title: input.title,
            content: input.content,
            tags: input.tags,
            importance: input.importance,
            timestamp: now_utc(),
            usage_count: 0,
        };
        self.insert(USER_CONTEXT, &item).await?;
        Ok(item.id)
    }

    pub async fn add_company(&self, ctx: &RequestContext, input: NewCompanyInfo) -> SDKResult<String> {
        require_text("company_name", &input.company_name)?;
        require_text("title", &input.title)?;
        require_text("content", &input.content)?;
        require_unit_interval("relevance", input.relevance)?;

        let item = CompanyInfo {
            id: new_id("company", ctx),
            user_id: ctx.user_id().to_string(),
            company_name: input.company_name,
            info_type: input.info_type,
            title: input.title,
            content: input.content,
            relevance: input.relevance,
            timestamp: now_utc(),
            usage_count: 0,
        };
        self.insert(COMPANY_INFO, &item).await?;
        Ok(item.id)
    }

    pub async fn add_achievement(
        &self,
        ctx: &RequestContext,
        input: NewAchievement,
    ) -> SDKResult<String> {
        require_text("title", &input.title)?;
        require_text("description", &input.description)?;

        let content = Achievement::compose_document(
            &input.title,
            &input.description,
            &input.impact,
            &input.date,
            &input.skills_used,
        );
        let item = Achievement {
            id: new_id("achievement", ctx),
            user_id: ctx.user_id().to_string(),
            achievement_type: input.achievement_type,
            title: input.title,
            description: input.description,
            impact: input.impact,
            date: input.date,
            skills_used: input.skills_used,
            content,
            timestamp: now_utc(),
            usage_count: 0,
        };
        self.insert(ACHIEVEMENTS, &item).await?;
        Ok(item.id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    async fn query<T: MetadataRecord>(
        &self,
        ctx: &RequestContext,
        collection: &str,
        text: &str,
        max_results: usize,
    ) -> SDKResult<Vec<T>> {
        if max_results == 0 {
            return Ok(Vec::new());
        }
        let embedding = self.backends.embed(text).await?;
        let hits = self.backends.store.query(
            collection,
            &embedding,
            Some(&ctx.owner_filter()),
            max_results,
        )?;
        debug!(collection, hits = hits.len(), "Context query");
        Ok(hits
            .into_iter()
            .map(|hit| T::from_stored(hit.id, hit.document, &hit.metadata))
            .collect())
    }

    pub async fn query_personal(
        &self,
        ctx: &RequestContext,
        text: &str,
        max_results: usize,
    ) -> SDKResult<Vec<PersonalContext>> {
        self.query(ctx, USER_CONTEXT, text, max_results).await
    }

    pub async fn query_company(
        &self,
        ctx: &RequestContext,
        text: &str,
        max_results: usize,
    ) -> SDKResult<Vec<CompanyInfo>> {
        self.query(ctx, COMPANY_INFO, text, max_results).await
    }

    pub async fn query_achievements(
        &self,
        ctx: &RequestContext,
        text: &str,
        max_results: usize,
    ) -> SDKResult<Vec<Achievement>> {
        self.query(ctx, ACHIEVEMENTS, text, max_results).await
    }

    /// Up to `max_results` items from each store, closest to `text` first
    pub async fn relevant_context(
        &self,
        ctx: &RequestContext,
        text: &str,
        max_results: usize,
    ) -> SDKResult<RelevantContext> {
        Ok(RelevantContext {
            user_context: self.query_personal(ctx, text, max_results).await?,
            company_info: self.query_company(ctx, text, max_results).await?,
            achievements: self.query_achievements(ctx, text, max_results).await?,
        })
    }

    /// Increment the usage counter of one item.
    ///
    /// Best effort: a missing item or store failure is logged and reported
    /// as `false`.
    pub fn mark_used(&self, ctx: &RequestContext, kind: ContextKind, id: &str) -> bool {
        match self.try_mark_used(ctx, kind, id) {
            Ok(true) => true,
            Ok(false) => {
                debug!(kind = ?kind, id, "Context item not found, usage not counted");
                false
            }
            Err(e) => {
                warn!(kind = ?kind, id, error = %e, "Failed to count context usage");
                false
            }
        }
    }

    fn try_mark_used(&self, ctx: &RequestContext, kind: ContextKind, id: &str) -> SDKResult<bool> {
        let collection = kind.collection();
        let ids = [id.to_string()];
        let Some(doc) = self
            .backends
            .store
            .get(collection, Some(ids.as_slice()), Some(&ctx.owner_filter()))?
            .into_iter()
            .next()
        else {
            return Ok(false);
        };

        let mut metadata: Metadata = doc.metadata;
        let used = metadata.count("usage_count") + 1;
        metadata.put("usage_count", used);
        let updated = self
            .backends
            .store
            .update_metadata(collection, vec![(doc.id, metadata)])?;
        Ok(updated == 1)
    }

    fn store_summary<T, F>(&self, ctx: &RequestContext, collection: &str, view: F) -> SDKResult<StoreSummary>
    where
        T: MetadataRecord,
        F: Fn(&T) -> (DateTime<Utc>, String),
    {
        let docs = self
            .backends
            .store
            .get(collection, None, Some(&ctx.owner_filter()))?;
        let mut items: Vec<(DateTime<Utc>, String)> = docs
            .into_iter()
            .map(|doc| view(&T::from_document(doc)))
            .collect();
        let count = items.len();
        // Newest insert wins a timestamp tie
        items.reverse();
        items.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(StoreSummary {
            count,
            recent_titles: items
                .into_iter()
                .take(RECENT_TITLES)
                .map(|(_, title)| title)
                .collect(),
        })
    }

    /// Counts and latest titles for each store
    pub fn summary(&self, ctx: &RequestContext) -> SDKResult<ContextSummary> {
        Ok(ContextSummary {
            personal: self.store_summary(ctx, USER_CONTEXT, |c: &PersonalContext| {
                (c.timestamp, c.title.clone())
            })?,
            company: self.store_summary(ctx, COMPANY_INFO, |c: &CompanyInfo| {
                (c.timestamp, c.title.clone())
            })?,
            achievements: self.store_summary(ctx, ACHIEVEMENTS, |a: &Achievement| {
                (a.timestamp, a.title.clone())
            })?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{in_memory_backends, ScriptedGenerator};
    use quill_core::types::{AchievementType, ContextType, InfoType};
    use std::sync::Arc;

    fn store() -> ContextStore {
        let backends = in_memory_backends(Arc::new(ScriptedGenerator::new())).unwrap();
        ContextStore::new(backends)
    }

    #[tokio::test]
    async fn test_add_and_query_personal() {
        let store = store();
        let ctx = RequestContext::new("alice").unwrap();

        let id = store
            .add_personal(
                &ctx,
                NewPersonalContext::new(ContextType::Background, "Career switch", "I moved from teaching into software")
                    .with_tags(vec!["career".into(), "teaching".into()])
                    .with_importance(0.9),
            )
            .await
            .unwrap();
        assert!(id.starts_with("context_alice_"));

        let found = store.query_personal(&ctx, "teaching software", 5).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, id);
        assert_eq!(found[0].tags, vec!["career", "teaching"]);
        assert_eq!(found[0].context_type, ContextType::Background);
        assert_eq!(found[0].importance, 0.9);
    }

    #[tokio::test]
    async fn test_validation_runs_before_write() {
        let store = store();
        let ctx = RequestContext::new("alice").unwrap();

        let err = store
            .add_personal(&ctx, NewPersonalContext::new(ContextType::Personal, " ", "content"))
            .await
            .unwrap_err();
        assert_eq!(err.invalid_field(), Some("title"));

        let err = store
            .add_company(
                &ctx,
                NewCompanyInfo::new("Acme", InfoType::News, "Funding", "Series A").with_relevance(1.5),
            )
            .await
            .unwrap_err();
        assert_eq!(err.invalid_field(), Some("relevance"));

        let err = store
            .add_company(&ctx, NewCompanyInfo::new("", InfoType::News, "Funding", "Series A"))
            .await
            .unwrap_err();
        assert_eq!(err.invalid_field(), Some("company_name"));

        let err = store
            .add_achievement(&ctx, NewAchievement::new(AchievementType::Award, "Award", ""))
            .await
            .unwrap_err();
        assert_eq!(err.invalid_field(), Some("description"));

        assert_eq!(store.summary(&ctx).unwrap(), ContextSummary::default());
    }

    #[tokio::test]
    async fn test_relevant_context_is_per_user() {
        let store = store();
        let alice = RequestContext::new("alice").unwrap();
        let bob = RequestContext::new("bob").unwrap();

        store
            .add_company(&alice, NewCompanyInfo::new("Acme", InfoType::Culture, "Remote first", "We work remotely"))
            .await
            .unwrap();
        store
            .add_achievement(
                &alice,
                NewAchievement::new(AchievementType::Project, "Migration", "Moved billing to Rust")
                    .with_impact("Halved latency")
                    .with_skills(vec!["Rust".into()]),
            )
            .await
            .unwrap();
        store
            .add_personal(&bob, NewPersonalContext::new(ContextType::Values, "Secret", "bob only"))
            .await
            .unwrap();

        let context = store.relevant_context(&alice, "remote rust", 5).await.unwrap();
        assert!(context.user_context.is_empty());
        assert_eq!(context.company_info.len(), 1);
        assert_eq!(context.achievements.len(), 1);
        assert!(context.achievements[0].content.contains("Impact: Halved latency"));
        assert_eq!(context.item_refs().len(), 2);

        let bob_context = store.relevant_context(&bob, "remote rust", 5).await.unwrap();
        assert_eq!(bob_context.user_context.len(), 1);
        assert!(bob_context.company_info.is_empty());
        assert!(bob_context.achievements.is_empty());

        let fresh = RequestContext::new("carol").unwrap();
        assert!(store.relevant_context(&fresh, "anything", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mark_used_increments_counter() {
        let store = store();
        let alice = RequestContext::new("alice").unwrap();
        let bob = RequestContext::new("bob").unwrap();

        let id = store
            .add_personal(&alice, NewPersonalContext::new(ContextType::Personal, "Dog", "I walk my dog daily"))
            .await
            .unwrap();

        assert!(store.mark_used(&alice, ContextKind::Personal, &id));
        assert!(store.mark_used(&alice, ContextKind::Personal, &id));
        assert!(!store.mark_used(&bob, ContextKind::Personal, &id));
        assert!(!store.mark_used(&alice, ContextKind::Company, &id));

        let found = store.query_personal(&alice, "dog", 1).await.unwrap();
        assert_eq!(found[0].usage_count, 2);
        assert_eq!(found[0].title, "Dog");
    }

    #[tokio::test]
    async fn test_summary_lists_recent_titles() {
        let store = store();
        let ctx = RequestContext::new("alice").unwrap();

        for title in ["One", "Two", "Three", "Four"] {
            store
                .add_personal(&ctx, NewPersonalContext::new(ContextType::Personal, title, "content"))
                .await
                .unwrap();
        }

        let summary = store.summary(&ctx).unwrap();
        assert_eq!(summary.personal.count, 4);
        assert_eq!(summary.personal.recent_titles, vec!["Four", "Three", "Two"]);
        assert_eq!(summary.company.count, 0);
    }
}
