//! Shared library of reference posts by followed creators.
//!
//! Reference posts are not owned by a user; searches are restricted to the
//! creators the user selected instead.

use super::types::SimilarPost;
use crate::backends::Backends;
use crate::memory::collections::REFERENCE_POSTS;
use crate::utils::require_text;
use crate::SDKResult;
use quill_core::db::{MetadataRecord, Where};
use quill_core::types::ReferencePost;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Candidates fetched per requested result before creator filtering
const CANDIDATE_FACTOR: usize = 3;

#[derive(Clone)]
pub struct ReferenceLibrary {
    backends: Backends,
}

impl ReferenceLibrary {
    pub fn new(backends: Backends) -> Self {
        Self { backends }
    }

    /// Store one post, replacing any post with the same id.
    ///
    /// Posts without an id get a generated one. Returns the id.
    pub async fn add(&self, post: ReferencePost) -> SDKResult<String> {
        let mut ids = self.add_many(vec![post]).await?;
        Ok(ids.remove(0))
    }

    /// Store a batch of posts with one embedding call
    pub async fn add_many(&self, posts: Vec<ReferencePost>) -> SDKResult<Vec<String>> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }
        let mut posts = posts;
        for post in &mut posts {
            require_text("profile_name", &post.profile_name)?;
            require_text("post_text", &post.post_text)?;
            if post.id.trim().is_empty() {
                post.id = format!("post_{}", uuid::Uuid::new_v4().simple());
            }
        }

        let texts: Vec<String> = posts.iter().map(|p| p.post_text.clone()).collect();
        let embeddings = self.backends.embedder.encode(&texts).await?;
        let documents = posts
            .iter()
            .zip(embeddings)
            .map(|(post, embedding)| post.to_new_document(Some(embedding)))
            .collect();
        self.backends.store.upsert(REFERENCE_POSTS, documents)?;

        info!(count = posts.len(), "Stored reference posts");
        Ok(posts.into_iter().map(|p| p.id).collect())
    }

    /// The `top_k` posts by the named creators closest to `query`.
    ///
    /// An empty creator list yields no results.
    pub async fn similar(
        &self,
        query: &str,
        creators: &[String],
        top_k: usize,
    ) -> SDKResult<Vec<SimilarPost>> {
        if creators.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }
        let embedding = self.backends.embed(query).await?;
        let filter = Where::is_in("profile_name", creators.iter().map(String::as_str));
        let hits = self.backends.store.query(
            REFERENCE_POSTS,
            &embedding,
            Some(&filter),
            top_k.saturating_mul(CANDIDATE_FACTOR),
        )?;
        debug!(candidates = hits.len(), top_k, "Reference post search");

        let mut posts: Vec<SimilarPost> = hits
            .into_iter()
            .map(|hit| {
                let similarity_score = hit.similarity();
                SimilarPost {
                    post: ReferencePost::from_stored(hit.id, hit.document, &hit.metadata),
                    similarity_score,
                }
            })
            .filter(|p| creators.contains(&p.post.profile_name))
            .collect();
        posts.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));
        posts.truncate(top_k);
        Ok(posts)
    }

    /// Every stored post by the named creators, in insertion order
    pub fn posts_by(&self, creators: &[String]) -> SDKResult<Vec<ReferencePost>> {
        if creators.is_empty() {
            return Ok(Vec::new());
        }
        let filter = Where::is_in("profile_name", creators.iter().map(String::as_str));
        let docs = self.backends.store.get(REFERENCE_POSTS, None, Some(&filter))?;
        Ok(docs.into_iter().map(ReferencePost::from_document).collect())
    }

    /// Distinct creator names in the library
    pub fn creators(&self) -> SDKResult<BTreeSet<String>> {
        let docs = self.backends.store.get(REFERENCE_POSTS, None, None)?;
        Ok(docs
            .iter()
            .filter_map(|d| d.metadata.str("profile_name"))
            .map(str::to_string)
            .collect())
    }

    pub fn count(&self) -> SDKResult<usize> {
        Ok(self.backends.store.count(REFERENCE_POSTS, None)?)
    }
}
