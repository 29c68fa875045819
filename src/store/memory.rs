//! In-process content store over a fixed post set.
//!
//! Mirrors the static data module the site falls back to when no remote
//! store is configured, and doubles as the substitute store the rest of the
//! crate is tested against. Failure switches let tests exercise the degraded
//! paths without a network.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use crate::{
    category::{Category, CategorySummary},
    post::{Post, PostId},
    slug::PostSlug,
};

use super::{ContentStore, PostOrder, PostQuery, StoreError};

/// A content store backed by a post list held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore(Arc<Inner>);

#[derive(Debug, Default)]
struct Inner {
    posts: Vec<Post>,
    views: Mutex<HashMap<PostId, u64>>,
    unavailable: AtomicBool,
    fail_views: AtomicBool,
}

impl MemoryStore {
    /// A store over the given posts. Category aggregates are derived from
    /// the posts themselves.
    #[must_use]
    pub fn new(posts: Vec<Post>) -> Self {
        Self(Arc::new(Inner {
            posts,
            ..Inner::default()
        }))
    }

    /// Make every operation answer [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.0.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make only [`ContentStore::record_view`] fail.
    pub fn fail_views(&self, fail: bool) {
        self.0.fail_views.store(fail, Ordering::SeqCst);
    }

    /// How many views were recorded for a post.
    #[must_use]
    pub fn views_recorded(&self, id: PostId) -> u64 {
        self.0
            .views
            .lock()
            .map(|views| views.get(&id).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.0.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("memory store marked unavailable"));
        }
        Ok(())
    }

    fn select(&self, query: &PostQuery) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .0
            .posts
            .iter()
            .filter(|post| query.featured.is_none_or(|flag| post.is_featured == flag))
            .filter(|post| {
                query
                    .category_slug
                    .as_deref()
                    .is_none_or(|slug| post.category_slug.as_deref() == Some(slug))
            })
            .filter(|post| query.exam.is_none_or(|exam| post.is_for_exam(exam)))
            .filter(|post| query.exclude.is_none_or(|id| post.id != id))
            .cloned()
            .collect();

        match query.order {
            PostOrder::PublishedDesc => {
                posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
            }
        }

        if let Some(limit) = query.limit {
            posts.truncate(limit);
        }
        posts
    }

    fn summarize_categories(&self) -> Vec<CategorySummary> {
        let mut counts: BTreeMap<(String, String), u64> = BTreeMap::new();
        for post in &self.0.posts {
            if let Some(category) = post.category() {
                *counts
                    .entry((category.slug().to_string(), category.name().to_string()))
                    .or_insert(0) += 1;
            }
        }
        counts
            .into_iter()
            .map(|((slug, name), count)| CategorySummary::new(Category::new(slug, name), count))
            .collect()
    }
}

impl ContentStore for MemoryStore {
    fn post_by_slug(
        &self,
        slug: &PostSlug,
    ) -> impl Future<Output = Result<Post, StoreError>> + Send {
        let result = self.check_available().and_then(|()| {
            self.0
                .posts
                .iter()
                .find(|post| post.slug == *slug)
                .cloned()
                .ok_or(StoreError::NotFound)
        });
        async move { result }
    }

    fn posts(&self, query: PostQuery) -> impl Future<Output = Result<Vec<Post>, StoreError>> + Send {
        let result = self.check_available().map(|()| self.select(&query));
        async move { result }
    }

    fn record_view(&self, id: PostId) -> impl Future<Output = Result<(), StoreError>> + Send {
        let result = self.check_available().and_then(|()| {
            if self.0.fail_views.load(Ordering::SeqCst) {
                return Err(StoreError::unavailable("view counter rpc failed"));
            }
            if let Ok(mut views) = self.0.views.lock() {
                *views.entry(id).or_insert(0) += 1;
            }
            Ok(())
        });
        async move { result }
    }

    fn categories(
        &self,
        _active_only: bool,
    ) -> impl Future<Output = Result<Vec<CategorySummary>, StoreError>> + Send {
        let result = self.check_available().map(|()| self.summarize_categories());
        async move { result }
    }

    fn post_count(&self) -> impl Future<Output = Result<u64, StoreError>> + Send {
        let result = self
            .check_available()
            .map(|()| self.0.posts.len() as u64);
        async move { result }
    }
}
