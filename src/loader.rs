//! Loading one post view: fetch by slug, best-effort view telemetry, related
//! posts, and the derived outline.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use futures::join;
use tracing::warn;

use crate::{
    config::Limits,
    post::Post,
    render::{self, OutlineEntry},
    slug::PostSlug,
    store::{ContentStore, PostQuery, StoreError},
};

/// Cooperative cancellation flag for an in-flight load.
///
/// Clone the token into whatever owns the view; cancelling makes the load
/// bail between steps, so a superseded or abandoned view never observes the
/// result (and fires no further side effects).
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Abandon the load this token was passed to.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Why a post view could not be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// No such post — or the store could not be reached, which the page
    /// treats identically: render the terminal not-found page, no retry.
    #[error("post not found")]
    NotFound,
    /// The view was abandoned before the load finished.
    #[error("load cancelled")]
    Cancelled,
}

/// A fully prepared post view.
#[derive(Debug, Clone)]
pub struct LoadedPost {
    /// The canonical post record for this view.
    pub post: Post,
    /// Same-category posts, never including the post itself.
    pub related: Vec<Post>,
    /// Outline derived from the body markup.
    pub outline: Vec<OutlineEntry>,
    /// Anchor-annotated body markup ready for display.
    pub body: String,
}

/// Fetches post views from a content store.
#[derive(Debug, Clone)]
pub struct PostLoader<S> {
    store: S,
    related_limit: usize,
}

impl<S: ContentStore> PostLoader<S> {
    /// A loader over `store` with the default related-posts cap.
    pub fn new(store: S) -> Self {
        Self {
            store,
            related_limit: Limits::default().related,
        }
    }

    /// Override the related-posts cap.
    #[must_use]
    pub const fn with_related_limit(mut self, limit: usize) -> Self {
        self.related_limit = limit;
        self
    }

    /// Load the post for `slug`, its related posts, and its outline.
    ///
    /// The view-count increment fires concurrently with the related-posts
    /// query once the post is in hand; both are best-effort. An increment
    /// failure is logged and swallowed, a related failure degrades to an
    /// empty list. Neither ever fails the view.
    pub async fn load(&self, slug: &PostSlug, cancel: &CancelToken) -> Result<LoadedPost, LoadError> {
        if cancel.is_cancelled() {
            return Err(LoadError::Cancelled);
        }

        let post = match self.store.post_by_slug(slug).await {
            Ok(post) => post,
            Err(StoreError::NotFound) => return Err(LoadError::NotFound),
            Err(StoreError::Unavailable(reason)) => {
                warn!(slug = %slug, %reason, "content store unreachable, rendering not-found");
                return Err(LoadError::NotFound);
            }
        };

        if cancel.is_cancelled() {
            return Err(LoadError::Cancelled);
        }

        let related_query = PostQuery::related_to(&post, self.related_limit);
        let (viewed, related) = join!(self.store.record_view(post.id), async {
            match related_query {
                Some(query) => self.store.posts(query).await,
                None => Ok(Vec::new()),
            }
        });

        if let Err(err) = viewed {
            warn!(post = %post.id, error = %err, "failed to record view");
        }
        let mut related = related.unwrap_or_else(|err| {
            warn!(post = %post.id, error = %err, "failed to fetch related posts");
            Vec::new()
        });
        related.retain(|candidate| candidate.id != post.id);
        related.truncate(self.related_limit);

        if cancel.is_cancelled() {
            return Err(LoadError::Cancelled);
        }

        let rendered = render::render(&post.content);
        Ok(LoadedPost {
            related,
            outline: rendered.outline,
            body: rendered.body,
            post,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{CancelToken, LoadError, PostLoader};
    use crate::{
        post::PostId,
        store::MemoryStore,
        testutil::{post_in_category, sample_post},
    };

    fn quant_corpus() -> MemoryStore {
        let mut main = post_in_category(1, "main-post", "quant");
        main.content = "<h1>Intro</h1><h2>Details</h2>".to_string();
        MemoryStore::new(vec![
            main,
            post_in_category(2, "sibling-a", "quant"),
            post_in_category(3, "sibling-b", "quant"),
            post_in_category(4, "sibling-c", "quant"),
            post_in_category(5, "sibling-d", "quant"),
            post_in_category(6, "other-topic", "verbal"),
        ])
    }

    #[tokio::test]
    async fn loads_the_post_matching_the_slug() {
        let loader = PostLoader::new(quant_corpus());
        let loaded = loader
            .load(&"main-post".parse().unwrap(), &CancelToken::new())
            .await
            .unwrap();
        assert_eq!(loaded.post.slug.as_str(), "main-post");
        assert_eq!(loaded.outline.len(), 2);
        assert!(loaded.body.contains("id=\"heading-0\""));
    }

    #[tokio::test]
    async fn related_posts_share_the_category_and_exclude_self() {
        let loader = PostLoader::new(quant_corpus());
        let loaded = loader
            .load(&"main-post".parse().unwrap(), &CancelToken::new())
            .await
            .unwrap();
        assert!(loaded.related.len() <= 3);
        assert!(!loaded.related.is_empty());
        for related in &loaded.related {
            assert_ne!(related.id, loaded.post.id);
            assert_eq!(related.category_slug.as_deref(), Some("quant"));
        }
    }

    #[tokio::test]
    async fn missing_slug_is_not_found() {
        let loader = PostLoader::new(quant_corpus());
        let result = loader
            .load(&"no-such-post".parse().unwrap(), &CancelToken::new())
            .await;
        assert_eq!(result.unwrap_err(), LoadError::NotFound);
    }

    #[tokio::test]
    async fn unreachable_store_folds_into_not_found() {
        crate::testutil::init_tracing();
        let store = quant_corpus();
        store.set_unavailable(true);
        let loader = PostLoader::new(store);
        let result = loader
            .load(&"main-post".parse().unwrap(), &CancelToken::new())
            .await;
        assert_eq!(result.unwrap_err(), LoadError::NotFound);
    }

    #[tokio::test]
    async fn successful_load_records_exactly_one_view() {
        let store = quant_corpus();
        let loader = PostLoader::new(store.clone());
        loader
            .load(&"main-post".parse().unwrap(), &CancelToken::new())
            .await
            .unwrap();
        assert_eq!(store.views_recorded(PostId(1)), 1);
    }

    #[tokio::test]
    async fn view_counter_failure_never_fails_the_view() {
        let store = quant_corpus();
        store.fail_views(true);
        let loader = PostLoader::new(store);
        let loaded = loader
            .load(&"main-post".parse().unwrap(), &CancelToken::new())
            .await
            .unwrap();
        assert_eq!(loaded.post.slug.as_str(), "main-post");
    }

    #[tokio::test]
    async fn uncategorized_posts_load_with_no_related() {
        let loader = PostLoader::new(MemoryStore::new(vec![sample_post(9, "lone-post")]));
        let loaded = loader
            .load(&"lone-post".parse().unwrap(), &CancelToken::new())
            .await
            .unwrap();
        assert!(loaded.related.is_empty());
    }

    #[tokio::test]
    async fn cancelled_load_fires_no_side_effects() {
        let store = quant_corpus();
        let loader = PostLoader::new(store.clone());
        let token = CancelToken::new();
        token.cancel();
        let result = loader.load(&"main-post".parse().unwrap(), &token).await;
        assert_eq!(result.unwrap_err(), LoadError::Cancelled);
        assert_eq!(store.views_recorded(PostId(1)), 0);
    }
}
