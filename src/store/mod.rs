//! The content-store seam.
//!
//! The remote store is opaque: implementations translate these operations
//! into whatever query dialect they speak. Everything above this module
//! receives its store by value (constructor injection), so tests substitute
//! [`MemoryStore`] for the wire.

pub mod http;
pub mod memory;

use std::fmt;

pub use http::HttpStore;
pub use memory::MemoryStore;

use crate::{
    category::CategorySummary,
    exam::ExamKey,
    post::{Post, PostId},
    slug::PostSlug,
};

/// Errors surfaced by a content store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No row matches the requested key.
    #[error("no post matches the requested slug")]
    NotFound,
    /// The store could not be reached, or answered with something this crate
    /// cannot decode. Listings degrade to empty, single-post fetches to
    /// not-found; nothing retries.
    #[error("content store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Wrap a transport or decoding failure.
    pub fn unavailable(err: impl fmt::Display) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Requested ordering of a listing query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum PostOrder {
    /// Newest first by publish timestamp.
    #[default]
    PublishedDesc,
}

/// A filtered listing query against the published-posts view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQuery {
    /// Keep only posts whose featured flag matches.
    pub featured: Option<bool>,
    /// Keep only posts in this category.
    pub category_slug: Option<String>,
    /// Keep only posts of this exam vertical.
    pub exam: Option<ExamKey>,
    /// Drop this post from the result (the related-posts query).
    pub exclude: Option<PostId>,
    /// Result ordering.
    pub order: PostOrder,
    /// Result cap.
    pub limit: Option<usize>,
}

impl PostQuery {
    /// Newest published posts.
    #[must_use]
    pub fn recent(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Featured posts, newest first.
    #[must_use]
    pub fn featured(limit: usize) -> Self {
        Self {
            featured: Some(true),
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Posts in one category, newest first.
    #[must_use]
    pub fn in_category(slug: impl Into<String>, limit: usize) -> Self {
        Self {
            category_slug: Some(slug.into()),
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Posts of one exam vertical, newest first.
    #[must_use]
    pub fn for_exam(exam: ExamKey, limit: usize) -> Self {
        Self {
            exam: Some(exam),
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Same-category companions of `post`, excluding the post itself.
    /// `None` when the post belongs to no category.
    #[must_use]
    pub fn related_to(post: &Post, limit: usize) -> Option<Self> {
        let category = post.category_slug.clone()?;
        Some(Self {
            category_slug: Some(category),
            exclude: Some(post.id),
            limit: Some(limit),
            ..Self::default()
        })
    }
}

/// A queryable content service holding the blog corpus.
///
/// Methods return `impl Future` so implementations stay object-free and the
/// loader/assembler take the store as a plain type parameter.
pub trait ContentStore: Send + Sync {
    /// Fetch exactly one published post by slug.
    fn post_by_slug(
        &self,
        slug: &PostSlug,
    ) -> impl Future<Output = Result<Post, StoreError>> + Send;

    /// Run a filtered listing query.
    fn posts(&self, query: PostQuery) -> impl Future<Output = Result<Vec<Post>, StoreError>> + Send;

    /// Increment a post's view counter. Atomic on the store side; callers
    /// treat failures as best-effort telemetry loss.
    fn record_view(&self, id: PostId) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Categories with their published-post counts.
    fn categories(
        &self,
        active_only: bool,
    ) -> impl Future<Output = Result<Vec<CategorySummary>, StoreError>> + Send;

    /// Total number of published posts.
    fn post_count(&self) -> impl Future<Output = Result<u64, StoreError>> + Send;
}
