//! Index-page collections: featured, recent, trending, per-category and
//! per-exam listings, plus the blog-home aggregate.

use tracing::warn;

use crate::{
    category::CategorySummary,
    config::Limits,
    exam::ExamKey,
    post::Post,
    store::{ContentStore, PostQuery, StoreError},
};

/// Which index collection to assemble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingKind {
    /// Editor-featured posts, newest first.
    Featured,
    /// Newest published posts.
    Recent,
    /// Recent posts ranked by combined views and likes.
    Trending,
    /// Posts in one category, newest first.
    Category(String),
    /// Posts of one exam vertical, newest first.
    Exam(ExamKey),
}

/// Everything the blog home renders, assembled in one pass.
#[derive(Debug, Clone, Default)]
pub struct BlogIndex {
    /// Featured posts, newest first.
    pub featured: Vec<Post>,
    /// Recent posts, newest first.
    pub recent: Vec<Post>,
    /// Top of the recent set by combined popularity.
    pub trending: Vec<Post>,
    /// Active categories with published-post counts.
    pub categories: Vec<CategorySummary>,
    /// Total published posts in the store.
    pub total_posts: u64,
}

/// Assembles read-only collections for index pages.
///
/// There is no cache: every call re-queries the store. Every failure
/// degrades to an empty collection — index pages always render, at worst in
/// an empty state.
#[derive(Debug, Clone)]
pub struct ListingAssembler<S> {
    store: S,
    limits: Limits,
}

impl<S: ContentStore> ListingAssembler<S> {
    /// An assembler over `store` with the default caps.
    pub fn new(store: S) -> Self {
        Self {
            store,
            limits: Limits::default(),
        }
    }

    /// Override the listing caps.
    #[must_use]
    pub const fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Assemble one collection; empty when the store is empty or unreachable.
    pub async fn posts(&self, kind: ListingKind) -> Vec<Post> {
        let result = match kind {
            ListingKind::Featured => {
                self.store
                    .posts(PostQuery::featured(self.limits.featured))
                    .await
            }
            ListingKind::Recent => self.store.posts(PostQuery::recent(self.limits.recent)).await,
            ListingKind::Trending => self.trending().await,
            ListingKind::Category(slug) => {
                self.store
                    .posts(PostQuery::in_category(slug, self.limits.recent))
                    .await
            }
            ListingKind::Exam(exam) => {
                self.store
                    .posts(PostQuery::for_exam(exam, self.limits.recent))
                    .await
            }
        };
        result.unwrap_or_else(|err| {
            warn!(error = %err, "listing query failed, rendering empty");
            Vec::new()
        })
    }

    /// The blog-home aggregate. Each field degrades independently, so a
    /// partially-reachable store still yields a page.
    pub async fn index(&self) -> BlogIndex {
        let featured = self.posts(ListingKind::Featured).await;
        let recent = self.posts(ListingKind::Recent).await;
        let trending = rank_trending(recent.clone(), self.limits.trending);
        let categories = self.store.categories(true).await.unwrap_or_else(|err| {
            warn!(error = %err, "category query failed, rendering empty");
            Vec::new()
        });
        let total_posts = self.store.post_count().await.unwrap_or_else(|err| {
            warn!(error = %err, "post count query failed, rendering zero");
            0
        });

        BlogIndex {
            featured,
            recent,
            trending,
            categories,
            total_posts,
        }
    }

    async fn trending(&self) -> Result<Vec<Post>, StoreError> {
        let recent = self.store.posts(PostQuery::recent(self.limits.recent)).await?;
        Ok(rank_trending(recent, self.limits.trending))
    }
}

/// Sum-based popularity ranking: views plus likes, descending, top `limit`.
/// The sort is stable, so ties keep their recency order.
fn rank_trending(mut posts: Vec<Post>, limit: usize) -> Vec<Post> {
    posts.sort_by_key(|post| std::cmp::Reverse(post.popularity()));
    posts.truncate(limit);
    posts
}

#[cfg(test)]
mod tests {
    use super::{ListingAssembler, ListingKind, rank_trending};
    use crate::{
        config::Limits,
        exam::ExamKey,
        store::MemoryStore,
        testutil::{post_in_category, sample_post},
    };

    fn counted(id: i64, slug: &str, views: u64, likes: u64) -> crate::post::Post {
        let mut post = sample_post(id, slug);
        post.view_count = views;
        post.like_count = likes;
        post
    }

    #[test]
    fn trending_ranks_by_combined_popularity() {
        let posts = vec![
            counted(1, "views-heavy", 10, 1),
            counted(2, "likes-heavy", 5, 20),
            counted(3, "quiet", 1, 1),
        ];
        let ranked = rank_trending(posts, 5);
        let slugs: Vec<_> = ranked.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["likes-heavy", "views-heavy", "quiet"]);
    }

    #[test]
    fn trending_caps_at_the_limit() {
        let posts = (1..=8).map(|id| counted(id, "p-x", id as u64, 0)).collect();
        assert_eq!(rank_trending(posts, 5).len(), 5);
    }

    #[tokio::test]
    async fn trending_listing_takes_top_five_of_recent() {
        let store = MemoryStore::new(
            (1..=7)
                .map(|id| counted(id, &format!("post-{id}"), 0, id as u64))
                .collect(),
        );
        let assembler = ListingAssembler::new(store);
        let trending = assembler.posts(ListingKind::Trending).await;
        let slugs: Vec<_> = trending.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["post-7", "post-6", "post-5", "post-4", "post-3"]);
    }

    #[tokio::test]
    async fn featured_listing_filters_and_orders() {
        let mut a = sample_post(1, "old-featured");
        a.is_featured = true;
        let mut b = sample_post(3, "new-featured");
        b.is_featured = true;
        let store = MemoryStore::new(vec![a, sample_post(2, "ordinary"), b]);

        let assembler = ListingAssembler::new(store);
        let featured = assembler.posts(ListingKind::Featured).await;
        let slugs: Vec<_> = featured.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["new-featured", "old-featured"]);
    }

    #[tokio::test]
    async fn exam_and_category_listings_filter() {
        let mut cat_post = sample_post(1, "cat-tips");
        cat_post.exam_short_code = Some("CAT".into());
        let store = MemoryStore::new(vec![cat_post, post_in_category(2, "verbal-tips", "verbal")]);
        let assembler = ListingAssembler::new(store);

        let for_cat = assembler.posts(ListingKind::Exam(ExamKey::Cat)).await;
        assert_eq!(for_cat.len(), 1);
        assert_eq!(for_cat[0].slug.as_str(), "cat-tips");

        let verbal = assembler
            .posts(ListingKind::Category("verbal".into()))
            .await;
        assert_eq!(verbal.len(), 1);
        assert_eq!(verbal[0].slug.as_str(), "verbal-tips");
    }

    #[tokio::test]
    async fn empty_store_yields_empty_collections() {
        let assembler = ListingAssembler::new(MemoryStore::default());
        assert!(assembler.posts(ListingKind::Featured).await.is_empty());
        assert!(assembler.posts(ListingKind::Trending).await.is_empty());
        let index = assembler.index().await;
        assert!(index.recent.is_empty());
        assert_eq!(index.total_posts, 0);
    }

    #[tokio::test]
    async fn unreachable_store_yields_empty_everything() {
        crate::testutil::init_tracing();
        let store = MemoryStore::new(vec![sample_post(1, "invisible")]);
        store.set_unavailable(true);
        let assembler = ListingAssembler::new(store);

        for kind in [
            ListingKind::Featured,
            ListingKind::Recent,
            ListingKind::Trending,
            ListingKind::Category("quant".into()),
            ListingKind::Exam(ExamKey::Cat),
        ] {
            assert!(assembler.posts(kind).await.is_empty());
        }

        let index = assembler.index().await;
        assert!(index.featured.is_empty());
        assert!(index.recent.is_empty());
        assert!(index.trending.is_empty());
        assert!(index.categories.is_empty());
        assert_eq!(index.total_posts, 0);
    }

    #[tokio::test]
    async fn index_assembles_all_collections() {
        let mut featured = post_in_category(5, "headline", "quant");
        featured.is_featured = true;
        featured.view_count = 40;
        let store = MemoryStore::new(vec![
            featured,
            post_in_category(1, "one", "quant"),
            post_in_category(2, "two", "verbal"),
        ]);
        let assembler =
            ListingAssembler::new(store).with_limits(Limits { recent: 2, ..Limits::default() });

        let index = assembler.index().await;
        assert_eq!(index.featured.len(), 1);
        assert_eq!(index.recent.len(), 2);
        assert_eq!(index.trending[0].slug.as_str(), "headline");
        assert_eq!(index.categories.len(), 2);
        assert_eq!(index.total_posts, 3);
    }
}
