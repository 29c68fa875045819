//! PostgREST-dialect HTTP implementation of [`ContentStore`].
//!
//! Speaks the hosted store's REST surface: filtered selects against the
//! `published_blogs` view, the `increment_blog_view_count` procedure, and an
//! exact-count probe for the index-page total. Every transport or decoding
//! failure folds into [`StoreError::Unavailable`]; only an empty single-row
//! select becomes [`StoreError::NotFound`].

use std::fmt;

use reqwest::header;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::{
    category::{Category, CategorySummary},
    config::SiteConfig,
    post::{Post, PostId},
    slug::PostSlug,
};

use super::{ContentStore, PostOrder, PostQuery, StoreError};

const POSTS_VIEW: &str = "published_blogs";
const CATEGORIES_TABLE: &str = "blog_categories";
const INCREMENT_RPC: &str = "rpc/increment_blog_view_count";

/// A content store reached over HTTP. Cheap to clone; the underlying client
/// pools connections.
#[derive(Clone)]
pub struct HttpStore {
    client: reqwest::Client,
    base: Url,
    key: String,
}

impl fmt::Debug for HttpStore {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("HttpStore")
            .field("base", &self.base.as_str())
            .field("key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl HttpStore {
    /// A store client for the service at `base`, authenticating with `key`.
    pub fn new(base: Url, key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base,
            key: key.into(),
        }
    }

    /// A store client for the configured deployment.
    #[must_use]
    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(config.store_url().clone(), config.store_key())
    }

    fn endpoint(&self, path: &str) -> Result<Url, StoreError> {
        self.base
            .join(&format!("rest/v1/{path}"))
            .map_err(StoreError::unavailable)
    }

    fn listing_url(&self, query: &PostQuery) -> Result<Url, StoreError> {
        let mut url = self.endpoint(POSTS_VIEW)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", "*");
            if let Some(flag) = query.featured {
                pairs.append_pair("is_featured", &format!("eq.{flag}"));
            }
            if let Some(slug) = &query.category_slug {
                pairs.append_pair("category_slug", &format!("eq.{slug}"));
            }
            if let Some(exam) = query.exam {
                // Short codes differ from the key only in case.
                pairs.append_pair("exam_short_code", &format!("ilike.{exam}"));
            }
            if let Some(id) = query.exclude {
                pairs.append_pair("id", &format!("neq.{id}"));
            }
            match query.order {
                PostOrder::PublishedDesc => pairs.append_pair("order", "published_at.desc"),
            };
            if let Some(limit) = query.limit {
                pairs.append_pair("limit", &limit.to_string());
            }
        }
        Ok(url)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.key)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.key))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, StoreError> {
        debug!(url = %url, "querying content store");
        let response = self
            .authorized(self.client.get(url))
            .send()
            .await
            .map_err(StoreError::unavailable)?;
        if !response.status().is_success() {
            return Err(StoreError::Unavailable(format!(
                "store answered {}",
                response.status()
            )));
        }
        response.json::<T>().await.map_err(StoreError::unavailable)
    }

    async fn fetch_post(&self, slug: &PostSlug) -> Result<Post, StoreError> {
        let mut url = self.endpoint(POSTS_VIEW)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", "*");
            pairs.append_pair("slug", &format!("eq.{slug}"));
            pairs.append_pair("limit", "1");
        }
        let rows: Vec<Post> = self.get_json(url).await?;
        rows.into_iter().next().ok_or(StoreError::NotFound)
    }

    async fn call_increment(&self, id: PostId) -> Result<(), StoreError> {
        let url = self.endpoint(INCREMENT_RPC)?;
        let response = self
            .authorized(self.client.post(url))
            .json(&serde_json::json!({ "blog_id_param": id.0 }))
            .send()
            .await
            .map_err(StoreError::unavailable)?;
        if !response.status().is_success() {
            return Err(StoreError::Unavailable(format!(
                "view counter rpc answered {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn fetch_categories(&self, active_only: bool) -> Result<Vec<CategorySummary>, StoreError> {
        let mut url = self.endpoint(CATEGORIES_TABLE)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", "slug,name,blogs(id)");
            if active_only {
                pairs.append_pair("is_active", "eq.true");
            }
        }
        let rows: Vec<CategoryRow> = self.get_json(url).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let count = row.blogs.len() as u64;
                CategorySummary::new(Category::new(row.slug, row.name), count)
            })
            .collect())
    }

    async fn fetch_count(&self) -> Result<u64, StoreError> {
        let mut url = self.endpoint(POSTS_VIEW)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", "id");
            pairs.append_pair("limit", "1");
        }
        let response = self
            .authorized(self.client.get(url))
            .header("Prefer", "count=exact")
            .send()
            .await
            .map_err(StoreError::unavailable)?;
        if !response.status().is_success() {
            return Err(StoreError::Unavailable(format!(
                "store answered {}",
                response.status()
            )));
        }
        let range = response
            .headers()
            .get(header::CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| StoreError::unavailable("store did not report a row count"))?;
        parse_total(range)
            .ok_or_else(|| StoreError::unavailable(format!("unparsable row count: {range}")))
    }
}

/// The embedded-rows shape of a category select; the join is fetched only to
/// be counted.
#[derive(Debug, Deserialize)]
struct CategoryRow {
    slug: String,
    name: String,
    #[serde(default)]
    blogs: Vec<serde_json::Value>,
}

/// Total after the slash of a `Content-Range` header, e.g. `0-0/57` or `*/0`.
fn parse_total(content_range: &str) -> Option<u64> {
    content_range.rsplit('/').next()?.trim().parse().ok()
}

impl ContentStore for HttpStore {
    fn post_by_slug(
        &self,
        slug: &PostSlug,
    ) -> impl Future<Output = Result<Post, StoreError>> + Send {
        let slug = slug.clone();
        async move { self.fetch_post(&slug).await }
    }

    fn posts(&self, query: PostQuery) -> impl Future<Output = Result<Vec<Post>, StoreError>> + Send {
        async move {
            let url = self.listing_url(&query)?;
            self.get_json(url).await
        }
    }

    fn record_view(&self, id: PostId) -> impl Future<Output = Result<(), StoreError>> + Send {
        async move { self.call_increment(id).await }
    }

    fn categories(
        &self,
        active_only: bool,
    ) -> impl Future<Output = Result<Vec<CategorySummary>, StoreError>> + Send {
        async move { self.fetch_categories(active_only).await }
    }

    fn post_count(&self) -> impl Future<Output = Result<u64, StoreError>> + Send {
        async move { self.fetch_count().await }
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::{HttpStore, parse_total};
    use crate::{
        exam::ExamKey,
        post::PostId,
        store::PostQuery,
    };

    fn store() -> HttpStore {
        HttpStore::new(Url::parse("https://abc.supabase.co/").unwrap(), "anon-key")
    }

    #[test]
    fn listing_url_carries_every_filter() {
        let query = PostQuery {
            featured: Some(true),
            category_slug: Some("quant".into()),
            exam: Some(ExamKey::Cat),
            exclude: Some(PostId(9)),
            limit: Some(6),
            ..PostQuery::default()
        };
        let url = store().listing_url(&query).unwrap();
        assert_eq!(
            url.as_str(),
            "https://abc.supabase.co/rest/v1/published_blogs\
             ?select=*&is_featured=eq.true&category_slug=eq.quant\
             &exam_short_code=ilike.cat&id=neq.9\
             &order=published_at.desc&limit=6"
        );
    }

    #[test]
    fn recent_listing_orders_and_caps_only() {
        let url = store().listing_url(&PostQuery::recent(12)).unwrap();
        assert_eq!(
            url.as_str(),
            "https://abc.supabase.co/rest/v1/published_blogs\
             ?select=*&order=published_at.desc&limit=12"
        );
    }

    #[test]
    fn rpc_endpoint_sits_under_rest_v1() {
        let url = store().endpoint(super::INCREMENT_RPC).unwrap();
        assert_eq!(
            url.as_str(),
            "https://abc.supabase.co/rest/v1/rpc/increment_blog_view_count"
        );
    }

    #[test]
    fn content_range_totals_parse() {
        assert_eq!(parse_total("0-0/57"), Some(57));
        assert_eq!(parse_total("*/0"), Some(0));
        assert_eq!(parse_total("garbage"), None);
    }

    #[test]
    fn debug_redacts_the_key() {
        let rendered = format!("{:?}", store());
        assert!(!rendered.contains("anon-key"));
    }
}
