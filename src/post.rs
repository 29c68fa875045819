//! Post records as served by the content store's published view.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;
use url::Url;

use crate::{category::Category, exam::ExamKey, slug::PostSlug};

/// Identifier of a post row in the content store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostId(pub i64);

impl fmt::Display for PostId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(formatter)
    }
}

/// Editorial difficulty classification of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// One published article, mirroring the store's `published_blogs` row.
///
/// The view denormalizes the category and exam joins into flat nullable
/// columns; [`Post::category`] and [`Post::exam`] reassemble them. The view
/// and like counters are non-negative and only grow on the store side — the
/// engagement layer keeps its own cosmetic copy of the like count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Store row id.
    pub id: PostId,
    /// Unique URL-safe key.
    pub slug: PostSlug,
    /// Display title.
    pub title: String,
    /// Short teaser shown on cards and under the title.
    #[serde(default, deserialize_with = "null_as_default")]
    pub excerpt: String,
    /// Body markup, rendered as-is by the page after annotation.
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    /// Cover image, when the editor set one.
    #[serde(default)]
    pub featured_image_url: Option<Url>,
    /// Estimated reading time in minutes, computed store-side.
    #[serde(default, deserialize_with = "null_as_default")]
    pub reading_time: u32,
    /// Publish timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub published_at: OffsetDateTime,
    /// Editor-curated highlight flag.
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_featured: bool,
    /// Difficulty classification, when rated.
    #[serde(default)]
    pub difficulty_level: Option<Difficulty>,
    /// Lifetime view counter.
    #[serde(default, deserialize_with = "null_as_default")]
    pub view_count: u64,
    /// Lifetime like counter.
    #[serde(default, deserialize_with = "null_as_default")]
    pub like_count: u64,
    /// SEO title override.
    #[serde(default)]
    pub meta_title: Option<String>,
    /// SEO description override.
    #[serde(default)]
    pub meta_description: Option<String>,
    /// Display name of the associated exam, if any.
    #[serde(default)]
    pub exam_name: Option<String>,
    /// Short code of the associated exam, if any.
    #[serde(default)]
    pub exam_short_code: Option<String>,
    /// Display name of the category, if the post belongs to one.
    #[serde(default)]
    pub category_name: Option<String>,
    /// Slug of the category, if the post belongs to one.
    #[serde(default)]
    pub category_slug: Option<String>,
}

impl Post {
    /// The category this post belongs to, reassembled from the flat columns.
    #[must_use]
    pub fn category(&self) -> Option<Category> {
        match (&self.category_slug, &self.category_name) {
            (Some(slug), Some(name)) => Some(Category::new(slug.clone(), name.clone())),
            _ => None,
        }
    }

    /// The exam vertical this post belongs to, when its short code is a
    /// known key.
    #[must_use]
    pub fn exam(&self) -> Option<ExamKey> {
        self.exam_short_code.as_deref()?.parse().ok()
    }

    /// Whether this post belongs to the given exam vertical.
    #[must_use]
    pub fn is_for_exam(&self, exam: ExamKey) -> bool {
        self.exam_short_code
            .as_deref()
            .is_some_and(|code| code.eq_ignore_ascii_case(exam.as_str()))
    }

    /// Combined popularity used by the trending ranking.
    #[must_use]
    pub const fn popularity(&self) -> u64 {
        self.view_count.saturating_add(self.like_count)
    }
}

/// The store sends explicit nulls for unset columns; fold them into the
/// field's default so an optional column never fails a fetch.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
