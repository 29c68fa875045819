//! Shared fixtures for the unit tests.

use time::{Duration, macros::datetime};

use crate::post::{Post, PostId};

/// Install a subscriber once so `--nocapture` runs show the degraded-path
/// logs. Safe to call from every test; later calls are no-ops.
pub(crate) fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A published post with deterministic recency: a higher `id` is newer.
pub(crate) fn sample_post(id: i64, slug: &str) -> Post {
    Post {
        id: PostId(id),
        slug: slug.parse().expect("fixture slug"),
        title: format!("Post {id}"),
        excerpt: String::new(),
        content: String::new(),
        featured_image_url: None,
        reading_time: 5,
        published_at: datetime!(2024-06-01 0:00 UTC) + Duration::days(id),
        is_featured: false,
        difficulty_level: None,
        view_count: 0,
        like_count: 0,
        meta_title: None,
        meta_description: None,
        exam_name: None,
        exam_short_code: None,
        category_name: None,
        category_slug: None,
    }
}

/// A post in the given category.
pub(crate) fn post_in_category(id: i64, slug: &str, category: &str) -> Post {
    let mut post = sample_post(id, slug);
    post.category_slug = Some(category.to_string());
    post.category_name = Some(category.to_uppercase());
    post
}
