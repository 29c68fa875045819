//! Deployment configuration: where the content store lives, the public site
//! origin, and the listing caps.

use std::{env, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::post::Post;

const ENV_STORE_URL: &str = "PRIMER_CONTENT_URL";
const ENV_STORE_KEY: &str = "PRIMER_CONTENT_KEY";
const ENV_SITE_URL: &str = "PRIMER_SITE_URL";

/// Errors while assembling the site configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is absent.
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),
    /// An environment variable holds something that is not a URL.
    #[error("invalid URL in {0}: {1}")]
    InvalidUrl(&'static str, #[source] url::ParseError),
    /// The config file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The config file is not valid TOML for this schema.
    #[error("invalid config: {0}")]
    InvalidConfig(#[from] toml::de::Error),
}

/// Listing caps for index pages and the related-posts rail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Featured posts on the blog home.
    pub featured: usize,
    /// Recent posts on the blog home.
    pub recent: usize,
    /// Trending entries derived from the recent set.
    pub trending: usize,
    /// Related posts under an article.
    pub related: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            featured: 6,
            recent: 12,
            trending: 5,
            related: 3,
        }
    }
}

/// Deployment configuration of the site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    store_url: Url,
    store_key: String,
    site_url: Url,
    #[serde(default)]
    limits: Limits,
}

impl SiteConfig {
    /// Assemble a configuration directly.
    pub fn new(store_url: Url, store_key: impl Into<String>, site_url: Url) -> Self {
        Self {
            store_url,
            store_key: store_key.into(),
            site_url,
            limits: Limits::default(),
        }
    }

    /// Read the deployment environment the way the hosting platform injects
    /// it: `PRIMER_CONTENT_URL`, `PRIMER_CONTENT_KEY`, `PRIMER_SITE_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            store_url: env_url(ENV_STORE_URL)?,
            store_key: env::var(ENV_STORE_KEY).map_err(|_| ConfigError::MissingVar(ENV_STORE_KEY))?,
            site_url: env_url(ENV_SITE_URL)?,
            limits: Limits::default(),
        })
    }

    /// Load the configuration from a TOML file.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = tokio::fs::read_to_string(path).await?;
        Ok(toml::from_str(&raw)?)
    }

    /// Replace the listing caps.
    #[must_use]
    pub const fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub const fn store_url(&self) -> &Url {
        &self.store_url
    }

    #[must_use]
    pub fn store_key(&self) -> &str {
        &self.store_key
    }

    #[must_use]
    pub const fn site_url(&self) -> &Url {
        &self.site_url
    }

    #[must_use]
    pub const fn limits(&self) -> Limits {
        self.limits
    }

    /// The public page URL of a post: `/blog/{exam}/{slug}`, with `general`
    /// standing in for posts outside any exam vertical.
    #[must_use]
    pub fn post_url(&self, post: &Post) -> Url {
        let exam = post
            .exam_short_code
            .as_deref()
            .map_or_else(|| "general".to_string(), str::to_ascii_lowercase);
        // The base is a validated http(s) URL and both segments are slug-safe,
        // so joining cannot fail.
        self.site_url
            .join(&format!("blog/{exam}/{}", post.slug))
            .expect("post path joins onto a valid base")
    }
}

fn env_url(name: &'static str) -> Result<Url, ConfigError> {
    let raw = env::var(name).map_err(|_| ConfigError::MissingVar(name))?;
    Url::parse(&raw).map_err(|err| ConfigError::InvalidUrl(name, err))
}

#[cfg(test)]
mod tests {
    use super::{Limits, SiteConfig};
    use crate::testutil::sample_post;

    #[test]
    fn limits_default_to_page_behaviour() {
        let limits = Limits::default();
        assert_eq!(
            (limits.featured, limits.recent, limits.trending, limits.related),
            (6, 12, 5, 3)
        );
    }

    #[test]
    fn parses_toml_with_partial_limits() {
        let config: SiteConfig = toml::from_str(
            r#"
            store_url = "https://abc.supabase.co/"
            store_key = "anon-key"
            site_url = "https://primer.example/"

            [limits]
            recent = 24
            "#,
        )
        .unwrap();
        assert_eq!(config.store_url().as_str(), "https://abc.supabase.co/");
        assert_eq!(config.limits().recent, 24);
        assert_eq!(config.limits().related, 3);
    }

    #[test]
    fn post_urls_fall_back_to_general() {
        let config: SiteConfig = toml::from_str(
            r#"
            store_url = "https://abc.supabase.co/"
            store_key = "anon-key"
            site_url = "https://primer.example/"
            "#,
        )
        .unwrap();

        let mut post = sample_post(1, "mock-test-plan");
        post.exam_short_code = Some("CAT".into());
        assert_eq!(
            config.post_url(&post).as_str(),
            "https://primer.example/blog/cat/mock-test-plan"
        );

        post.exam_short_code = None;
        assert_eq!(
            config.post_url(&post).as_str(),
            "https://primer.example/blog/general/mock-test-plan"
        );
    }
}
