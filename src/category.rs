//! Content categories and their index-page aggregates.

use serde::{Deserialize, Serialize};

/// A content category: URL slug plus display name.
#[derive(Debug, Clone, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Category {
    slug: String,
    name: String,
}

impl Category {
    /// Create a category reference.
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A category together with its published-post count, as shown on index pages.
#[derive(Debug, Clone, Serialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct CategorySummary {
    #[serde(flatten)]
    category: Category,
    post_count: u64,
}

impl CategorySummary {
    /// Pair a category with its published-post count.
    #[must_use]
    pub const fn new(category: Category, post_count: u64) -> Self {
        Self {
            category,
            post_count,
        }
    }

    #[must_use]
    pub const fn category(&self) -> &Category {
        &self.category
    }

    #[must_use]
    pub const fn post_count(&self) -> u64 {
        self.post_count
    }
}

#[cfg(test)]
mod tests {
    use super::{Category, CategorySummary};

    #[test]
    fn summary_serializes_flat() {
        let summary = CategorySummary::new(Category::new("quant", "Quant"), 7);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["slug"], "quant");
        assert_eq!(json["name"], "Quant");
        assert_eq!(json["post_count"], 7);
    }
}
