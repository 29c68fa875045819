//! URL-safe post keys.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Error returned when a string cannot serve as a post slug.
#[derive(Debug, thiserror::Error)]
#[error("invalid post slug: expected non-empty lowercase letters, digits and hyphens")]
pub struct InvalidSlug;

/// URL-safe unique key of a post within the content store.
///
/// Slugs are minted by the store; this crate only validates and carries them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostSlug(String);

impl PostSlug {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for PostSlug {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for PostSlug {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for PostSlug {
    type Err = InvalidSlug;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(InvalidSlug);
        }

        let legal = trimmed
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !legal {
            return Err(InvalidSlug);
        }

        Ok(Self(trimmed.to_string()))
    }
}

impl TryFrom<String> for PostSlug {
    type Error = InvalidSlug;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PostSlug> for String {
    fn from(slug: PostSlug) -> Self {
        slug.into_string()
    }
}

#[cfg(test)]
mod tests {
    use super::PostSlug;

    #[test]
    fn accepts_store_shaped_slugs() {
        let slug: PostSlug = "how-to-crack-cat-2024".parse().unwrap();
        assert_eq!(slug.as_str(), "how-to-crack-cat-2024");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let slug: PostSlug = " quant-shortcuts ".parse().unwrap();
        assert_eq!(slug.as_str(), "quant-shortcuts");
    }

    #[test]
    fn rejects_empty_and_unsafe_input() {
        assert!("".parse::<PostSlug>().is_err());
        assert!("   ".parse::<PostSlug>().is_err());
        assert!("Quant Tips".parse::<PostSlug>().is_err());
        assert!("a/b".parse::<PostSlug>().is_err());
    }

    #[test]
    fn round_trips_through_serde() {
        let slug: PostSlug = serde_json::from_str("\"verbal-basics\"").unwrap();
        assert_eq!(serde_json::to_string(&slug).unwrap(), "\"verbal-basics\"");
        assert!(serde_json::from_str::<PostSlug>("\"NOT A SLUG\"").is_err());
    }
}
