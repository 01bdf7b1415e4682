use serde::{Deserialize, Serialize};
use std::fmt;

/// The dimension that scopes one feed's pagination state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "slug", rename_all = "snake_case")]
pub enum FeedFilter {
    #[default]
    None,
    Category(String),
    Tag(String),
}

impl FeedFilter {
    pub fn category(slug: impl Into<String>) -> Self {
        Self::Category(slug.into())
    }

    pub fn tag(slug: impl Into<String>) -> Self {
        Self::Tag(slug.into())
    }

    /// Query pairs selecting this filter on the posts endpoint (without `page`).
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::None => vec![("posts", "")],
            Self::Category(slug) => vec![("category_slug", slug.as_str())],
            Self::Tag(slug) => vec![("tag_slug", slug.as_str())],
        }
    }
}

impl fmt::Display for FeedFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("home"),
            Self::Category(slug) => write!(f, "category:{slug}"),
            Self::Tag(slug) => write!(f, "tag:{slug}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_pairs_per_variant() {
        assert_eq!(FeedFilter::None.query_pairs(), vec![("posts", "")]);
        assert_eq!(
            FeedFilter::category("travel").query_pairs(),
            vec![("category_slug", "travel")]
        );
        assert_eq!(
            FeedFilter::tag("dal-lake").query_pairs(),
            vec![("tag_slug", "dal-lake")]
        );
    }

    #[test]
    fn display_is_stable_for_logs() {
        assert_eq!(FeedFilter::None.to_string(), "home");
        assert_eq!(FeedFilter::tag("snow").to_string(), "tag:snow");
    }
}
