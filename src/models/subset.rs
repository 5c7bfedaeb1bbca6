//! Subset model
//!
//! Subsets group articles, image collections and uploaded resources into
//! categories. (subset_name, classify) pairs are unique.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subset entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subset {
    pub id: i64,
    pub subset_name: String,
    pub classify: SubsetClassify,
    /// 1 = enabled, 0 = disabled
    pub status: bool,
    /// Sort weight, higher first
    pub sort: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What kind of content a subset groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubsetClassify {
    Article,
    Image,
    Resource,
}

impl SubsetClassify {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubsetClassify::Article => "article",
            SubsetClassify::Image => "image",
            SubsetClassify::Resource => "resource",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "article" => Some(SubsetClassify::Article),
            "image" => Some(SubsetClassify::Image),
            "resource" => Some(SubsetClassify::Resource),
            _ => None,
        }
    }
}

impl std::fmt::Display for SubsetClassify {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input for creating a subset
#[derive(Debug, Clone)]
pub struct CreateSubsetInput {
    pub subset_name: String,
    pub classify: SubsetClassify,
    pub sort: i64,
}

/// Input for a partial subset update
#[derive(Debug, Clone, Default)]
pub struct UpdateSubsetInput {
    pub subset_name: Option<String>,
    pub sort: Option<i64>,
    pub status: Option<bool>,
}

impl UpdateSubsetInput {
    pub fn has_changes(&self) -> bool {
        self.subset_name.is_some() || self.sort.is_some() || self.status.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_roundtrip() {
        for c in [
            SubsetClassify::Article,
            SubsetClassify::Image,
            SubsetClassify::Resource,
        ] {
            assert_eq!(SubsetClassify::from_str(c.as_str()), Some(c));
        }
        assert_eq!(SubsetClassify::from_str("video"), None);
    }
}
