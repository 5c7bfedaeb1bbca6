//! Article model
//!
//! This module provides:
//! - `Article` entity covering both written articles and image collections
//! - `ArticleState` publication lifecycle enum
//! - `Classify` content-type discriminator
//! - Input and filter types for the article operations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum title length in characters.
pub const TITLE_MAX_LEN: usize = 150;
/// Maximum introduce (summary) length in characters.
pub const INTRODUCE_MAX_LEN: usize = 512;

/// Article entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Unique identifier
    pub id: i64,
    /// Title (1-150 chars)
    pub title: String,
    /// Owning subset (category), if any
    pub subset_id: Option<i64>,
    /// Content type discriminator
    pub classify: Classify,
    /// Comma-separated labels
    pub label: String,
    /// Short summary (<= 512 chars)
    pub introduce: String,
    /// Body content
    pub content: String,
    /// Cover image URL
    pub cover: String,
    /// Author user ID
    pub user_id: i64,
    /// View counter
    pub views: i64,
    /// Like counter (kept in step with the praise table)
    pub likes: i64,
    /// Comment counter
    pub comments: i64,
    /// Publication lifecycle state
    pub state: ArticleState,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
    /// Publication timestamp (set when state becomes published)
    pub published_at: Option<DateTime<Utc>>,
}

/// Article joined with its subset name for list/detail views.
#[derive(Debug, Clone)]
pub struct ArticleWithSubset {
    pub article: Article,
    pub subset_name: Option<String>,
}

/// Publication lifecycle of an article.
///
/// `deleted` is a terminal logical-delete state: deleted rows are excluded
/// from every query and cannot transition back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleState {
    Draft,
    Published,
    Rejected,
    Deleted,
}

impl Default for ArticleState {
    fn default() -> Self {
        Self::Draft
    }
}

impl ArticleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleState::Draft => "draft",
            ArticleState::Published => "published",
            ArticleState::Rejected => "rejected",
            ArticleState::Deleted => "deleted",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(ArticleState::Draft),
            "published" => Some(ArticleState::Published),
            "rejected" => Some(ArticleState::Rejected),
            "deleted" => Some(ArticleState::Deleted),
            _ => None,
        }
    }

    /// States a client may request through update/status endpoints.
    /// `deleted` is only reachable through the delete operation.
    pub fn is_assignable(&self) -> bool {
        !matches!(self, ArticleState::Deleted)
    }
}

impl std::fmt::Display for ArticleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Content type of an article row: written article or image collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classify {
    Article,
    Image,
}

impl Classify {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classify::Article => "article",
            Classify::Image => "image",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "article" => Some(Classify::Article),
            "image" => Some(Classify::Image),
            _ => None,
        }
    }
}

impl std::fmt::Display for Classify {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input for creating a new article (always created as draft)
#[derive(Debug, Clone)]
pub struct CreateArticleInput {
    pub title: String,
    pub content: String,
    pub classify: Classify,
    pub subset_id: Option<i64>,
    pub label: String,
    pub introduce: String,
    pub cover: String,
}

/// Input for a partial article update
#[derive(Debug, Clone, Default)]
pub struct UpdateArticleInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub classify: Option<Classify>,
    pub subset_id: Option<i64>,
    pub label: Option<String>,
    pub introduce: Option<String>,
    pub cover: Option<String>,
    pub state: Option<ArticleState>,
}

impl UpdateArticleInput {
    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.content.is_some()
            || self.classify.is_some()
            || self.subset_id.is_some()
            || self.label.is_some()
            || self.introduce.is_some()
            || self.cover.is_some()
            || self.state.is_some()
    }
}

/// Optional filters for the article list query
#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    pub state: Option<ArticleState>,
    pub classify: Option<Classify>,
    pub subset_id: Option<i64>,
}
