//! Comment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum comment length in characters.
pub const COMMENT_MAX_LEN: usize = 512;

/// Comment entity. `parent_id == 0` marks a top-level comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub user_id: i64,
    pub article_id: i64,
    pub parent_id: i64,
    pub content: String,
    /// Number of times the comment was reported
    pub complaint: i64,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Comment joined with commenter and article info for list views.
#[derive(Debug, Clone)]
pub struct CommentWithMeta {
    pub id: i64,
    pub user_id: i64,
    pub user_name: Option<String>,
    pub article_id: i64,
    /// None when the article has been removed
    pub article_title: Option<String>,
    pub parent_id: i64,
    pub content: String,
    pub complaint: i64,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a comment
#[derive(Debug, Clone)]
pub struct CreateCommentInput {
    pub article_id: i64,
    pub content: String,
    /// 0 for a top-level comment, otherwise the parent comment id
    pub parent_id: i64,
}
