//! File metadata model
//!
//! Rows describe files that live under the static data directory; the
//! HTTP layer serves the bytes, the table tracks name/format/size/subset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored file metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFile {
    pub id: i64,
    pub file_name: String,
    /// Lowercased extension, e.g. "jpg", "pdf"
    pub format: String,
    /// Size in bytes when known
    pub size: Option<i64>,
    pub url: String,
    pub subset_id: Option<i64>,
    /// 1 = normal, 0 = deleted
    pub status: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for registering file metadata
#[derive(Debug, Clone)]
pub struct CreateFileInput {
    pub file_name: String,
    pub format: String,
    pub size: Option<i64>,
    pub url: String,
    pub subset_id: Option<i64>,
}

/// Filters for the file listing
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    pub subset_id: Option<i64>,
    pub format: Option<String>,
}
