use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A top-level directory under the scan root, treated as one logical unit of
/// content. Identity is the canonicalized directory path, not the title: a
/// renamed directory keeps its row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,

    /// Canonicalized absolute path of the course directory (unique).
    pub path: String,

    /// Display title derived from the directory name; refreshed on rescan
    /// when the directory was renamed.
    pub title: String,

    /// Best-effort thumbnail fetched by the admin action; never set by a
    /// scan.
    pub thumbnail_url: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
