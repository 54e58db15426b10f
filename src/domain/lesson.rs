use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single video file within a course. Identity is the canonicalized file
/// path; section, title and ordering are observations that a rescan may
/// rewrite in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: i64,

    pub course_id: i64,

    /// Canonicalized absolute path of the video file (unique).
    pub path: String,

    /// Grouping label: name of the file's immediate parent directory.
    pub section: String,

    /// Display title derived from the filename without extension.
    pub title: String,

    /// Path relative to the course directory; lessons list in natural order
    /// of this key.
    pub order_key: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
