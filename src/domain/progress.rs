use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Playback progress for one lesson (single-user: one row per lesson).
/// Owned by the player endpoints; scans never touch it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    pub id: i64,

    pub lesson_id: i64,

    /// Last playback position in seconds.
    pub position_seconds: f64,

    pub completed: bool,

    pub updated_at: DateTime<Utc>,
}
