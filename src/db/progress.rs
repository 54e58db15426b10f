//! Playback progress: one row per lesson, single-user.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Result, params};

use crate::domain::Progress;

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn row_to_progress(row: &rusqlite::Row) -> Result<Progress> {
    let completed: i64 = row.get(3)?;
    let updated_at: String = row.get(4)?;

    Ok(Progress {
        id: row.get(0)?,
        lesson_id: row.get(1)?,
        position_seconds: row.get(2)?,
        completed: completed != 0,
        updated_at: parse_timestamp(&updated_at),
    })
}

pub fn get_progress(conn: &Connection, lesson_id: i64) -> Result<Option<Progress>> {
    conn.query_row(
        "SELECT id, lesson_id, position_seconds, completed, updated_at
         FROM progress WHERE lesson_id = ?1",
        params![lesson_id],
        row_to_progress,
    )
    .optional()
}

/// Progress rows for every lesson of a course, keyed by lesson id.
pub fn progress_for_course(conn: &Connection, course_id: i64) -> Result<HashMap<i64, Progress>> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.lesson_id, p.position_seconds, p.completed, p.updated_at
         FROM progress p
         JOIN lessons l ON l.id = p.lesson_id
         WHERE l.course_id = ?1",
    )?;
    let rows = stmt
        .query_map(params![course_id], row_to_progress)?
        .collect::<Result<Vec<_>>>()?;

    Ok(rows.into_iter().map(|p| (p.lesson_id, p)).collect())
}

/// Record a playback position. Completion latches: a false `completed`
/// never un-completes a lesson that was already finished.
pub fn upsert_progress(
    conn: &Connection,
    lesson_id: i64,
    position_seconds: f64,
    completed: bool,
) -> Result<Progress> {
    let position = position_seconds.max(0.0);
    let now = Utc::now();

    if let Some(existing) = get_progress(conn, lesson_id)? {
        let completed = existing.completed || completed;
        conn.execute(
            "UPDATE progress SET position_seconds = ?1, completed = ?2, updated_at = ?3
             WHERE id = ?4",
            params![position, completed, now.to_rfc3339(), existing.id],
        )?;
        return Ok(Progress {
            position_seconds: position,
            completed,
            updated_at: now,
            ..existing
        });
    }

    conn.execute(
        "INSERT INTO progress (lesson_id, position_seconds, completed, updated_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![lesson_id, position, completed, now.to_rfc3339()],
    )?;

    Ok(Progress {
        id: conn.last_insert_rowid(),
        lesson_id,
        position_seconds: position,
        completed,
        updated_at: now,
    })
}
