//! Course lookups and mutations.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Result, params};

use crate::domain::Course;

const COURSE_COLUMNS: &str = "id, path, title, thumbnail_url, created_at, updated_at";

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

pub(crate) fn row_to_course(row: &rusqlite::Row) -> Result<Course> {
    let created_at: String = row.get(4)?;
    let updated_at: String = row.get(5)?;

    Ok(Course {
        id: row.get(0)?,
        path: row.get(1)?,
        title: row.get(2)?,
        thumbnail_url: row.get(3)?,
        created_at: parse_timestamp(&created_at),
        updated_at: parse_timestamp(&updated_at),
    })
}

/// Insert a new course and return it with its generated id.
pub fn insert_course(conn: &Connection, path: &str, title: &str) -> Result<Course> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO courses (path, title, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
        params![path, title, now.to_rfc3339(), now.to_rfc3339()],
    )?;

    Ok(Course {
        id: conn.last_insert_rowid(),
        path: path.to_string(),
        title: title.to_string(),
        thumbnail_url: None,
        created_at: now,
        updated_at: now,
    })
}

/// Point lookup by the canonicalized directory path (the course identity).
pub fn find_course_by_path(conn: &Connection, path: &str) -> Result<Option<Course>> {
    conn.query_row(
        &format!("SELECT {COURSE_COLUMNS} FROM courses WHERE path = ?1"),
        params![path],
        row_to_course,
    )
    .optional()
}

pub fn get_course_by_id(conn: &Connection, id: i64) -> Result<Option<Course>> {
    conn.query_row(
        &format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?1"),
        params![id],
        row_to_course,
    )
    .optional()
}

/// Refresh the display title (directory rename); identity is untouched.
pub fn update_course_title(
    conn: &Connection,
    id: i64,
    title: &str,
    updated_at: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "UPDATE courses SET title = ?1, updated_at = ?2 WHERE id = ?3",
        params![title, updated_at.to_rfc3339(), id],
    )?;
    Ok(())
}

pub fn set_course_thumbnail(conn: &Connection, id: i64, thumbnail_url: &str) -> Result<()> {
    conn.execute(
        "UPDATE courses SET thumbnail_url = ?1, updated_at = ?2 WHERE id = ?3",
        params![thumbnail_url, Utc::now().to_rfc3339(), id],
    )?;
    Ok(())
}

/// All courses ordered by title. `q` narrows by a case-insensitive substring
/// match on the title.
pub fn list_courses(conn: &Connection, q: Option<&str>) -> Result<Vec<Course>> {
    match q {
        Some(q) if !q.is_empty() => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COURSE_COLUMNS} FROM courses WHERE title LIKE ?1 ORDER BY title"
            ))?;
            let pattern = format!("%{}%", q);
            let courses = stmt
                .query_map(params![pattern], row_to_course)?
                .collect::<Result<Vec<_>>>()?;
            Ok(courses)
        }
        _ => {
            let mut stmt = conn
                .prepare(&format!("SELECT {COURSE_COLUMNS} FROM courses ORDER BY title"))?;
            let courses = stmt
                .query_map([], row_to_course)?
                .collect::<Result<Vec<_>>>()?;
            Ok(courses)
        }
    }
}
