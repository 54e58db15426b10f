//! Lesson lookups and mutations.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Result, params};

use crate::domain::Lesson;
use crate::library::natural_key;

const LESSON_COLUMNS: &str =
    "id, course_id, path, section, title, order_key, created_at, updated_at";

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

pub(crate) fn row_to_lesson(row: &rusqlite::Row) -> Result<Lesson> {
    let created_at: String = row.get(6)?;
    let updated_at: String = row.get(7)?;

    Ok(Lesson {
        id: row.get(0)?,
        course_id: row.get(1)?,
        path: row.get(2)?,
        section: row.get(3)?,
        title: row.get(4)?,
        order_key: row.get(5)?,
        created_at: parse_timestamp(&created_at),
        updated_at: parse_timestamp(&updated_at),
    })
}

/// Insert a new lesson and return it with its generated id.
pub fn insert_lesson(
    conn: &Connection,
    course_id: i64,
    path: &str,
    section: &str,
    title: &str,
    order_key: &str,
) -> Result<Lesson> {
    let now = Utc::now();
    conn.execute(
        r#"
    INSERT INTO lessons (course_id, path, section, title, order_key, created_at, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
    "#,
        params![
            course_id,
            path,
            section,
            title,
            order_key,
            now.to_rfc3339(),
            now.to_rfc3339(),
        ],
    )?;

    Ok(Lesson {
        id: conn.last_insert_rowid(),
        course_id,
        path: path.to_string(),
        section: section.to_string(),
        title: title.to_string(),
        order_key: order_key.to_string(),
        created_at: now,
        updated_at: now,
    })
}

/// Point lookup by the canonicalized file path (the lesson identity).
pub fn find_lesson_by_path(conn: &Connection, path: &str) -> Result<Option<Lesson>> {
    conn.query_row(
        &format!("SELECT {LESSON_COLUMNS} FROM lessons WHERE path = ?1"),
        params![path],
        row_to_lesson,
    )
    .optional()
}

pub fn get_lesson_by_id(conn: &Connection, id: i64) -> Result<Option<Lesson>> {
    conn.query_row(
        &format!("SELECT {LESSON_COLUMNS} FROM lessons WHERE id = ?1"),
        params![id],
        row_to_lesson,
    )
    .optional()
}

/// Write back the mutable scan-observed fields (course link, section, title,
/// order key). Identity and created_at never change.
pub fn update_lesson(conn: &Connection, lesson: &Lesson) -> Result<()> {
    conn.execute(
        r#"
    UPDATE lessons
    SET course_id = ?1, section = ?2, title = ?3, order_key = ?4, updated_at = ?5
    WHERE id = ?6
    "#,
        params![
            lesson.course_id,
            lesson.section,
            lesson.title,
            lesson.order_key,
            lesson.updated_at.to_rfc3339(),
            lesson.id,
        ],
    )?;
    Ok(())
}

/// Lessons of a course in natural order of their order key.
///
/// SQLite's collations compare the key lexically ("10" before "2"), so rows
/// are fetched and sorted here instead.
pub fn list_lessons_for_course(conn: &Connection, course_id: i64) -> Result<Vec<Lesson>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {LESSON_COLUMNS} FROM lessons WHERE course_id = ?1"
    ))?;
    let mut lessons = stmt
        .query_map(params![course_id], row_to_lesson)?
        .collect::<Result<Vec<_>>>()?;

    lessons.sort_by_cached_key(|lesson| natural_key(&lesson.order_key));
    Ok(lessons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::insert_course;
    use crate::testing::TestEnv;

    #[test]
    fn insert_and_lookup_by_path() {
        let env = TestEnv::new().unwrap();
        let course = insert_course(&env.conn, "/media/CourseA", "CourseA").unwrap();
        let lesson = insert_lesson(
            &env.conn,
            course.id,
            "/media/CourseA/01/a.mp4",
            "01",
            "a",
            "01/a.mp4",
        )
        .unwrap();
        assert!(lesson.id > 0);

        let found = find_lesson_by_path(&env.conn, "/media/CourseA/01/a.mp4")
            .unwrap()
            .unwrap();
        assert_eq!(found.id, lesson.id);
        assert_eq!(found.course_id, course.id);
        assert_eq!(found.section, "01");
    }

    #[test]
    fn listing_uses_natural_order_of_order_key() {
        let env = TestEnv::new().unwrap();
        let course = insert_course(&env.conn, "/media/CourseA", "CourseA").unwrap();
        for key in ["10 - z.mp4", "2 - b.mp4", "1 - a.mp4"] {
            let path = format!("/media/CourseA/{key}");
            insert_lesson(&env.conn, course.id, &path, "CourseA", key, key).unwrap();
        }

        let lessons = list_lessons_for_course(&env.conn, course.id).unwrap();
        let keys: Vec<_> = lessons.iter().map(|l| l.order_key.as_str()).collect();
        assert_eq!(keys, vec!["1 - a.mp4", "2 - b.mp4", "10 - z.mp4"]);
    }

    #[test]
    fn update_rewrites_observed_fields() {
        let env = TestEnv::new().unwrap();
        let course = insert_course(&env.conn, "/media/CourseA", "CourseA").unwrap();
        let mut lesson = insert_lesson(
            &env.conn,
            course.id,
            "/media/CourseA/01/a.mp4",
            "01",
            "a",
            "01/a.mp4",
        )
        .unwrap();

        lesson.section = "02".to_string();
        lesson.order_key = "02/a.mp4".to_string();
        lesson.updated_at = Utc::now();
        update_lesson(&env.conn, &lesson).unwrap();

        let found = get_lesson_by_id(&env.conn, lesson.id).unwrap().unwrap();
        assert_eq!(found.section, "02");
        assert_eq!(found.order_key, "02/a.mp4");
    }
}
