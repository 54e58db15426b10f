//! Course detail page: lessons grouped into sections, with progress.

use askama::Template;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
};

use super::MetaContext;
use crate::db::{self, LogOnError};
use crate::domain::{Course, Lesson, Progress};
use crate::state::AppState;

/// One lesson row, with its progress flattened for the template.
pub struct LessonRow {
    pub id: i64,
    pub title: String,
    pub completed: bool,
    /// "mm:ss" resume point, absent when playback never started.
    pub resume_label: Option<String>,
}

impl LessonRow {
    fn new(lesson: &Lesson, progress: Option<&Progress>) -> Self {
        let completed = progress.map(|p| p.completed).unwrap_or(false);
        let resume_label = progress
            .filter(|p| p.position_seconds > 0.0)
            .map(|p| format_position(p.position_seconds));
        Self {
            id: lesson.id,
            title: lesson.title.clone(),
            completed,
            resume_label,
        }
    }
}

/// Lessons grouped by section label, in first-seen walker order.
pub struct SectionView {
    pub name: String,
    pub lessons: Vec<LessonRow>,
}

#[derive(Template)]
#[template(path = "course.html")]
pub struct CourseTemplate {
    pub course: Course,
    pub sections: Vec<SectionView>,
    pub lesson_count: usize,
    pub meta: MetaContext,
}

fn format_position(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

pub async fn course_detail(
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
) -> Result<Html<String>, StatusCode> {
    let conn = db::try_lock(&state.pool).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let course = db::get_course_by_id(&conn, course_id)
        .log_warn("failed to load course")
        .flatten()
        .ok_or(StatusCode::NOT_FOUND)?;

    let lessons = db::list_lessons_for_course(&conn, course_id)
        .log_warn_default("failed to list lessons");
    let progress =
        db::progress_for_course(&conn, course_id).log_warn_default("failed to load progress");
    drop(conn);

    let lesson_count = lessons.len();
    let mut sections: Vec<SectionView> = Vec::new();
    for lesson in &lessons {
        let row = LessonRow::new(lesson, progress.get(&lesson.id));
        match sections.iter_mut().find(|s| s.name == lesson.section) {
            Some(section) => section.lessons.push(row),
            None => sections.push(SectionView {
                name: lesson.section.clone(),
                lessons: vec![row],
            }),
        }
    }

    let template = CourseTemplate {
        course,
        sections,
        lesson_count,
        meta: MetaContext::from_state(&state),
    };

    Ok(Html(template.render().unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_formats_as_minutes_and_seconds() {
        assert_eq!(format_position(0.0), "0:00");
        assert_eq!(format_position(59.9), "0:59");
        assert_eq!(format_position(61.0), "1:01");
        assert_eq!(format_position(3725.0), "62:05");
        assert_eq!(format_position(-5.0), "0:00");
    }
}
