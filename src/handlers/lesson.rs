//! Lesson player page and the video byte stream behind it.

use std::path::PathBuf;

use askama::Template;
use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use super::MetaContext;
use crate::db::{self, LogOnError};
use crate::domain::{Course, Lesson};
use crate::state::AppState;

#[derive(Template)]
#[template(path = "lesson.html")]
pub struct LessonTemplate {
    pub lesson: Lesson,
    pub course: Option<Course>,
    /// Seconds to resume playback from.
    pub start_position: f64,
    pub completed: bool,
    pub meta: MetaContext,
}

pub async fn lesson_player(
    State(state): State<AppState>,
    Path(lesson_id): Path<i64>,
) -> Result<Html<String>, StatusCode> {
    let conn = db::try_lock(&state.pool).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let lesson = db::get_lesson_by_id(&conn, lesson_id)
        .log_warn("failed to load lesson")
        .flatten()
        .ok_or(StatusCode::NOT_FOUND)?;

    let course = db::get_course_by_id(&conn, lesson.course_id)
        .log_warn("failed to load course")
        .flatten();
    let progress = db::get_progress(&conn, lesson_id).log_warn("failed to load progress").flatten();
    drop(conn);

    let template = LessonTemplate {
        start_position: progress.as_ref().map(|p| p.position_seconds).unwrap_or(0.0),
        completed: progress.as_ref().map(|p| p.completed).unwrap_or(false),
        lesson,
        course,
        meta: MetaContext::from_state(&state),
    };

    Ok(Html(template.render().unwrap_or_default()))
}

/// Serves the underlying video file.
///
/// `ServeFile` answers HTTP Range requests, so seeking works in the player.
pub async fn video(
    State(state): State<AppState>,
    Path(lesson_id): Path<i64>,
    request: Request,
) -> Response {
    let lesson = {
        let Ok(conn) = db::try_lock(&state.pool) else {
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        };
        match db::get_lesson_by_id(&conn, lesson_id) {
            Ok(Some(lesson)) => lesson,
            Ok(None) => return (StatusCode::NOT_FOUND, "Lesson not found").into_response(),
            Err(e) => {
                tracing::warn!("failed to load lesson {}: {}", lesson_id, e);
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        }
    };

    let path = PathBuf::from(&lesson.path);
    if !path.is_file() {
        return (StatusCode::NOT_FOUND, "Video file missing").into_response();
    }

    match ServeFile::new(path).oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(infallible) => match infallible {},
    }
}
