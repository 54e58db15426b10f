//! Admin operations: manual library scan, best-effort thumbnail fetch.

use askama::Template;
use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
};
use serde::Deserialize;

use super::MetaContext;
use crate::db::{self, LogOnError};
use crate::library;
use crate::state::AppState;
use crate::thumbs;

#[derive(Template)]
#[template(path = "admin.html")]
pub struct AdminTemplate {
    /// Feedback lines from the action that redirected here.
    pub messages: Vec<String>,
    pub meta: MetaContext,
}

/// Lightweight feedback carried through the post-action redirect.
#[derive(Debug, Deserialize)]
pub struct AdminQuery {
    pub scan: Option<u8>,
    pub courses: Option<u64>,
    pub lessons: Option<u64>,
    pub scan_error: Option<u8>,
    pub thumbs: Option<u8>,
    pub attempted: Option<u64>,
    pub updated: Option<u64>,
}

pub async fn admin_page(
    State(state): State<AppState>,
    Query(query): Query<AdminQuery>,
) -> Html<String> {
    let mut messages = Vec::new();
    if query.scan.is_some() {
        messages.push(format!(
            "Scan finished: {} courses, {} lessons.",
            query.courses.unwrap_or(0),
            query.lessons.unwrap_or(0)
        ));
    }
    if query.scan_error.is_some() {
        messages.push("Scan failed; the catalog was left untouched. Check the logs.".to_string());
    }
    if query.thumbs.is_some() {
        messages.push(format!(
            "Thumbnails: {} fetched out of {} attempted.",
            query.updated.unwrap_or(0),
            query.attempted.unwrap_or(0)
        ));
    }

    let template = AdminTemplate {
        messages,
        meta: MetaContext::from_state(&state),
    };

    Html(template.render().unwrap_or_default())
}

/// Run a reconciliation pass against the configured library root.
///
/// A failed pass must never take the server down: it is logged, reported on
/// the admin page, and the catalog keeps serving its previous state.
pub async fn run_scan(State(state): State<AppState>) -> Redirect {
    let outcome = {
        let mut conn = match db::try_lock(&state.pool) {
            Ok(conn) => conn,
            Err(_) => return Redirect::to("/admin?scan_error=1"),
        };
        library::scan_library(&mut conn, &state.settings.courses_dir)
    };

    match outcome {
        Ok(stats) => {
            state.set_scan_meta(stats);
            Redirect::to(&format!(
                "/admin?scan=1&courses={}&lessons={}",
                stats.courses_seen, stats.lessons_seen
            ))
        }
        Err(e) => {
            tracing::error!(
                "library scan failed (courses_dir={}): {}",
                state.settings.courses_dir.display(),
                e
            );
            Redirect::to("/admin?scan_error=1")
        }
    }
}

/// Fetch thumbnails for courses that don't have one yet.
pub async fn run_thumbnails(State(state): State<AppState>) -> Redirect {
    let conn = match db::try_lock(&state.pool) {
        Ok(conn) => conn,
        Err(_) => return Redirect::to("/admin"),
    };

    let courses = db::list_courses(&conn, None).log_warn_default("failed to list courses");

    let mut attempted = 0u64;
    let mut updated = 0u64;
    for course in courses {
        if course.thumbnail_url.is_some() {
            continue;
        }
        attempted += 1;

        if let Some(url) = thumbs::best_thumbnail_for_title(&course.title)
            && db::set_course_thumbnail(&conn, course.id, &url)
                .log_warn("failed to store thumbnail")
                .is_some()
        {
            updated += 1;
        }
    }

    Redirect::to(&format!(
        "/admin?thumbs=1&attempted={}&updated={}",
        attempted, updated
    ))
}
