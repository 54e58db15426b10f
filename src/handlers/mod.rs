pub mod admin;
pub mod course;
pub mod lesson;
pub mod progress;

use askama::Template;
use axum::{
    Router,
    extract::{Query, State},
    response::Html,
    routing::{get, post},
};
use serde::Deserialize;

use crate::db::{self, LogOnError};
use crate::domain::Course;
use crate::state::AppState;

/// Scan status rendered in every page footer.
pub struct MetaContext {
    pub courses_dir: String,
    pub has_scanned: bool,
    /// "N courses · M lessons" once a pass has completed.
    pub scan_summary: Option<String>,
}

impl MetaContext {
    pub fn from_state(state: &AppState) -> Self {
        let meta = state.scan_meta();
        Self {
            courses_dir: state.settings.courses_dir.display().to_string(),
            has_scanned: meta.has_scanned,
            scan_summary: meta.stats.map(|stats| {
                format!(
                    "{} courses · {} lessons",
                    stats.courses_seen, stats.lessons_seen
                )
            }),
        }
    }
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub courses: Vec<Course>,
    pub q: String,
    pub meta: MetaContext,
}

#[derive(Debug, Deserialize)]
pub struct HomeQuery {
    pub q: Option<String>,
}

/// Course list page.
pub async fn home(
    State(state): State<AppState>,
    Query(query): Query<HomeQuery>,
) -> Html<String> {
    let conn = match db::try_lock(&state.pool) {
        Ok(conn) => conn,
        Err(_) => return Html("<h1>Catalog Error</h1><p>Please refresh the page.</p>".to_string()),
    };

    let q = query.q.unwrap_or_default();
    let filter = if q.is_empty() { None } else { Some(q.as_str()) };
    let courses = db::list_courses(&conn, filter).log_warn_default("failed to list courses");
    drop(conn);

    let template = HomeTemplate {
        courses,
        q,
        meta: MetaContext::from_state(&state),
    };

    Html(template.render().unwrap_or_default())
}

/// The full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/course/{id}", get(course::course_detail))
        .route("/lesson/{id}", get(lesson::lesson_player))
        .route("/video/{id}", get(lesson::video))
        .route("/api/progress/{lesson_id}", post(progress::update_progress))
        .route("/admin", get(admin::admin_page))
        .route("/admin/scan", post(admin::run_scan))
        .route("/admin/thumbnails", post(admin::run_thumbnails))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}
