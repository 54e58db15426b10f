//! Playback progress API used by the player page.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::db;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProgressIn {
    #[serde(default)]
    pub position_seconds: f64,
    #[serde(default)]
    pub completed: bool,
}

/// Record playback progress for a lesson. Negative positions clamp to zero
/// and completion only ever latches on (see `db::upsert_progress`).
pub async fn update_progress(
    State(state): State<AppState>,
    Path(lesson_id): Path<i64>,
    Json(payload): Json<ProgressIn>,
) -> Result<Json<Value>, StatusCode> {
    let conn = db::try_lock(&state.pool).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    db::get_lesson_by_id(&conn, lesson_id)
        .map_err(|e| {
            tracing::warn!("failed to load lesson {}: {}", lesson_id, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    db::upsert_progress(&conn, lesson_id, payload.position_seconds, payload.completed).map_err(
        |e| {
            tracing::warn!("failed to save progress for lesson {}: {}", lesson_id, e);
            StatusCode::INTERNAL_SERVER_ERROR
        },
    )?;

    Ok(Json(json!({ "ok": true })))
}
