use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{services::announcements::AnnouncementService, AppState};

/// GET /api/announcements — newest first.
pub async fn list(State(state): State<AppState>) -> Json<Value> {
    let items = AnnouncementService::list(&state.announcements).await;
    Json(json!({ "success": true, "items": items }))
}

/// DELETE /api/announcements/{id} — manual delete; also strips every
/// schedule row referencing the clip.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match AnnouncementService::delete(
        &state.announcements,
        &state.schedules,
        &state.config.clip_dir,
        id,
    )
    .await
    {
        Some(_) => Ok(Json(json!({ "success": true }))),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "message": "announcement not found" })),
        )),
    }
}
